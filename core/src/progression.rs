//! Experience, levels and the upgrades offered on level-up.

use serde::{Deserialize, Serialize};

/// Experience awarded for each defeated hostile before modifiers.
pub const EXPERIENCE_PER_KILL: u32 = 10;

/// Experience required to leave the first level.
pub const FIRST_LEVEL_THRESHOLD: u32 = 100;

/// Growth factor applied to the threshold after every level.
pub const LEVEL_THRESHOLD_GROWTH: f32 = 1.1;

/// Permanent improvement chosen after reaching a new level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Upgrade {
    /// +50 movement speed.
    MoveSpeed,
    /// +1 shot per burst on every weapon slot.
    ExtraProjectiles,
    /// +5 damage on every weapon slot.
    Damage,
    /// +100/64 world units of radius on every weapon slot.
    Radius,
    /// Cooldown and shot interval shortened by 10% on every weapon slot.
    Cooldown,
    /// +30 maximum and current hit points.
    MaxHp,
    /// +40 hit points regenerated per minute.
    Regen,
    /// +20% experience from kills.
    XpGain,
    /// +10% hostiles per wave.
    MobCount,
}

impl Upgrade {
    /// Every upgrade in presentation order.
    pub const ALL: [Upgrade; 9] = [
        Upgrade::MoveSpeed,
        Upgrade::ExtraProjectiles,
        Upgrade::Damage,
        Upgrade::Radius,
        Upgrade::Cooldown,
        Upgrade::MaxHp,
        Upgrade::Regen,
        Upgrade::XpGain,
        Upgrade::MobCount,
    ];

    /// Short human readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Upgrade::MoveSpeed => "+50 move speed",
            Upgrade::ExtraProjectiles => "+1 projectile for all weapons",
            Upgrade::Damage => "+5 damage for all weapons",
            Upgrade::Radius => "+100 radius for all weapons",
            Upgrade::Cooldown => "-10% cooldown for all weapons",
            Upgrade::MaxHp => "+30 HP (current and max)",
            Upgrade::Regen => "+40 HP regen per minute",
            Upgrade::XpGain => "+20% experience gain",
            Upgrade::MobCount => "+10% enemy count",
        }
    }
}

/// Level and experience of the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Experience {
    /// Levels gained so far.
    pub level: u32,
    /// Experience accumulated toward the next level.
    pub current: u32,
    /// Experience needed to reach the next level.
    pub to_next: u32,
}

impl Experience {
    /// Fresh record at level zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: 0,
            current: 0,
            to_next: FIRST_LEVEL_THRESHOLD,
        }
    }

    /// Adds experience and returns how many levels were gained.
    pub fn gain(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_add(amount);
        let mut levels = 0;
        while self.to_next > 0 && self.current >= self.to_next {
            self.current -= self.to_next;
            self.level += 1;
            self.to_next = (self.to_next as f32 * LEVEL_THRESHOLD_GROWTH) as u32;
            levels += 1;
        }
        levels
    }
}

impl Default for Experience {
    fn default() -> Self {
        Self::new()
    }
}

/// Session-wide multipliers raised by upgrades.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Multiplier on experience awarded per kill.
    pub experience_gain: f32,
    /// Multiplier on hostiles spawned per wave.
    pub spawn_count: f32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            experience_gain: 1.0,
            spawn_count: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_grow_per_level() {
        let mut experience = Experience::new();

        assert_eq!(experience.gain(90), 0);
        assert_eq!(experience.gain(10), 1);
        assert_eq!(experience.level, 1);
        assert_eq!(experience.current, 0);
        assert_eq!(experience.to_next, 110);
    }

    #[test]
    fn large_gain_crosses_several_levels() {
        let mut experience = Experience::new();

        let levels = experience.gain(100 + 110 + 5);

        assert_eq!(levels, 2);
        assert_eq!(experience.current, 5);
        assert_eq!(experience.to_next, 121);
    }
}
