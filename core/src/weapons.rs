//! Weapon slots, their runtime burst state, and the projectiles they create.

use serde::{Deserialize, Serialize};

use crate::EntityId;

/// Number of weapon slots an armed actor owns.
pub const ARMORY_SLOTS: usize = 2;

/// Cosmetic weapon family. Carries no behaviour of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Ranged staff that launches magic balls.
    MagicStick,
    /// Melee blade swung in a ring around the wielder.
    Sword,
}

/// How a weapon delivers its damage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum WeaponShape {
    /// Fires a single travelling projectile per shot.
    Linear {
        /// Projectile velocity magnitude in screen pixels per second.
        projectile_speed: f32,
    },
    /// Damages everything around the wielder instantly.
    Radial,
}

/// Runtime burst bookkeeping of a weapon slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeaponState {
    /// Shots left in the current burst.
    pub shots_pending: u32,
    /// Countdown to the next shot of the burst.
    pub shot_timer: f32,
    /// Countdown until the slot may start a new burst.
    pub cooldown_remaining: f32,
    /// Entity the current burst is aimed at.
    pub target: Option<EntityId>,
}

/// Logical phase derived from a [`WeaponState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponPhase {
    /// Waiting for a target.
    Idle,
    /// Mid-burst with shots still pending.
    Bursting,
    /// Recovering after a completed burst.
    Recovering,
}

impl WeaponState {
    /// Phase the state machine is currently in.
    #[must_use]
    pub fn phase(&self) -> WeaponPhase {
        if self.shots_pending > 0 {
            WeaponPhase::Bursting
        } else if self.cooldown_remaining > 0.0 {
            WeaponPhase::Recovering
        } else {
            WeaponPhase::Idle
        }
    }
}

/// Static configuration and runtime state of a single weapon slot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponSlot {
    /// Cosmetic family.
    pub kind: WeaponKind,
    /// Delivery mechanism.
    #[serde(flatten)]
    pub shape: WeaponShape,
    /// Target search radius in world units; also the damage radius of radial weapons.
    pub radius: f32,
    /// Recovery time after a burst completes, in seconds.
    pub cooldown: f32,
    /// Hit points removed per shot.
    pub damage: u32,
    /// Shots fired per burst. Zero disables the slot.
    pub shots_per_attack: u32,
    /// Gap between shots within a burst, in seconds.
    pub shot_interval: f32,
    /// Burst bookkeeping.
    #[serde(skip)]
    pub state: WeaponState,
}

impl WeaponSlot {
    /// Creates a linear weapon slot in the idle state.
    #[must_use]
    pub fn linear(
        kind: WeaponKind,
        radius: f32,
        cooldown: f32,
        shots_per_attack: u32,
        shot_interval: f32,
        damage: u32,
        projectile_speed: f32,
    ) -> Self {
        Self {
            kind,
            shape: WeaponShape::Linear { projectile_speed },
            radius,
            cooldown,
            damage,
            shots_per_attack,
            shot_interval,
            state: WeaponState::default(),
        }
    }

    /// Creates a radial weapon slot in the idle state.
    #[must_use]
    pub fn radial(
        kind: WeaponKind,
        radius: f32,
        cooldown: f32,
        shots_per_attack: u32,
        shot_interval: f32,
        damage: u32,
    ) -> Self {
        Self {
            kind,
            shape: WeaponShape::Radial,
            radius,
            cooldown,
            damage,
            shots_per_attack,
            shot_interval,
            state: WeaponState::default(),
        }
    }
}

/// Fixed set of weapon slots owned by an actor. Each slot evolves independently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Armory {
    /// Slots in firing order. `None` marks an empty slot.
    pub slots: [Option<WeaponSlot>; ARMORY_SLOTS],
}

impl Armory {
    /// Creates an armory from its slots.
    #[must_use]
    pub const fn new(slots: [Option<WeaponSlot>; ARMORY_SLOTS]) -> Self {
        Self { slots }
    }

    /// Iterates over occupied slots alongside their index.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &WeaponSlot)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|slot| (index, slot)))
    }

    /// Mutable access to every occupied slot.
    pub fn occupied_mut(&mut self) -> impl Iterator<Item = &mut WeaponSlot> {
        self.slots.iter_mut().flatten()
    }
}

/// Shape of a spawned projectile or effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileShape {
    /// Travelling projectile that hits at most one target.
    Linear,
    /// Stationary cosmetic ring that only fades out.
    Radial,
}

/// Projectile or effect spawned by a weapon.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Behaviour of the entity.
    pub shape: ProjectileShape,
    /// Hit radius in screen pixels for linear projectiles, reach in world units for rings.
    pub radius: f32,
    /// Hit points removed on impact.
    pub damage: u32,
    /// Seconds elapsed since spawn.
    pub lifetime: f32,
    /// Seconds after which the entity expires.
    pub max_lifetime: f32,
}

impl Projectile {
    /// Fraction of the lifetime consumed, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.max_lifetime <= 0.0 {
            return 1.0;
        }
        (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
    }

    /// Reports whether the lifetime reached its limit.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.lifetime >= self.max_lifetime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_state_fields() {
        let mut state = WeaponState::default();
        assert_eq!(state.phase(), WeaponPhase::Idle);

        state.cooldown_remaining = 0.5;
        assert_eq!(state.phase(), WeaponPhase::Recovering);

        state.shots_pending = 2;
        assert_eq!(state.phase(), WeaponPhase::Bursting);
    }

    #[test]
    fn occupied_skips_empty_slots() {
        let sword = WeaponSlot::radial(WeaponKind::Sword, 3.0, 1.5, 1, 0.1, 5);
        let armory = Armory::new([None, Some(sword)]);

        let indices: Vec<usize> = armory.occupied().map(|(index, _)| index).collect();
        assert_eq!(indices, vec![1]);
    }

    #[test]
    fn progress_clamps() {
        let mut projectile = Projectile {
            shape: ProjectileShape::Radial,
            radius: 3.0,
            damage: 0,
            lifetime: 0.7,
            max_lifetime: 0.35,
        };
        assert_eq!(projectile.progress(), 1.0);
        assert!(projectile.is_expired());

        projectile.lifetime = 0.0;
        assert_eq!(projectile.progress(), 0.0);
        assert!(!projectile.is_expired());
    }
}
