//! Component records that may be attached to an entity independently.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Default interval between two contact hits on the same victim, in seconds.
pub const DEFAULT_DAMAGE_COOLDOWN: f64 = 0.2;

/// Side an actor fights for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Allegiance {
    /// Controlled by the player. Never selected as a weapon target.
    Player,
    /// Enemy of the player.
    Hostile,
    /// Scenery and effects that take no side.
    #[default]
    Neutral,
}

impl Allegiance {
    /// Reports whether the allegiance is the player's side.
    #[must_use]
    pub const fn is_player(self) -> bool {
        matches!(self, Allegiance::Player)
    }
}

/// Velocity and speed of a moving entity.
///
/// `velocity` is expressed in screen pixels per second and already includes
/// `speed`; it is either zero or a unit direction scaled by a scalar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Screen-space velocity applied by the movement resolver.
    pub velocity: Vec2,
    /// Magnitude steering systems scale unit directions by.
    pub speed: f32,
}

impl Motion {
    /// Creates a stationary motion record with the provided speed.
    #[must_use]
    pub const fn at_rest(speed: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            speed,
        }
    }

    /// Returns `direction` normalized and scaled by the stored speed, or zero
    /// when the direction has no length.
    #[must_use]
    pub fn steer(&self, direction: Vec2) -> Vec2 {
        direction.normalize_or_zero() * self.speed
    }
}

/// Render extent of an entity in screen pixels, reused to derive collision boxes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    width: f32,
    height: f32,
}

impl Footprint {
    /// Creates a footprint from its pixel extent.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Horizontal extent.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical extent.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Extent as a vector.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Hit points of an actor. `current` never leaves `0..=max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawHealth")]
pub struct Health {
    current: u32,
    max: u32,
}

/// Decoded health before clamping.
#[derive(Deserialize)]
struct RawHealth {
    current: u32,
    max: u32,
}

impl From<RawHealth> for Health {
    fn from(raw: RawHealth) -> Self {
        Self::with_current(raw.current, raw.max)
    }
}

impl Health {
    /// Creates a full health record.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Creates a health record with explicit current points clamped to `max`.
    #[must_use]
    pub fn with_current(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Reports whether the actor has no hit points left.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Subtracts up to `amount` points and returns how many were removed.
    pub fn damage(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.current);
        self.current -= removed;
        removed
    }

    /// Restores up to `amount` points without exceeding `max` and returns how many were added.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.max.saturating_sub(self.current));
        self.current += added;
        added
    }

    /// Raises both the maximum and the current points by `amount`.
    pub fn raise_max(&mut self, amount: u32) {
        self.max = self.max.saturating_add(amount);
        self.current = self.current.saturating_add(amount).min(self.max);
    }
}

/// Throttles how often solid contact may damage an actor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageCooldown {
    /// Simulation time of the most recent contact hit, if any.
    pub last_damage_at: Option<f64>,
    /// Minimum seconds between two contact hits.
    pub cooldown: f64,
}

impl DamageCooldown {
    /// Creates a cooldown record that has never been triggered.
    #[must_use]
    pub const fn new(cooldown: f64) -> Self {
        Self {
            last_damage_at: None,
            cooldown,
        }
    }

    /// Reports whether a contact hit at time `now` is permitted.
    #[must_use]
    pub fn allows_damage_at(&self, now: f64) -> bool {
        match self.last_damage_at {
            Some(last) => now - last >= self.cooldown,
            None => true,
        }
    }

    /// Seconds elapsed since the last contact hit, if any.
    #[must_use]
    pub fn elapsed_at(&self, now: f64) -> Option<f64> {
        self.last_damage_at.map(|last| now - last)
    }
}

impl Default for DamageCooldown {
    fn default() -> Self {
        Self::new(DEFAULT_DAMAGE_COOLDOWN)
    }
}

/// Damage an attacker deals to the other party of a solid contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactDamage {
    /// Hit points removed per permitted contact.
    pub amount: u32,
}

/// Passive health regeneration rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Regeneration {
    /// Hit points restored per second.
    pub per_second: f32,
}

/// RGBA tint applied to a sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tint {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Alpha channel.
    pub alpha: u8,
}

impl Tint {
    /// Opaque white, the neutral tint.
    pub const WHITE: Tint = Tint::rgba(255, 255, 255, 255);

    /// Creates a tint from its channels.
    #[must_use]
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns the tint with its alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }
}

impl Default for Tint {
    fn default() -> Self {
        Tint::WHITE
    }
}

/// Region of a texture sampled by a sprite, in texels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRect {
    /// Left texel.
    pub left: i32,
    /// Top texel.
    pub top: i32,
    /// Width in texels.
    pub width: i32,
    /// Height in texels.
    pub height: i32,
}

impl SourceRect {
    /// Creates a source rectangle.
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Square region anchored at the texture origin.
    #[must_use]
    pub const fn square(extent: i32) -> Self {
        Self::new(0, 0, extent, extent)
    }
}

/// Render record consumed by presentation. The simulation never reads pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Name the asset collaborator resolves to a texture.
    pub texture: String,
    /// Sampled texture region.
    pub source: SourceRect,
    /// Displayed extent in screen pixels.
    pub size: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Color multiplier.
    pub tint: Tint,
}

impl Sprite {
    /// Creates an unrotated, untinted sprite.
    #[must_use]
    pub fn new(texture: impl Into<String>, source: SourceRect, size: Vec2) -> Self {
        Self {
            texture: texture.into(),
            source,
            size,
            rotation: 0.0,
            tint: Tint::WHITE,
        }
    }

    /// Returns the sprite with the provided tint.
    #[must_use]
    pub fn with_tint(mut self, tint: Tint) -> Self {
        self.tint = tint;
        self
    }

    /// Returns the sprite with the provided rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}
