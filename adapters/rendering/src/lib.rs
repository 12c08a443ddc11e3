#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation contracts shared by arena adapters.
//!
//! The simulation thread captures a [`Frame`] of drawables after every tick
//! and hands it to the presentation thread through a [`FrameExchange`]. The
//! exchange swaps whole buffers under its lock, so neither side holds the
//! lock while drawing or simulating.

use std::{
    mem,
    sync::{Mutex, MutexGuard, PoisonError},
};

use anyhow::Result as AnyResult;
use glam::Vec2;
use iso_arena_core::{
    Allegiance, DamageCooldown, EntityId, IsoCamera, ScreenRect, SourceRect, SpriteSnapshot,
    SpriteView, Tint,
};

/// Tint an actor flashes toward right after taking contact damage.
pub const DAMAGE_FLASH: Tint = Tint::rgba(255, 80, 80, 255);

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates a color from byte RGBA values.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: alpha as f32 / 255.0,
        }
    }
}

impl From<Tint> for Color {
    fn from(tint: Tint) -> Self {
        Self::from_rgba_u8(tint.red, tint.green, tint.blue, tint.alpha)
    }
}

/// Sprite projected onto the screen, ready for a backend to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct Drawable {
    /// Entity the sprite belongs to.
    pub entity: EntityId,
    /// Screen-space anchor of the sprite.
    pub screen_position: Vec2,
    /// Texture name resolved by the backend.
    pub texture: String,
    /// Sampled texture region.
    pub source: SourceRect,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Uniform scale from texels to screen pixels.
    pub scale: f32,
    /// Color multiplier.
    pub tint: Color,
}

/// Everything visible after one simulation tick, in draw order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    /// Simulation tick the frame was captured after.
    pub tick: u64,
    /// Sprites ordered back to front.
    pub drawables: Vec<Drawable>,
}

impl Frame {
    /// Creates an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the frame contents with the sprites visible through `camera`.
    ///
    /// Sprites whose screen rectangle misses the camera bounds are skipped.
    /// The rest are ordered by world y, then world x, so nearer sprites are
    /// drawn last. `now` is the simulation clock used for damage flashes.
    pub fn capture(&mut self, tick: u64, sprites: &SpriteView, camera: &IsoCamera, now: f64) {
        self.tick = tick;
        self.drawables.clear();

        let bounds = camera.bounds();
        let mut visible: Vec<&SpriteSnapshot> = sprites
            .iter()
            .filter(|snapshot| {
                let screen = camera.world_to_screen(snapshot.position);
                let size = snapshot.sprite.size;
                ScreenRect::new(screen.x, screen.y, size.x, size.y).intersects(&bounds)
            })
            .collect();
        visible.sort_by(|lhs, rhs| {
            lhs.position
                .y
                .total_cmp(&rhs.position.y)
                .then(lhs.position.x.total_cmp(&rhs.position.x))
        });

        self.drawables.extend(visible.into_iter().map(|snapshot| {
            let sprite = &snapshot.sprite;
            let tint = match (snapshot.allegiance, snapshot.damage_cooldown) {
                (Allegiance::Player, Some(cooldown)) => damage_tint(&cooldown, now),
                _ => sprite.tint,
            };
            Drawable {
                entity: snapshot.id,
                screen_position: camera.world_to_screen(snapshot.position),
                texture: sprite.texture.clone(),
                source: sprite.source,
                rotation: sprite.rotation,
                scale: texel_scale(sprite.source, sprite.size) * camera.zoom(),
                tint: Color::from(tint),
            }
        }));
    }
}

/// Largest uniform scale that fits the source region into the display size.
fn texel_scale(source: SourceRect, size: Vec2) -> f32 {
    if source.width <= 0 || source.height <= 0 {
        return 1.0;
    }
    (size.x / source.width as f32).min(size.y / source.height as f32)
}

/// Flash tint of an actor that recently took contact damage.
///
/// White when the actor was never hit or the hit is at least two cooldowns
/// old; otherwise white blended toward [`DAMAGE_FLASH`] by how much of the
/// cooldown is left.
#[must_use]
pub fn damage_tint(cooldown: &DamageCooldown, now: f64) -> Tint {
    let Some(elapsed) = cooldown.elapsed_at(now) else {
        return Tint::WHITE;
    };
    if cooldown.cooldown <= 0.0 || elapsed >= 2.0 * cooldown.cooldown {
        return Tint::WHITE;
    }

    let t = (1.0 - elapsed / cooldown.cooldown).clamp(0.0, 1.0) as f32;
    let blend = |from: u8, to: u8| (f32::from(from) + (f32::from(to) - f32::from(from)) * t) as u8;
    Tint::rgba(
        blend(255, DAMAGE_FLASH.red),
        blend(255, DAMAGE_FLASH.green),
        blend(255, DAMAGE_FLASH.blue),
        255,
    )
}

#[derive(Debug, Default)]
struct Slot {
    front: Frame,
    fresh: bool,
}

/// Mutex-guarded double buffer between the simulation and a presenter.
#[derive(Debug, Default)]
pub struct FrameExchange {
    slot: Mutex<Slot>,
}

impl FrameExchange {
    /// Creates an exchange holding an empty, stale frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps `back` into the front buffer and marks it fresh.
    ///
    /// `back` receives the previous front buffer so its allocation is reused.
    pub fn publish(&self, back: &mut Frame) {
        let mut slot = self.lock();
        mem::swap(&mut slot.front, back);
        slot.fresh = true;
    }

    /// Swaps the fresh front buffer into `into`.
    ///
    /// Returns `false` and leaves `into` untouched when nothing new was
    /// published since the last call.
    pub fn take_latest(&self, into: &mut Frame) -> bool {
        let mut slot = self.lock();
        if !slot.fresh {
            return false;
        }
        mem::swap(&mut slot.front, into);
        slot.fresh = false;
        true
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Backend that shows captured frames.
pub trait Presenter {
    /// Presents one frame.
    fn present(&mut self, frame: &Frame) -> AnyResult<()>;
}
