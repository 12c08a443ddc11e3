#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Keyboard boundary, player steering and game-speed control.
//!
//! Adapters expose pressed keys through [`KeySource`]. [`PlayerInput`] turns
//! the movement keys into a velocity for the player and [`TimeScale`] turns the
//! speed keys into a multiplier applied to every tick.

use std::{collections::BTreeSet, time::Duration};

use glam::Vec2;
use iso_arena_core::{ActorSnapshot, Command};

/// Highest game-speed multiplier.
pub const MAX_TIME_SCALE: u32 = 8;

/// Keys the simulation reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Steers up the screen.
    W,
    /// Steers down the screen.
    S,
    /// Steers left.
    A,
    /// Steers right.
    D,
    /// Speeds the game up.
    Equal,
    /// Slows the game down.
    Hyphen,
    /// Toggles pause.
    Escape,
}

/// Read-only view of the keyboard supplied by an adapter.
pub trait KeySource {
    /// Reports whether `key` is currently held.
    fn is_key_down(&self, key: Key) -> bool;
}

/// Set of held keys, usable wherever a [`KeySource`] is expected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    held: BTreeSet<Key>,
}

impl KeyState {
    /// Creates a state where no key is held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding exactly the provided keys.
    #[must_use]
    pub fn holding(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            held: keys.into_iter().collect(),
        }
    }

    /// Marks a key as held.
    pub fn press(&mut self, key: Key) {
        let _ = self.held.insert(key);
    }

    /// Marks a key as released.
    pub fn release(&mut self, key: Key) {
        let _ = self.held.remove(&key);
    }
}

impl KeySource for KeyState {
    fn is_key_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }
}

/// Pure system translating movement keys into the player's velocity.
#[derive(Debug, Default)]
pub struct PlayerInput;

impl PlayerInput {
    /// Creates the steering system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits a velocity change for the player when the held keys call for one.
    pub fn handle<K: KeySource + ?Sized>(
        &mut self,
        keys: &K,
        player: Option<&ActorSnapshot>,
        out: &mut Vec<Command>,
    ) {
        let Some(player) = player else {
            return;
        };
        let Some(motion) = player.motion else {
            return;
        };

        let velocity = motion.steer(steering_direction(keys));
        if velocity != motion.velocity {
            out.push(Command::SetVelocity {
                entity: player.id,
                velocity,
            });
        }
    }
}

/// Screen-space direction built from the held movement keys. Not normalized.
#[must_use]
pub fn steering_direction<K: KeySource + ?Sized>(keys: &K) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if keys.is_key_down(Key::W) {
        direction.y -= 1.0;
    }
    if keys.is_key_down(Key::S) {
        direction.y += 1.0;
    }
    if keys.is_key_down(Key::A) {
        direction.x -= 1.0;
    }
    if keys.is_key_down(Key::D) {
        direction.x += 1.0;
    }
    direction
}

/// Game-speed multiplier driven by edge-triggered key presses.
///
/// A scale of zero means paused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeScale {
    scale: u32,
    faster_held: bool,
    slower_held: bool,
    pause_held: bool,
}

impl Default for TimeScale {
    fn default() -> Self {
        Self {
            scale: 1,
            faster_held: false,
            slower_held: false,
            pause_held: false,
        }
    }
}

impl TimeScale {
    /// Creates a running scale of one.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current multiplier.
    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// Reports whether the game is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.scale == 0
    }

    /// Reacts to keys that went down since the previous update.
    pub fn update<K: KeySource + ?Sized>(&mut self, keys: &K) -> u32 {
        if pressed(keys, Key::Equal, &mut self.faster_held) {
            self.scale = if self.is_paused() {
                1
            } else {
                (self.scale + 1).min(MAX_TIME_SCALE)
            };
        }
        if pressed(keys, Key::Hyphen, &mut self.slower_held) && !self.is_paused() {
            self.scale = self.scale.saturating_sub(1).max(1);
        }
        if pressed(keys, Key::Escape, &mut self.pause_held) {
            self.scale = if self.is_paused() { 1 } else { 0 };
        }
        self.scale
    }

    /// Stretches a frame delta by the current multiplier.
    #[must_use]
    pub fn scale_dt(&self, dt: Duration) -> Duration {
        dt.saturating_mul(self.scale)
    }
}

/// Rising-edge detector: true only on the update the key goes down.
fn pressed<K: KeySource + ?Sized>(keys: &K, key: Key, held: &mut bool) -> bool {
    let down = keys.is_key_down(key);
    let rising = down && !*held;
    *held = down;
    rising
}
