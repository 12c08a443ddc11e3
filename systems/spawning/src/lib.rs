#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed hostile wave spawning.
//!
//! A spawn timer accumulates simulated time. Once it crosses the spawn delay
//! the whole seconds it holds are converted into a batch of hostiles placed on
//! a ring around the player. Waves grow stronger and larger as the session
//! clock advances.

use std::f32::consts::TAU;

use glam::Vec2;
use iso_arena_core::{
    ActorBlueprint, Allegiance, Command, DamageCooldown, Event, Footprint, Health, Modifiers,
    Motion, SourceRect, Sprite, TileMap,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Texture of a spawned hostile.
pub const HOSTILE_TEXTURE: &str = "minotaur";

/// Distance kept between a spawned hostile and the arena edge, in world units.
const EDGE_MARGIN: f32 = 1.0;

/// Wave tuning used to construct the spawning system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Seed of the placement generator.
    pub rng_seed: u64,
    /// Movement speed of hostiles in screen pixels per second.
    pub speed: f32,
    /// Footprint of hostiles.
    pub footprint: Footprint,
    /// Hit points before wave scaling.
    pub base_health: u32,
    /// Extra hit points per multiplier step.
    pub health_per_wave: u32,
    /// Contact damage before wave scaling.
    pub base_contact_damage: u32,
    /// Extra contact damage per multiplier step.
    pub contact_damage_per_wave: u32,
    /// Seconds the spawn timer must reach before a batch is released.
    pub spawn_delay: f64,
    /// Seconds of play per multiplier step.
    pub wave_duration: f64,
    /// Divisor turning the multiplier into a base hostile count.
    pub wave_divisor: f64,
    /// Closest spawn distance from the player in world units.
    pub inner_radius: f32,
    /// Farthest spawn distance from the player in world units.
    pub outer_radius: f32,
}

impl Config {
    /// Creates the shipped wave tuning with the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            speed: 80.0,
            footprint: Footprint::new(64.0, 64.0),
            base_health: 20,
            health_per_wave: 2,
            base_contact_damage: 10,
            contact_damage_per_wave: 2,
            spawn_delay: 2.0,
            wave_duration: 20.0,
            wave_divisor: 1.5,
            inner_radius: 4.0,
            outer_radius: 12.0,
        }
    }
}

/// Pure system that releases hostile batches as time advances.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    elapsed: f64,
    timer: f64,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            elapsed: 0.0,
            timer: 0.0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Seconds of simulated time observed so far.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Current wave multiplier: one for the first wave, then one per wave duration.
    #[must_use]
    pub fn wave_multiplier(&self) -> u32 {
        if self.config.wave_duration <= 0.0 || self.elapsed < self.config.wave_duration {
            1
        } else {
            (self.elapsed / self.config.wave_duration).floor() as u32
        }
    }

    /// Consumes events and the player position to emit spawn commands.
    ///
    /// Without a player the timers keep running but nothing is placed.
    pub fn handle(
        &mut self,
        events: &[Event],
        player: Option<Vec2>,
        tile_map: &TileMap,
        modifiers: &Modifiers,
        out: &mut Vec<Command>,
    ) {
        let dt: f64 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(dt.as_secs_f64()),
                _ => None,
            })
            .sum();
        if dt <= 0.0 {
            return;
        }

        self.elapsed += dt;
        self.timer += dt;

        let Some(player) = player else {
            return;
        };
        if self.timer < self.config.spawn_delay {
            return;
        }

        let count = self.release_batch(modifiers);
        let multiplier = self.wave_multiplier();
        let health = self.config.base_health + self.config.health_per_wave * multiplier;
        let contact_damage =
            self.config.base_contact_damage + self.config.contact_damage_per_wave * multiplier;

        for _ in 0..count {
            let position = self.ring_position(player, tile_map);
            out.push(Command::SpawnActor {
                blueprint: self.hostile(position, health, contact_damage),
            });
        }
    }

    /// Converts the whole seconds held by the timer into a hostile count.
    fn release_batch(&mut self, modifiers: &Modifiers) -> u32 {
        let base = (f64::from(self.wave_multiplier()) / self.config.wave_divisor).floor();
        let used = self.timer.floor();
        self.timer -= used;

        let count = ((base * used / self.config.spawn_delay).floor() as u32).max(1);
        ((count as f32 * modifiers.spawn_count).floor() as u32).max(1)
    }

    fn ring_position(&mut self, player: Vec2, tile_map: &TileMap) -> Vec2 {
        let angle = self.rng.gen_range(0.0..TAU);
        let inner = self.config.inner_radius;
        let outer = self.config.outer_radius.max(inner);
        let distance = self.rng.gen_range(inner..=outer);
        let position = player + Vec2::from_angle(angle) * distance;

        let extent = Vec2::new(tile_map.columns() as f32, tile_map.rows() as f32);
        let low = Vec2::splat(EDGE_MARGIN).min(extent / 2.0);
        let high = (extent - Vec2::splat(EDGE_MARGIN)).max(low);
        position.clamp(low, high)
    }

    fn hostile(&self, position: Vec2, health: u32, contact_damage: u32) -> ActorBlueprint {
        let footprint = self.config.footprint;
        ActorBlueprint::new(position, Allegiance::Hostile)
            .with_motion(Motion::at_rest(self.config.speed))
            .with_footprint(footprint)
            .with_solid(true)
            .with_health(Health::new(health))
            .with_damage_cooldown(DamageCooldown::default())
            .with_contact_damage(contact_damage)
            .with_sprite(Sprite::new(
                HOSTILE_TEXTURE,
                SourceRect::new(0, 0, footprint.width() as i32, footprint.height() as i32),
                footprint.size(),
            ))
            .pursuing_player()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn tick(seconds: u64) -> [Event; 1] {
        [Event::TimeAdvanced {
            dt: Duration::from_secs(seconds),
        }]
    }

    #[test]
    fn multiplier_steps_every_wave_duration() {
        let mut spawning = Spawning::new(Config::new(1));
        assert_eq!(spawning.wave_multiplier(), 1);

        spawning.elapsed = 39.9;
        assert_eq!(spawning.wave_multiplier(), 1);

        spawning.elapsed = 40.0;
        assert_eq!(spawning.wave_multiplier(), 2);

        spawning.elapsed = 95.0;
        assert_eq!(spawning.wave_multiplier(), 4);
    }

    #[test]
    fn batch_scales_with_whole_seconds_and_modifier() {
        let mut spawning = Spawning::new(Config::new(1));
        spawning.elapsed = 60.0;
        spawning.timer = 4.5;

        let modifiers = Modifiers {
            experience_gain: 1.0,
            spawn_count: 1.5,
        };
        let count = spawning.release_batch(&modifiers);

        // base = floor(3 / 1.5) = 2; floor(2 * 4 / 2) = 4; floor(4 * 1.5) = 6.
        assert_eq!(count, 6);
        assert!((spawning.timer - 0.5).abs() < 1e-9);
    }

    #[test]
    fn early_batches_never_drop_below_one() {
        let mut spawning = Spawning::new(Config::new(1));
        spawning.timer = 2.0;

        assert_eq!(spawning.release_batch(&Modifiers::default()), 1);
    }

    #[test]
    fn nothing_spawns_without_a_player_but_time_still_counts() {
        let mut spawning = Spawning::new(Config::new(7));
        let mut out = Vec::new();

        spawning.handle(
            &tick(3),
            None,
            &TileMap::open(32, 32),
            &Modifiers::default(),
            &mut out,
        );

        assert!(out.is_empty());
        assert_eq!(spawning.elapsed(), 3.0);
    }

    #[test]
    fn placement_is_clamped_inside_the_map() {
        let mut spawning = Spawning::new(Config::new(3));
        let tiles = TileMap::open(6, 6);

        for _ in 0..64 {
            let position = spawning.ring_position(Vec2::new(1.0, 1.0), &tiles);
            assert!((1.0..=5.0).contains(&position.x), "x escaped: {position:?}");
            assert!((1.0..=5.0).contains(&position.y), "y escaped: {position:?}");
        }
    }
}
