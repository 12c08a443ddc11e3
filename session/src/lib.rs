#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Owns the world and every system and runs the fixed per-tick pipeline.
//!
//! Each stage reads fresh views, emits commands and has them applied before
//! the next stage runs, so later stages observe earlier effects in the same
//! tick. Movement always precedes weapons, which precede projectile
//! resolution.

use std::time::Duration;

use glam::Vec2;
use iso_arena_core::{Allegiance, Command, Event, Footprint, Upgrade};
use iso_arena_system_bootstrap::{ArenaConfig, Bootstrap, HostileSettings};
use iso_arena_system_input::{KeySource, PlayerInput, TimeScale};
use iso_arena_system_movement::Movement;
use iso_arena_system_progression::{Progression, UpgradeOffer, UpgradePolicy};
use iso_arena_system_projectiles::Projectiles;
use iso_arena_system_pursuit::Pursuit;
use iso_arena_system_spawning::{self as spawning, Spawning};
use iso_arena_system_weapons::Weapons;
use iso_arena_world::{self as world, query, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// What happened during a call to [`Session::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// The simulation advanced by one tick.
    Advanced,
    /// The game speed is zero.
    Paused,
    /// A level-up offer waits for [`Session::choose_upgrade`].
    AwaitingUpgrade,
    /// The player has been defeated.
    GameOver,
}

/// A running arena.
#[derive(Debug)]
pub struct Session {
    world: World,
    time_scale: TimeScale,
    player_input: PlayerInput,
    pursuit: Pursuit,
    spawning: Spawning,
    movement: Movement,
    weapons: Weapons,
    projectiles: Projectiles,
    progression: Progression,
    tick_events: Vec<Event>,
    events: Vec<Event>,
    commands: Vec<Command>,
    kills: u32,
    game_over: bool,
}

impl Session {
    /// Builds and populates a fresh arena from `config`.
    #[must_use]
    pub fn new(config: &ArenaConfig) -> Self {
        let seed = config.seed;
        let mut session = Self {
            world: World::new(),
            time_scale: TimeScale::new(),
            player_input: PlayerInput::new(),
            pursuit: Pursuit::new(),
            spawning: Spawning::new(spawning_config(
                &config.hostiles,
                seed.wrapping_add(1),
            )),
            movement: Movement::new(),
            weapons: Weapons::new(),
            projectiles: Projectiles::new(),
            progression: Progression::new(seed.wrapping_add(2)),
            tick_events: Vec::new(),
            events: Vec::new(),
            commands: Vec::new(),
            kills: 0,
            game_over: false,
        };

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Bootstrap::new(config.clone()).populate(&mut rng, &mut session.commands);
        session.flush();
        log::info!(
            "arena ready: {}x{} tiles, {} entities",
            config.arena.columns,
            config.arena.rows,
            query::entity_count(&session.world)
        );
        session
    }

    /// Authoritative world state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Game-speed control.
    #[must_use]
    pub fn time_scale(&self) -> &TimeScale {
        &self.time_scale
    }

    /// Hostiles defeated so far.
    #[must_use]
    pub fn kills(&self) -> u32 {
        self.kills
    }

    /// Reports whether the player has been defeated.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Events produced since the most recent tick began.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Oldest level-up offer awaiting a choice.
    #[must_use]
    pub fn pending_offer(&self) -> Option<&UpgradeOffer> {
        self.progression.pending_offer()
    }

    /// Applies the upgrade at `index` of the pending offer.
    ///
    /// Returns the applied upgrade, or `None` when nothing is pending or the
    /// index is out of range.
    pub fn choose_upgrade(&mut self, index: usize) -> Option<Upgrade> {
        let upgrade = self.progression.choose(index)?;
        log::info!("upgrade chosen: {}", upgrade.description());
        self.commands.push(Command::ApplyUpgrade { upgrade });
        self.flush();
        Some(upgrade)
    }

    /// Resolves every pending offer with `policy`.
    pub fn resolve_offers<P: UpgradePolicy + ?Sized>(&mut self, policy: &mut P) {
        while let Some(offer) = self.progression.pending_offer().copied() {
            let index = policy.pick(&offer);
            if self.choose_upgrade(index).is_none() {
                log::warn!("upgrade policy picked invalid index {index}; taking the first choice");
                let _ = self.choose_upgrade(0);
            }
        }
    }

    /// Advances the arena by `dt` of wall time, scaled by the game speed.
    pub fn step<K: KeySource + ?Sized>(&mut self, dt: Duration, keys: &K) -> StepOutcome {
        let _ = self.time_scale.update(keys);
        if self.game_over {
            return StepOutcome::GameOver;
        }
        if self.progression.pending_offer().is_some() {
            return StepOutcome::AwaitingUpgrade;
        }
        if self.time_scale.is_paused() {
            return StepOutcome::Paused;
        }

        self.tick_events.clear();
        world::apply(
            &mut self.world,
            Command::Tick {
                dt: self.time_scale.scale_dt(dt),
            },
            &mut self.tick_events,
        );
        self.events.clear();
        self.events.extend_from_slice(&self.tick_events);

        self.spawning.handle(
            &self.tick_events,
            player_position(&self.world),
            query::tile_map(&self.world),
            &query::modifiers(&self.world),
            &mut self.commands,
        );
        self.flush();

        let actors = query::actor_view(&self.world);
        self.player_input
            .handle(keys, actors.player(), &mut self.commands);
        self.pursuit
            .handle(&actors, query::camera(&self.world), &mut self.commands);
        self.flush();

        self.movement.handle(
            &self.tick_events,
            &query::entity_view(&self.world),
            query::tile_map(&self.world),
            query::camera(&self.world),
            query::clock_seconds(&self.world),
            &mut self.commands,
        );
        self.flush();

        self.weapons.handle(
            &self.tick_events,
            &query::actor_view(&self.world),
            query::camera(&self.world),
            &mut self.commands,
        );
        self.flush();

        self.projectiles.handle(
            &self.tick_events,
            &query::projectile_view(&self.world),
            &query::actor_view(&self.world),
            query::camera(&self.world),
            &mut self.commands,
        );
        self.flush();

        self.progression.handle(
            &self.tick_events,
            &query::actor_view(&self.world),
            &query::modifiers(&self.world),
            &mut self.commands,
        );
        self.flush();
        self.progression.record_level_ups(&self.events);

        if let Some(target) = player_position(&self.world) {
            self.commands.push(Command::FocusCamera { target });
            self.flush();
        }

        self.observe();
        StepOutcome::Advanced
    }

    fn flush(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn observe(&mut self) {
        for event in &self.events {
            match event {
                Event::ActorDefeated {
                    allegiance: Allegiance::Hostile,
                    ..
                } => self.kills += 1,
                Event::LevelReached { level } => log::info!("level {level} reached"),
                _ => {}
            }
        }
        if let Some(offer) = self.progression.pending_offer() {
            if self
                .events
                .iter()
                .any(|event| matches!(event, Event::LevelReached { .. }))
            {
                let choices: Vec<&str> = offer
                    .choices
                    .iter()
                    .map(|upgrade| upgrade.description())
                    .collect();
                log::info!("upgrade offer for level {}: {choices:?}", offer.level);
            }
        }

        let defeated = query::actor_view(&self.world)
            .player()
            .and_then(|player| player.health)
            .map_or(true, |health| health.is_depleted());
        if defeated {
            self.game_over = true;
            log::info!(
                "game over after {:.1}s with {} kills",
                query::clock_seconds(&self.world),
                self.kills
            );
        }
    }
}

fn player_position(world: &World) -> Option<Vec2> {
    query::player(world).and_then(|player| query::position(world, player))
}

fn spawning_config(settings: &HostileSettings, rng_seed: u64) -> spawning::Config {
    let [width, height] = settings.footprint;
    spawning::Config {
        rng_seed,
        speed: settings.speed,
        footprint: Footprint::new(width, height),
        base_health: settings.base_health,
        health_per_wave: settings.health_per_wave,
        base_contact_damage: settings.base_contact_damage,
        contact_damage_per_wave: settings.contact_damage_per_wave,
        spawn_delay: settings.spawn_delay,
        wave_duration: settings.wave_duration,
        wave_divisor: settings.wave_divisor,
        inner_radius: settings.inner_radius,
        outer_radius: settings.outer_radius,
    }
}
