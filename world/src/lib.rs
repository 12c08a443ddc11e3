#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the arena simulation.
//!
//! The world owns every entity's components, the arena floor, the camera, the
//! simulation clock and the player's progression. It only changes through
//! [`apply`], and it exposes read-only views through [`query`].

mod store;

use std::time::Duration;

use iso_arena_core::{
    Command, EntityId, Event, Experience, IsoCamera, Modifiers, TileMap, Upgrade,
};

use store::EntityStore;

const DEFAULT_ARENA_COLUMNS: u32 = 32;
const DEFAULT_ARENA_ROWS: u32 = 32;

const MOVE_SPEED_BONUS: f32 = 50.0;
const DAMAGE_BONUS: u32 = 5;
const RADIUS_BONUS: f32 = 100.0 / 64.0;
const COOLDOWN_FACTOR: f32 = 0.9;
const MAX_HEALTH_BONUS: u32 = 30;
const REGENERATION_BONUS: f32 = 40.0 / 60.0;
const EXPERIENCE_GAIN_FACTOR: f32 = 1.2;
const SPAWN_COUNT_FACTOR: f32 = 1.1;

/// Represents the authoritative arena state.
#[derive(Debug)]
pub struct World {
    entities: EntityStore,
    tile_map: TileMap,
    camera: IsoCamera,
    clock: Duration,
    tick_index: u64,
    experience: Experience,
    modifiers: Modifiers,
}

impl World {
    /// Creates an empty arena with an open floor and the default camera.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: EntityStore::new(),
            tile_map: TileMap::open(DEFAULT_ARENA_COLUMNS, DEFAULT_ARENA_ROWS),
            camera: IsoCamera::new(),
            clock: Duration::ZERO,
            tick_index: 0,
            experience: Experience::new(),
            modifiers: Modifiers::default(),
        }
    }

    fn clock_seconds(&self) -> f64 {
        self.clock.as_secs_f64()
    }

    fn damage(&mut self, target: EntityId, amount: u32, out_events: &mut Vec<Event>) {
        let allegiance = self.entities.allegiance(target);
        let Some(health) = self.entities.health_mut(target) else {
            return;
        };
        if health.is_depleted() {
            return;
        }

        let removed = health.damage(amount);
        let remaining = health.current();
        out_events.push(Event::ActorDamaged {
            target,
            amount: removed,
            remaining,
        });
        if remaining == 0 {
            out_events.push(Event::ActorDefeated { target, allegiance });
        }
    }

    fn upgrade_player(&mut self, upgrade: Upgrade) {
        let Some(player) = self.entities.player() else {
            return;
        };

        match upgrade {
            Upgrade::MoveSpeed => {
                if let Some(motion) = self.entities.motion_mut(player) {
                    motion.speed += MOVE_SPEED_BONUS;
                }
            }
            Upgrade::ExtraProjectiles => {
                if let Some(armory) = self.entities.armory_mut(player) {
                    for slot in armory.occupied_mut() {
                        slot.shots_per_attack = slot.shots_per_attack.saturating_add(1);
                    }
                }
            }
            Upgrade::Damage => {
                if let Some(armory) = self.entities.armory_mut(player) {
                    for slot in armory.occupied_mut() {
                        slot.damage = slot.damage.saturating_add(DAMAGE_BONUS);
                    }
                }
            }
            Upgrade::Radius => {
                if let Some(armory) = self.entities.armory_mut(player) {
                    for slot in armory.occupied_mut() {
                        slot.radius += RADIUS_BONUS;
                    }
                }
            }
            Upgrade::Cooldown => {
                if let Some(armory) = self.entities.armory_mut(player) {
                    for slot in armory.occupied_mut() {
                        slot.cooldown *= COOLDOWN_FACTOR;
                        slot.shot_interval *= COOLDOWN_FACTOR;
                    }
                }
            }
            Upgrade::MaxHp => {
                if let Some(health) = self.entities.health_mut(player) {
                    health.raise_max(MAX_HEALTH_BONUS);
                }
            }
            Upgrade::Regen => {
                if let Some(regeneration) = self.entities.regeneration_entry(player) {
                    regeneration.per_second += REGENERATION_BONUS;
                }
            }
            Upgrade::XpGain | Upgrade::MobCount => {}
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTileMap { tiles } => {
            let columns = tiles.columns();
            let rows = tiles.rows();
            world.tile_map = tiles;
            out_events.push(Event::TileMapConfigured { columns, rows });
        }
        Command::ConfigureCamera { camera } => {
            world.camera = camera;
        }
        Command::FocusCamera { target } => {
            world.camera.center_on(target);
        }
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnActor { blueprint } => {
            let allegiance = blueprint.allegiance;
            let entity = world.entities.spawn_actor(blueprint);
            log::debug!("spawned {allegiance:?} actor {}", entity.get());
            out_events.push(Event::ActorSpawned { entity, allegiance });
        }
        Command::SpawnProjectile { owner, blueprint } => {
            let shape = blueprint.projectile.shape;
            let entity = world.entities.spawn_projectile(blueprint);
            log::debug!(
                "spawned {shape:?} projectile {} for {}",
                entity.get(),
                owner.get()
            );
            out_events.push(Event::ProjectileSpawned {
                entity,
                owner,
                shape,
            });
        }
        Command::SetVelocity { entity, velocity } => {
            if let Some(motion) = world.entities.motion_mut(entity) {
                motion.velocity = velocity;
            }
        }
        Command::MoveEntity { entity, position } => {
            if let Some(current) = world.entities.position_mut(entity) {
                *current = position;
            }
        }
        Command::DamageActor { target, amount } => {
            world.damage(target, amount, out_events);
        }
        Command::ApplyContactDamage {
            attacker,
            victim,
            amount,
        } => {
            if !world.entities.contains(attacker) {
                return;
            }
            let now = world.clock_seconds();
            let Some(cooldown) = world.entities.cooldown_mut(victim) else {
                return;
            };
            if !cooldown.allows_damage_at(now) {
                return;
            }
            cooldown.last_damage_at = Some(now);
            world.damage(victim, amount, out_events);
        }
        Command::HealActor { target, amount } => {
            if let Some(health) = world.entities.health_mut(target) {
                let added = health.heal(amount);
                if added > 0 {
                    out_events.push(Event::ActorHealed {
                        target,
                        amount: added,
                    });
                }
            }
        }
        Command::UpdateWeapon { owner, slot, state } => {
            if let Some(weapon) = world
                .entities
                .armory_mut(owner)
                .and_then(|armory| armory.slots.get_mut(slot))
                .and_then(Option::as_mut)
            {
                weapon.state = state;
            }
        }
        Command::AgeProjectile {
            projectile,
            lifetime,
        } => {
            if let Some(record) = world.entities.projectile_mut(projectile) {
                record.lifetime = lifetime;
            }
        }
        Command::FadeSprite { entity, alpha } => {
            if let Some(sprite) = world.entities.sprite_mut(entity) {
                sprite.tint = sprite.tint.with_alpha(alpha);
            }
        }
        Command::Despawn { entity } => {
            if world.entities.despawn(entity) {
                log::debug!("despawned entity {}", entity.get());
                out_events.push(Event::EntityDespawned { entity });
            }
        }
        Command::GrantExperience { amount } => {
            let levels = world.experience.gain(amount);
            let reached = world.experience.level;
            out_events.push(Event::ExperienceGained {
                amount,
                level: reached,
            });
            for offset in (0..levels).rev() {
                out_events.push(Event::LevelReached {
                    level: reached - offset,
                });
            }
        }
        Command::ApplyUpgrade { upgrade } => {
            match upgrade {
                Upgrade::XpGain => world.modifiers.experience_gain *= EXPERIENCE_GAIN_FACTOR,
                Upgrade::MobCount => world.modifiers.spawn_count *= SPAWN_COUNT_FACTOR,
                _ => world.upgrade_player(upgrade),
            }
            out_events.push(Event::UpgradeApplied { upgrade });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec2;
    use iso_arena_core::{
        ActorView, EntityId, Experience, IsoCamera, Modifiers, ProjectileView, SpriteView, TileMap,
    };

    use super::World;

    /// Arena floor.
    #[must_use]
    pub fn tile_map(world: &World) -> &TileMap {
        &world.tile_map
    }

    /// Camera used to project between world and screen space.
    #[must_use]
    pub fn camera(world: &World) -> &IsoCamera {
        &world.camera
    }

    /// Total simulated time.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Total simulated time in seconds, the timestamp used by damage cooldowns.
    #[must_use]
    pub fn clock_seconds(world: &World) -> f64 {
        world.clock_seconds()
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Every actor, projectiles excluded.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(world.entities.actor_snapshots())
    }

    /// Every positioned entity, projectiles and effects included.
    #[must_use]
    pub fn entity_view(world: &World) -> ActorView {
        ActorView::from_snapshots(world.entities.entity_snapshots())
    }

    /// Every projectile and effect.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(world.entities.projectile_snapshots())
    }

    /// Every entity that carries a sprite.
    #[must_use]
    pub fn sprite_view(world: &World) -> SpriteView {
        SpriteView::from_snapshots(world.entities.sprite_snapshots())
    }

    /// Position of a single entity.
    #[must_use]
    pub fn position(world: &World, entity: EntityId) -> Option<Vec2> {
        world.entities.position(entity)
    }

    /// Identifier of the player, if one is alive.
    #[must_use]
    pub fn player(world: &World) -> Option<EntityId> {
        world.entities.player()
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(world: &World) -> usize {
        world.entities.len()
    }

    /// Player level and experience.
    #[must_use]
    pub fn experience(world: &World) -> Experience {
        world.experience
    }

    /// Session-wide multipliers.
    #[must_use]
    pub fn modifiers(world: &World) -> Modifiers {
        world.modifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use iso_arena_core::{
        ActorBlueprint, Allegiance, Armory, DamageCooldown, Health, Motion, WeaponKind, WeaponSlot,
        WeaponState,
    };

    fn spawn(world: &mut World, blueprint: ActorBlueprint) -> EntityId {
        let mut events = Vec::new();
        apply(world, Command::SpawnActor { blueprint }, &mut events);
        match events.as_slice() {
            [Event::ActorSpawned { entity, .. }] => *entity,
            other => panic!("expected a single spawn event, got {other:?}"),
        }
    }

    fn tick(world: &mut World, seconds: f32) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::Tick {
                dt: Duration::from_secs_f32(seconds),
            },
            &mut events,
        );
        events
    }

    fn player_blueprint() -> ActorBlueprint {
        ActorBlueprint::new(Vec2::new(5.0, 5.0), Allegiance::Player)
            .with_motion(Motion::at_rest(200.0))
            .with_health(Health::new(100))
            .with_damage_cooldown(DamageCooldown::default())
            .with_armory(Armory::new([
                Some(WeaponSlot::linear(
                    WeaponKind::MagicStick,
                    7.0,
                    2.0,
                    1,
                    0.1,
                    8,
                    400.0,
                )),
                None,
            ]))
    }

    #[test]
    fn tick_advances_clock_and_index() {
        let mut world = World::new();

        let events = tick(&mut world, 0.5);

        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_secs_f32(0.5)
            }]
        );
        assert_eq!(query::tick_index(&world), 1);
        assert!((query::clock_seconds(&world) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn damage_reports_defeat_once() {
        let mut world = World::new();
        let hostile = spawn(
            &mut world,
            ActorBlueprint::new(Vec2::ZERO, Allegiance::Hostile).with_health(Health::new(10)),
        );
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::DamageActor {
                target: hostile,
                amount: 25,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DamageActor {
                target: hostile,
                amount: 5,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::ActorDamaged {
                    target: hostile,
                    amount: 10,
                    remaining: 0,
                },
                Event::ActorDefeated {
                    target: hostile,
                    allegiance: Allegiance::Hostile,
                },
            ]
        );
    }

    #[test]
    fn contact_damage_respects_victim_cooldown() {
        let mut world = World::new();
        let player = spawn(&mut world, player_blueprint());
        let hostile = spawn(
            &mut world,
            ActorBlueprint::new(Vec2::ONE, Allegiance::Hostile).with_contact_damage(10),
        );
        let contact = Command::ApplyContactDamage {
            attacker: hostile,
            victim: player,
            amount: 10,
        };
        let mut events = Vec::new();

        apply(&mut world, contact.clone(), &mut events);
        apply(&mut world, contact.clone(), &mut events);
        let _ = tick(&mut world, 0.25);
        apply(&mut world, contact, &mut events);

        let damaged = events
            .iter()
            .filter(|event| matches!(event, Event::ActorDamaged { .. }))
            .count();
        assert_eq!(damaged, 2, "expected the cooldown to absorb the second hit");
        let health = query::actor_view(&world)
            .get(player)
            .and_then(|snapshot| snapshot.health);
        assert_eq!(health.map(|health| health.current()), Some(80));
    }

    #[test]
    fn despawn_removes_entity_and_reports_once() {
        let mut world = World::new();
        let hostile = spawn(
            &mut world,
            ActorBlueprint::new(Vec2::ZERO, Allegiance::Hostile),
        );
        let mut events = Vec::new();

        apply(&mut world, Command::Despawn { entity: hostile }, &mut events);
        apply(&mut world, Command::Despawn { entity: hostile }, &mut events);

        assert_eq!(events, vec![Event::EntityDespawned { entity: hostile }]);
        assert_eq!(query::entity_count(&world), 0);
        assert!(query::position(&world, hostile).is_none());
    }

    #[test]
    fn commands_for_missing_entities_are_ignored() {
        let mut world = World::new();
        let ghost = EntityId::new(99);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MoveEntity {
                entity: ghost,
                position: Vec2::ONE,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::UpdateWeapon {
                owner: ghost,
                slot: 7,
                state: WeaponState::default(),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::DamageActor {
                target: ghost,
                amount: 3,
            },
            &mut events,
        );

        assert!(events.is_empty());
    }

    #[test]
    fn experience_reports_every_level_reached() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::GrantExperience { amount: 215 },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::ExperienceGained {
                    amount: 215,
                    level: 2,
                },
                Event::LevelReached { level: 1 },
                Event::LevelReached { level: 2 },
            ]
        );
        assert_eq!(query::experience(&world).current, 5);
    }

    #[test]
    fn upgrades_reach_player_and_modifiers() {
        let mut world = World::new();
        let player = spawn(&mut world, player_blueprint());
        let mut events = Vec::new();

        for upgrade in [
            Upgrade::MoveSpeed,
            Upgrade::ExtraProjectiles,
            Upgrade::Cooldown,
            Upgrade::MaxHp,
            Upgrade::Regen,
            Upgrade::XpGain,
        ] {
            apply(&mut world, Command::ApplyUpgrade { upgrade }, &mut events);
        }

        let view = query::actor_view(&world);
        let snapshot = view.get(player).expect("player should exist");
        assert_eq!(snapshot.motion.map(|motion| motion.speed), Some(250.0));
        let slot = snapshot
            .armory
            .and_then(|armory| armory.slots[0])
            .expect("slot 0 should be armed");
        assert_eq!(slot.shots_per_attack, 2);
        assert!((slot.cooldown - 1.8).abs() < 1e-5);
        assert!((slot.shot_interval - 0.09).abs() < 1e-6);
        assert_eq!(snapshot.health, Some(Health::with_current(130, 130)));
        let regen = snapshot.regeneration.map(|regen| regen.per_second);
        assert!(regen.is_some_and(|value| (value - 40.0 / 60.0).abs() < 1e-6));
        assert!((query::modifiers(&world).experience_gain - 1.2).abs() < 1e-6);
        assert_eq!(events.len(), 6);
    }

    #[test]
    fn focus_camera_centers_projection() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::FocusCamera {
                target: Vec2::new(3.0, 1.0),
            },
            &mut events,
        );

        let camera = query::camera(&world);
        assert_eq!(
            camera.position(),
            camera.world_to_screen(Vec2::new(3.0, 1.0))
        );
    }
}
