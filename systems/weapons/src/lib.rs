#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weapon and targeting engine.
//!
//! Every occupied weapon slot runs a small state machine once per tick:
//! idle slots search for the nearest target in range, bursting slots fire the
//! remaining shots of their burst one interval apart, and recovering slots
//! count down their cooldown. Linear slots launch a travelling projectile at
//! the locked target; radial slots damage everything in reach immediately and
//! leave a fading ring behind.

use glam::Vec2;
use iso_arena_core::{
    ActorSnapshot, ActorView, Command, EntityId, Event, IsoCamera, Projectile,
    ProjectileBlueprint, ProjectileShape, SourceRect, Sprite, Tint, WeaponPhase, WeaponShape,
    WeaponSlot, WeaponState,
};

/// Texture drawn for linear projectiles.
pub const MAGIC_BALL_TEXTURE: &str = "magic_ball";
/// Texture drawn for radial effects.
pub const SWORD_RING_TEXTURE: &str = "sword_ring";

const MAGIC_BALL_SOURCE_EXTENT: i32 = 32;
const MAGIC_BALL_SIZE: f32 = 18.0;
const MAGIC_BALL_HIT_RADIUS: f32 = 0.4;
const MAGIC_BALL_LIFETIME: f32 = 2.0;
/// Screen distance between the shooter and a freshly launched projectile.
const LAUNCH_OFFSET: f32 = 20.0;
const MIN_AIM_LENGTH_SQ: f32 = 1e-4;

const RING_TEXTURE_EXTENT: f32 = 64.0;
/// World radius drawn at the ring texture's native size.
const RING_VISUAL_RADIUS: f32 = 1.5;
const RING_MIN_SCALE: f32 = 0.5;
const RING_ALPHA: u8 = 230;
const RING_LIFETIME: f32 = 0.35;
/// Multiplier applied to a radial slot's radius when dealing damage.
pub const RADIAL_REACH_FACTOR: f32 = 1.0;

/// Weapon system that advances every armed actor's slots.
#[derive(Debug, Default)]
pub struct Weapons {
    owners: Vec<ActorSnapshot>,
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    target: EntityId,
    distance_sq: f32,
}

impl Candidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }
        self.target < other.target
    }
}

impl Weapons {
    /// Creates a new weapon system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every weapon slot by the elapsed time and emits firing commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        actors: &ActorView,
        camera: &IsoCamera,
        out: &mut Vec<Command>,
    ) {
        let dt: f32 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(dt.as_secs_f32()),
                _ => None,
            })
            .sum();
        if dt <= 0.0 {
            return;
        }

        self.owners.clear();
        self.owners.extend(
            actors
                .iter()
                .filter(|snapshot| snapshot.armory.is_some())
                .cloned(),
        );

        for owner in &self.owners {
            let Some(armory) = owner.armory else {
                continue;
            };
            for (index, slot) in armory.occupied() {
                let state = advance_slot(owner, slot, dt, actors, camera, out);
                if state != slot.state {
                    out.push(Command::UpdateWeapon {
                        owner: owner.id,
                        slot: index,
                        state,
                    });
                }
            }
        }
    }
}

fn advance_slot(
    owner: &ActorSnapshot,
    slot: &WeaponSlot,
    dt: f32,
    actors: &ActorView,
    camera: &IsoCamera,
    out: &mut Vec<Command>,
) -> WeaponState {
    let mut state = slot.state;
    if slot.shots_per_attack == 0 {
        return state;
    }

    match state.phase() {
        WeaponPhase::Bursting => {
            state.shot_timer -= dt;
            if state.shot_timer <= 0.0 {
                fire_burst(owner, slot, &mut state, actors, camera, out);
            }
            return state;
        }
        WeaponPhase::Recovering => {
            state.cooldown_remaining -= dt;
            if state.cooldown_remaining > 0.0 {
                return state;
            }
            // Recovered slots search again this tick.
            state.cooldown_remaining = 0.0;
        }
        WeaponPhase::Idle => {}
    }

    let Some(target) = nearest_target(owner, slot.radius, actors) else {
        return state;
    };
    state.shots_pending = slot.shots_per_attack;
    state.target = Some(target);
    fire_burst(owner, slot, &mut state, actors, camera, out);
    state
}

/// Fires shots until the burst completes or the next shot is still scheduled.
fn fire_burst(
    owner: &ActorSnapshot,
    slot: &WeaponSlot,
    state: &mut WeaponState,
    actors: &ActorView,
    camera: &IsoCamera,
    out: &mut Vec<Command>,
) {
    while state.shots_pending > 0 {
        fire_shot(owner, slot, state.target, actors, camera, out);
        state.shots_pending -= 1;

        if state.shots_pending == 0 {
            state.shot_timer = 0.0;
            state.cooldown_remaining = slot.cooldown;
            state.target = None;
            return;
        }

        state.shot_timer = slot.shot_interval;
        if state.shot_timer > 0.0 {
            return;
        }
    }
}

fn fire_shot(
    owner: &ActorSnapshot,
    slot: &WeaponSlot,
    target: Option<EntityId>,
    actors: &ActorView,
    camera: &IsoCamera,
    out: &mut Vec<Command>,
) {
    match slot.shape {
        WeaponShape::Linear { projectile_speed } => {
            // A despawned target still consumes the shot.
            let Some(target) = target.and_then(|id| actors.get(id)) else {
                return;
            };
            if let Some(blueprint) = linear_projectile(
                owner.position,
                target.position,
                projectile_speed,
                slot.damage,
                camera,
            ) {
                out.push(Command::SpawnProjectile {
                    owner: owner.id,
                    blueprint,
                });
            }
        }
        WeaponShape::Radial => {
            let reach = slot.radius * RADIAL_REACH_FACTOR;
            let reach_sq = reach * reach;
            for victim in actors.iter() {
                if victim.id == owner.id || !victim.is_targetable() {
                    continue;
                }
                if victim.position.distance_squared(owner.position) <= reach_sq {
                    out.push(Command::DamageActor {
                        target: victim.id,
                        amount: slot.damage,
                    });
                }
            }
            out.push(Command::SpawnProjectile {
                owner: owner.id,
                blueprint: radial_effect(owner.position, reach, camera),
            });
        }
    }
}

/// Finds the closest targetable actor within `radius` world units of the owner.
///
/// Equal distances resolve to the lowest identifier.
#[must_use]
pub fn nearest_target(
    owner: &ActorSnapshot,
    radius: f32,
    actors: &ActorView,
) -> Option<EntityId> {
    let radius_sq = radius * radius;
    let mut best: Option<Candidate> = None;
    for actor in actors.iter() {
        if actor.id == owner.id || !actor.is_targetable() {
            continue;
        }
        let distance_sq = actor.position.distance_squared(owner.position);
        if distance_sq > radius_sq {
            continue;
        }
        let candidate = Candidate {
            target: actor.id,
            distance_sq,
        };
        if best.map_or(true, |current| candidate.precedes(&current)) {
            best = Some(candidate);
        }
    }
    best.map(|candidate| candidate.target)
}

/// Builds a projectile flying from `origin` toward the current position of `target`.
///
/// Returns `None` when both points project onto the same screen location.
#[must_use]
pub fn linear_projectile(
    origin: Vec2,
    target: Vec2,
    speed: f32,
    damage: u32,
    camera: &IsoCamera,
) -> Option<ProjectileBlueprint> {
    let aim = camera.world_to_screen(target) - camera.world_to_screen(origin);
    if aim.length_squared() <= MIN_AIM_LENGTH_SQ {
        return None;
    }
    let direction = aim.normalize();
    let position = origin + camera.screen_to_world(direction * LAUNCH_OFFSET);

    Some(ProjectileBlueprint {
        position,
        velocity: direction * speed,
        sprite: Sprite::new(
            MAGIC_BALL_TEXTURE,
            SourceRect::square(MAGIC_BALL_SOURCE_EXTENT),
            Vec2::splat(MAGIC_BALL_SIZE),
        )
        .with_rotation(direction.y.atan2(direction.x).to_degrees()),
        projectile: Projectile {
            shape: ProjectileShape::Linear,
            radius: MAGIC_BALL_HIT_RADIUS,
            damage,
            lifetime: 0.0,
            max_lifetime: MAGIC_BALL_LIFETIME,
        },
    })
}

/// Builds the cosmetic ring left behind by a radial strike of the given reach.
#[must_use]
pub fn radial_effect(origin: Vec2, reach: f32, camera: &IsoCamera) -> ProjectileBlueprint {
    let scale = (reach / RING_VISUAL_RADIUS).max(RING_MIN_SCALE);
    let extent = RING_TEXTURE_EXTENT * scale;
    let anchor = camera.world_to_screen(origin) + Vec2::new(0.0, extent * 0.5);

    ProjectileBlueprint {
        position: camera.screen_to_world(anchor),
        velocity: Vec2::ZERO,
        sprite: Sprite::new(
            SWORD_RING_TEXTURE,
            SourceRect::square(RING_TEXTURE_EXTENT as i32),
            Vec2::splat(extent),
        )
        .with_tint(Tint::WHITE.with_alpha(RING_ALPHA)),
        projectile: Projectile {
            shape: ProjectileShape::Radial,
            radius: reach,
            damage: 0,
            lifetime: 0.0,
            max_lifetime: RING_LIFETIME,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iso_arena_core::{Allegiance, Armory, Health, WeaponKind};
    use std::time::Duration;

    fn hostile(id: u32, position: Vec2) -> ActorSnapshot {
        let mut snapshot = ActorSnapshot::bare(EntityId::new(id), position, Allegiance::Hostile);
        snapshot.health = Some(Health::new(20));
        snapshot
    }

    fn shooter(slot: WeaponSlot) -> ActorSnapshot {
        let mut snapshot = ActorSnapshot::bare(EntityId::new(0), Vec2::ZERO, Allegiance::Player);
        snapshot.health = Some(Health::new(100));
        snapshot.armory = Some(Armory::new([Some(slot), None]));
        snapshot
    }

    fn tick(seconds: f32) -> Vec<Event> {
        vec![Event::TimeAdvanced {
            dt: Duration::from_secs_f32(seconds),
        }]
    }

    #[test]
    fn nearest_prefers_closer_then_lower_id() {
        let owner = shooter(WeaponSlot::radial(WeaponKind::Sword, 3.0, 1.0, 1, 0.1, 5));
        let actors = ActorView::from_snapshots(vec![
            owner.clone(),
            hostile(4, Vec2::new(2.0, 0.0)),
            hostile(2, Vec2::new(0.0, 2.0)),
            hostile(3, Vec2::new(2.5, 0.0)),
        ]);

        assert_eq!(
            nearest_target(&owner, 3.0, &actors),
            Some(EntityId::new(2))
        );
        assert_eq!(nearest_target(&owner, 1.0, &actors), None);
    }

    #[test]
    fn players_and_health_less_actors_are_never_targets() {
        let owner = shooter(WeaponSlot::radial(WeaponKind::Sword, 3.0, 1.0, 1, 0.1, 5));
        let ally = {
            let mut snapshot =
                ActorSnapshot::bare(EntityId::new(1), Vec2::ONE, Allegiance::Player);
            snapshot.health = Some(Health::new(10));
            snapshot
        };
        let prop = ActorSnapshot::bare(EntityId::new(2), Vec2::ONE, Allegiance::Neutral);
        let actors = ActorView::from_snapshots(vec![owner.clone(), ally, prop]);

        assert_eq!(nearest_target(&owner, 5.0, &actors), None);
    }

    #[test]
    fn radial_strike_hits_everything_in_reach_once() {
        let camera = IsoCamera::new();
        let owner = shooter(WeaponSlot::radial(WeaponKind::Sword, 3.0, 1.5, 1, 0.1, 5));
        let actors = ActorView::from_snapshots(vec![
            owner.clone(),
            hostile(1, Vec2::new(3.0, 0.0)),
            hostile(2, Vec2::new(1.0, 1.0)),
            hostile(3, Vec2::new(3.0, 0.1)),
        ]);
        let mut weapons = Weapons::new();
        let mut out = Vec::new();

        weapons.handle(&tick(0.1), &actors, &camera, &mut out);

        let damaged: Vec<EntityId> = out
            .iter()
            .filter_map(|command| match command {
                Command::DamageActor { target, amount: 5 } => Some(*target),
                _ => None,
            })
            .collect();
        assert_eq!(damaged, vec![EntityId::new(1), EntityId::new(2)]);
        let ring = out.iter().find_map(|command| match command {
            Command::SpawnProjectile { blueprint, .. } => Some(blueprint.clone()),
            _ => None,
        });
        let ring = ring.expect("expected a ring effect");
        assert_eq!(ring.projectile.shape, ProjectileShape::Radial);
        assert_eq!(ring.projectile.damage, 0);
        assert_eq!(ring.sprite.size, Vec2::splat(128.0));
        assert_eq!(ring.sprite.tint.alpha, 230);
        assert!(out.iter().any(|command| matches!(
            command,
            Command::UpdateWeapon { state, .. } if state.cooldown_remaining == 1.5
        )));
    }

    #[test]
    fn ring_never_shrinks_below_half_size() {
        let camera = IsoCamera::new();

        let ring = radial_effect(Vec2::ZERO, 0.1, &camera);

        assert_eq!(ring.sprite.size, Vec2::splat(32.0));
        let anchor = camera.world_to_screen(ring.position);
        assert!((anchor - Vec2::new(0.0, 16.0)).length() < 1e-4);
    }

    #[test]
    fn linear_projectile_starts_ahead_of_shooter() {
        let camera = IsoCamera::new();

        let projectile = linear_projectile(Vec2::ZERO, Vec2::new(3.0, 3.0), 400.0, 8, &camera)
            .expect("expected a projectile");

        let screen = camera.world_to_screen(projectile.position);
        assert!((screen - Vec2::new(0.0, 20.0)).length() < 1e-3);
        assert!((projectile.velocity - Vec2::new(0.0, 400.0)).length() < 1e-3);
        assert_eq!(projectile.projectile.damage, 8);
        assert_eq!(projectile.sprite.texture, MAGIC_BALL_TEXTURE);
    }

    #[test]
    fn coincident_target_is_not_fired_at() {
        let camera = IsoCamera::new();

        assert!(linear_projectile(Vec2::ONE, Vec2::ONE, 400.0, 8, &camera).is_none());
    }

    #[test]
    fn idle_slot_without_target_stays_idle() {
        let camera = IsoCamera::new();
        let owner = shooter(WeaponSlot::linear(
            WeaponKind::MagicStick,
            7.0,
            2.0,
            1,
            0.1,
            8,
            400.0,
        ));
        let actors =
            ActorView::from_snapshots(vec![owner, hostile(1, Vec2::new(20.0, 0.0))]);
        let mut weapons = Weapons::new();
        let mut out = Vec::new();

        weapons.handle(&tick(0.1), &actors, &camera, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn disabled_slot_never_fires() {
        let camera = IsoCamera::new();
        let owner = shooter(WeaponSlot::linear(
            WeaponKind::MagicStick,
            7.0,
            2.0,
            0,
            0.1,
            8,
            400.0,
        ));
        let actors = ActorView::from_snapshots(vec![owner, hostile(1, Vec2::new(2.0, 0.0))]);
        let mut weapons = Weapons::new();
        let mut out = Vec::new();

        weapons.handle(&tick(0.1), &actors, &camera, &mut out);

        assert!(out.is_empty());
    }

    #[test]
    fn zero_interval_fires_whole_burst_at_once() {
        let camera = IsoCamera::new();
        let owner = shooter(WeaponSlot::linear(
            WeaponKind::MagicStick,
            7.0,
            2.0,
            3,
            0.0,
            8,
            400.0,
        ));
        let actors = ActorView::from_snapshots(vec![owner, hostile(1, Vec2::new(2.0, 0.0))]);
        let mut weapons = Weapons::new();
        let mut out = Vec::new();

        weapons.handle(&tick(0.1), &actors, &camera, &mut out);

        let spawned = out
            .iter()
            .filter(|command| matches!(command, Command::SpawnProjectile { .. }))
            .count();
        assert_eq!(spawned, 3);
    }
}
