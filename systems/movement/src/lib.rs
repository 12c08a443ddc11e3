#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement and collision resolver.
//!
//! Advances every entity that carries motion and a footprint. Velocities are
//! expressed in screen space and converted to world units through the camera.
//! Each axis is resolved independently against the tile map and, for solid
//! movers, against the lower-torso boxes of other solid movers. A blocked
//! contact also attempts contact damage in both directions.

use glam::Vec2;
use iso_arena_core::{
    ActorSnapshot, ActorView, Allegiance, Command, DamageCooldown, EntityId, Event, IsoCamera,
    ScreenRect, TileMap,
};

/// Fraction of the footprint height between the entity origin and its feet on screen.
const ANCHOR_DEPTH: f32 = 0.4;

/// Pure system that resolves positions and emits movement and contact commands.
#[derive(Debug, Default)]
pub struct Movement {
    movers: Vec<Mover>,
}

#[derive(Clone, Copy, Debug)]
struct Mover {
    id: EntityId,
    position: Vec2,
    velocity: Vec2,
    size: Vec2,
    solid: bool,
    allegiance: Allegiance,
    contact_damage: Option<u32>,
    damageable: bool,
    cooldown: Option<DamageCooldown>,
}

impl Mover {
    fn from_snapshot(snapshot: &ActorSnapshot) -> Option<Self> {
        let motion = snapshot.motion?;
        let footprint = snapshot.footprint?;
        Some(Self {
            id: snapshot.id,
            position: snapshot.position,
            velocity: motion.velocity,
            size: footprint.size(),
            solid: snapshot.solid,
            allegiance: snapshot.allegiance,
            contact_damage: snapshot.contact_damage.map(|contact| contact.amount),
            damageable: snapshot.health.is_some(),
            cooldown: snapshot.damage_cooldown,
        })
    }
}

impl Movement {
    /// Creates a movement system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and the entity view to emit movement commands.
    ///
    /// Movers are processed in ascending identifier order and later movers
    /// observe the updated positions of earlier ones. `now` is the simulation
    /// clock used to throttle contact damage.
    pub fn handle(
        &mut self,
        events: &[Event],
        entities: &ActorView,
        tile_map: &TileMap,
        camera: &IsoCamera,
        now: f64,
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

        self.movers.clear();
        self.movers
            .extend(entities.iter().filter_map(Mover::from_snapshot));

        for index in 0..self.movers.len() {
            self.advance(index, dt, tile_map, camera, now, out);
        }
    }

    fn advance(
        &mut self,
        index: usize,
        dt: f32,
        tile_map: &TileMap,
        camera: &IsoCamera,
        now: f64,
        out: &mut Vec<Command>,
    ) {
        let mover = self.movers[index];
        let delta_screen = mover.velocity * dt;
        if delta_screen == Vec2::ZERO {
            return;
        }
        let delta_world = camera.screen_to_world(delta_screen);

        let mut position = mover.position;
        let screen = camera.world_to_screen(position);
        let mut anchor =
            camera.screen_to_world(screen + Vec2::new(0.0, mover.size.y * ANCHOR_DEPTH));

        let across = Vec2::new(delta_screen.x, 0.0);
        if is_walkable(tile_map, anchor + Vec2::new(delta_world.x, 0.0))
            && !self.is_blocked(index, screen, screen + across, camera, now, out)
        {
            position.x += delta_world.x;
            anchor.x += delta_world.x;
            self.movers[index].position = position;
        }

        let screen = camera.world_to_screen(position);
        let down = Vec2::new(0.0, delta_screen.y);
        if is_walkable(tile_map, anchor + Vec2::new(0.0, delta_world.y))
            && !self.is_blocked(index, screen, screen + down, camera, now, out)
        {
            position.y += delta_world.y;
            self.movers[index].position = position;
        }

        if position != mover.position {
            out.push(Command::MoveEntity {
                entity: mover.id,
                position,
            });
        }
    }

    fn is_blocked(
        &mut self,
        index: usize,
        from: Vec2,
        to: Vec2,
        camera: &IsoCamera,
        now: f64,
        out: &mut Vec<Command>,
    ) -> bool {
        let mover = self.movers[index];
        if !mover.solid {
            return false;
        }

        let step = to - from;
        let moved_box = ScreenRect::blocking_box(to, mover.size);
        let collision = self
            .movers
            .iter()
            .enumerate()
            .filter(|(other, candidate)| *other != index && candidate.solid)
            .find_map(|(other, candidate)| {
                let other_screen = camera.world_to_screen(candidate.position);
                if step.dot(other_screen - from) <= 0.0 {
                    return None;
                }
                ScreenRect::blocking_box(other_screen, candidate.size)
                    .intersects(&moved_box)
                    .then_some(other)
            });

        let Some(other) = collision else {
            return false;
        };
        self.strike(index, other, now, out);
        self.strike(other, index, now, out);
        true
    }

    fn strike(&mut self, attacker: usize, victim: usize, now: f64, out: &mut Vec<Command>) {
        let striker = self.movers[attacker];
        let Some(amount) = striker.contact_damage else {
            return;
        };
        let target = &mut self.movers[victim];
        if target.allegiance == striker.allegiance || !target.damageable {
            return;
        }
        let Some(cooldown) = target.cooldown.as_mut() else {
            return;
        };
        if !cooldown.allows_damage_at(now) {
            return;
        }

        cooldown.last_damage_at = Some(now);
        out.push(Command::ApplyContactDamage {
            attacker: striker.id,
            victim: target.id,
            amount,
        });
    }
}

/// Reports whether the tile under a world-space point can be walked on.
///
/// Tile art is drawn one column to the right of its logical cell, so the
/// column lookup is shifted by one. Anything outside the map is solid.
#[must_use]
pub fn is_walkable(tile_map: &TileMap, point: Vec2) -> bool {
    let column = point.x.floor() as i64 - 1;
    let row = point.y.floor() as i64;
    !tile_map.is_solid(column, row)
}
