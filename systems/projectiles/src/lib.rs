#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile and damage resolver.
//!
//! Ages every projectile and effect, resolves linear hits against actor torso
//! boxes and fades radial rings. Expired and spent projectiles are despawned
//! in one batch once every projectile has been examined.

use std::collections::BTreeSet;

use iso_arena_core::{
    ActorView, Command, EntityId, Event, IsoCamera, ProjectileShape, ProjectileView, ScreenRect,
};

/// Alpha of a radial ring at the moment it is spawned.
const RING_START_ALPHA: f32 = 230.0;

/// Pure system that resolves projectile hits and lifetimes.
#[derive(Debug, Default)]
pub struct Projectiles {
    spent: BTreeSet<EntityId>,
}

impl Projectiles {
    /// Creates a new projectile resolver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits aging, damage, fading and despawn commands for the current tick.
    pub fn handle(
        &mut self,
        events: &[Event],
        projectiles: &ProjectileView,
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

        self.spent.clear();

        for snapshot in projectiles.iter() {
            let mut projectile = snapshot.projectile;
            projectile.lifetime += dt;
            if projectile.is_expired() {
                let _ = self.spent.insert(snapshot.id);
                continue;
            }
            out.push(Command::AgeProjectile {
                projectile: snapshot.id,
                lifetime: projectile.lifetime,
            });

            match projectile.shape {
                ProjectileShape::Linear => {
                    let reach = ScreenRect::around(
                        camera.world_to_screen(snapshot.position),
                        projectile.radius,
                    );
                    if let Some(target) = first_hit(&reach, actors, camera) {
                        out.push(Command::DamageActor {
                            target,
                            amount: projectile.damage,
                        });
                        let _ = self.spent.insert(snapshot.id);
                    }
                }
                ProjectileShape::Radial => {
                    let remaining = 1.0 - projectile.progress();
                    out.push(Command::FadeSprite {
                        entity: snapshot.id,
                        alpha: (RING_START_ALPHA * remaining) as u8,
                    });
                }
            }
        }

        out.extend(
            self.spent
                .iter()
                .map(|entity| Command::Despawn { entity: *entity }),
        );
    }
}

/// First targetable actor, in identifier order, whose torso box overlaps `reach`.
fn first_hit(reach: &ScreenRect, actors: &ActorView, camera: &IsoCamera) -> Option<EntityId> {
    actors
        .iter()
        .filter(|actor| actor.is_targetable())
        .find_map(|actor| {
            let footprint = actor.footprint?;
            let origin = camera.world_to_screen(actor.position);
            ScreenRect::hit_box(origin, footprint.size())
                .intersects(reach)
                .then_some(actor.id)
        })
}
