#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Chase steering for actors that pursue the player.

use glam::Vec2;
use iso_arena_core::{ActorView, Command, IsoCamera};

/// Screen distance, in pixels, under which a pursuer stops.
pub const ARRIVAL_DISTANCE: f32 = 1.0;

/// Pure system steering every pursuer straight at the player on screen.
#[derive(Debug, Default)]
pub struct Pursuit;

impl Pursuit {
    /// Creates the pursuit system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits velocity changes for pursuers whose heading changed.
    pub fn handle(&mut self, actors: &ActorView, camera: &IsoCamera, out: &mut Vec<Command>) {
        let Some(player) = actors.player() else {
            return;
        };
        let goal = camera.world_to_screen(player.position);

        for pursuer in actors.iter().filter(|actor| actor.pursues_player) {
            let Some(motion) = pursuer.motion else {
                continue;
            };
            let offset = goal - camera.world_to_screen(pursuer.position);
            let velocity = if offset.length() > ARRIVAL_DISTANCE {
                motion.steer(offset)
            } else {
                Vec2::ZERO
            };
            if velocity != motion.velocity {
                out.push(Command::SetVelocity {
                    entity: pursuer.id,
                    velocity,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iso_arena_core::{ActorSnapshot, Allegiance, EntityId, Motion};

    fn pursuer(id: u32, position: Vec2) -> ActorSnapshot {
        let mut snapshot = ActorSnapshot::bare(EntityId::new(id), position, Allegiance::Hostile);
        snapshot.motion = Some(Motion::at_rest(80.0));
        snapshot.pursues_player = true;
        snapshot
    }

    fn player(position: Vec2) -> ActorSnapshot {
        ActorSnapshot::bare(EntityId::new(0), position, Allegiance::Player)
    }

    #[test]
    fn heads_toward_player_in_screen_space() {
        let camera = IsoCamera::new();
        let view = ActorView::from_snapshots(vec![
            player(Vec2::new(10.0, 10.0)),
            pursuer(1, Vec2::new(4.0, 10.0)),
        ]);
        let mut out = Vec::new();

        Pursuit::new().handle(&view, &camera, &mut out);

        let expected = (camera.world_to_screen(Vec2::new(10.0, 10.0))
            - camera.world_to_screen(Vec2::new(4.0, 10.0)))
        .normalize()
            * 80.0;
        assert_eq!(
            out,
            vec![Command::SetVelocity {
                entity: EntityId::new(1),
                velocity: expected,
            }]
        );
    }

    #[test]
    fn arrival_stops_the_pursuer() {
        let camera = IsoCamera::new();
        let mut moving = pursuer(1, Vec2::new(10.0, 10.0));
        moving.motion = Some(Motion {
            velocity: Vec2::new(80.0, 0.0),
            speed: 80.0,
        });
        let view = ActorView::from_snapshots(vec![player(Vec2::new(10.0, 10.0)), moving]);
        let mut out = Vec::new();

        Pursuit::new().handle(&view, &camera, &mut out);

        assert_eq!(
            out,
            vec![Command::SetVelocity {
                entity: EntityId::new(1),
                velocity: Vec2::ZERO,
            }]
        );
    }

    #[test]
    fn idle_without_player_or_flag() {
        let camera = IsoCamera::new();
        let mut wanderer = pursuer(2, Vec2::new(4.0, 4.0));
        wanderer.pursues_player = false;
        let mut out = Vec::new();

        Pursuit::new().handle(
            &ActorView::from_snapshots(vec![pursuer(1, Vec2::new(4.0, 4.0))]),
            &camera,
            &mut out,
        );
        Pursuit::new().handle(
            &ActorView::from_snapshots(vec![player(Vec2::new(9.0, 9.0)), wanderer]),
            &camera,
            &mut out,
        );

        assert!(out.is_empty());
    }
}
