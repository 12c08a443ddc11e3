use std::time::Duration;

use glam::Vec2;
use iso_arena_core::{ActorBlueprint, Allegiance, Command, Footprint, Health, Motion};
use iso_arena_system_movement::Movement;
use iso_arena_system_pursuit::Pursuit;
use iso_arena_world::{self as world, query, World};

#[test]
fn pursuer_closes_the_gap_over_time() {
    let mut world = World::new();
    let mut events = Vec::new();
    let player_at = Vec2::new(16.0, 16.0);
    world::apply(
        &mut world,
        Command::SpawnActor {
            blueprint: ActorBlueprint::new(player_at, Allegiance::Player)
                .with_health(Health::new(100)),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnActor {
            blueprint: ActorBlueprint::new(Vec2::new(8.0, 16.0), Allegiance::Hostile)
                .with_motion(Motion::at_rest(80.0))
                .with_footprint(Footprint::new(64.0, 64.0))
                .pursuing_player(),
        },
        &mut events,
    );
    let hostile = query::actor_view(&world)
        .iter()
        .find(|actor| actor.allegiance == Allegiance::Hostile)
        .map(|actor| actor.id)
        .expect("expected hostile");
    let start = query::position(&world, hostile).expect("expected position");

    let mut pursuit = Pursuit::new();
    let mut movement = Movement::new();
    for _ in 0..10 {
        let mut tick_events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut tick_events,
        );

        let camera = *query::camera(&world);
        let mut commands = Vec::new();
        pursuit.handle(&query::actor_view(&world), &camera, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }

        let tiles = query::tile_map(&world).clone();
        movement.handle(
            &tick_events,
            &query::entity_view(&world),
            &tiles,
            &camera,
            query::clock_seconds(&world),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
    }

    let end = query::position(&world, hostile).expect("expected position");
    assert!(
        end.distance(player_at) < start.distance(player_at),
        "expected {end:?} to be closer to {player_at:?} than {start:?}"
    );
}
