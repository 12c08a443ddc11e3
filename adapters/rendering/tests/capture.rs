use std::{sync::Arc, thread, time::Duration};

use glam::Vec2;
use iso_arena_core::{
    ActorBlueprint, Allegiance, Command, DamageCooldown, Footprint, Health, SourceRect, Sprite,
};
use iso_arena_rendering::{Frame, FrameExchange};
use iso_arena_world::{self as world, query, World};

fn populated_world() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    let player_at = Vec2::new(8.0, 8.0);
    world::apply(
        &mut world,
        Command::FocusCamera { target: player_at },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnActor {
            blueprint: ActorBlueprint::new(player_at, Allegiance::Player)
                .with_footprint(Footprint::new(56.0, 60.0))
                .with_health(Health::new(100))
                .with_damage_cooldown(DamageCooldown::default())
                .with_sprite(Sprite::new(
                    "main_idle",
                    SourceRect::new(0, 0, 56, 60),
                    Vec2::new(56.0, 60.0),
                )),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnActor {
            blueprint: ActorBlueprint::new(Vec2::new(7.0, 7.5), Allegiance::Neutral).with_sprite(
                Sprite::new("tree1", SourceRect::new(0, 0, 64, 96), Vec2::new(64.0, 96.0)),
            ),
        },
        &mut events,
    );
    world
}

#[test]
fn world_sprites_are_captured_back_to_front() {
    let world = populated_world();
    let mut frame = Frame::new();

    frame.capture(
        query::tick_index(&world),
        &query::sprite_view(&world),
        query::camera(&world),
        query::clock_seconds(&world),
    );

    let textures: Vec<&str> = frame
        .drawables
        .iter()
        .map(|drawable| drawable.texture.as_str())
        .collect();
    assert_eq!(textures, vec!["tree1", "main_idle"]);
}

#[test]
fn presenter_thread_sees_the_latest_published_frame() {
    let world = populated_world();
    let exchange = Arc::new(FrameExchange::new());
    let mut back = Frame::new();
    back.capture(
        42,
        &query::sprite_view(&world),
        query::camera(&world),
        query::clock_seconds(&world),
    );
    exchange.publish(&mut back);

    let reader = Arc::clone(&exchange);
    let seen = thread::spawn(move || {
        let mut front = Frame::new();
        for _ in 0..100 {
            if reader.take_latest(&mut front) {
                return Some((front.tick, front.drawables.len()));
            }
            thread::sleep(Duration::from_millis(1));
        }
        None
    })
    .join()
    .expect("presenter thread should not panic");

    assert_eq!(seen, Some((42, 2)));
}
