use std::time::Duration;

use glam::Vec2;
use iso_arena_core::{ActorBlueprint, Allegiance, Command, Event, Health, Upgrade};
use iso_arena_system_progression::Progression;
use iso_arena_world::{self as world, query, World};

fn spawn(world: &mut World, blueprint: ActorBlueprint) {
    let mut events = Vec::new();
    world::apply(world, Command::SpawnActor { blueprint }, &mut events);
}

fn run(world: &mut World, progression: &mut Progression) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(16),
        },
        &mut events,
    );
    let mut commands = Vec::new();
    progression.handle(
        &events,
        &query::actor_view(world),
        &query::modifiers(world),
        &mut commands,
    );
    let mut outcome = Vec::new();
    for command in commands {
        world::apply(world, command, &mut outcome);
    }
    progression.record_level_ups(&outcome);
    outcome
}

#[test]
fn defeated_hostiles_are_removed_and_rewarded() {
    let mut world = World::new();
    spawn(
        &mut world,
        ActorBlueprint::new(Vec2::new(4.0, 4.0), Allegiance::Player).with_health(Health::new(100)),
    );
    for offset in 0..3 {
        spawn(
            &mut world,
            ActorBlueprint::new(Vec2::new(6.0 + offset as f32, 4.0), Allegiance::Hostile)
                .with_health(Health::with_current(0, 20)),
        );
    }
    spawn(
        &mut world,
        ActorBlueprint::new(Vec2::new(9.0, 4.0), Allegiance::Hostile)
            .with_health(Health::new(20)),
    );
    let mut progression = Progression::new(5);

    let outcome = run(&mut world, &mut progression);

    let despawned = outcome
        .iter()
        .filter(|event| matches!(event, Event::EntityDespawned { .. }))
        .count();
    assert_eq!(despawned, 3);
    assert_eq!(query::experience(&world).current, 30);
    assert_eq!(query::actor_view(&world).len(), 2);
    assert!(progression.pending_offer().is_none());
}

#[test]
fn experience_modifier_scales_reward() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ApplyUpgrade {
            upgrade: Upgrade::XpGain,
        },
        &mut events,
    );
    spawn(
        &mut world,
        ActorBlueprint::new(Vec2::new(6.0, 4.0), Allegiance::Hostile)
            .with_health(Health::with_current(0, 20)),
    );
    let mut progression = Progression::new(5);

    let _ = run(&mut world, &mut progression);

    assert_eq!(query::experience(&world).current, 12);
}

#[test]
fn tenth_kill_produces_an_offer() {
    let mut world = World::new();
    for offset in 0..10 {
        spawn(
            &mut world,
            ActorBlueprint::new(Vec2::new(2.0 + offset as f32, 4.0), Allegiance::Hostile)
                .with_health(Health::with_current(0, 20)),
        );
    }
    let mut progression = Progression::new(5);

    let outcome = run(&mut world, &mut progression);

    assert!(outcome.contains(&Event::LevelReached { level: 1 }));
    let offer = progression.pending_offer().expect("expected an offer");
    assert_eq!(offer.level, 1);
    let pick = offer.choices[0];
    assert_eq!(progression.choose(0), Some(pick));
    assert!(progression.pending_offer().is_none());
}

#[test]
fn defeated_player_is_left_for_the_session() {
    let mut world = World::new();
    spawn(
        &mut world,
        ActorBlueprint::new(Vec2::new(4.0, 4.0), Allegiance::Player)
            .with_health(Health::with_current(0, 100)),
    );
    let mut progression = Progression::new(5);

    let outcome = run(&mut world, &mut progression);

    assert!(outcome.is_empty());
    assert!(query::player(&world).is_some());
}
