#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Arena configuration and initial population.
//!
//! [`Bootstrap`] turns an [`ArenaConfig`] into the command batch that lays out
//! the floor, positions the camera, scatters decorative props and spawns the
//! player at the arena center.

mod config;

use glam::Vec2;
use iso_arena_core::{
    ActorBlueprint, Allegiance, Armory, Command, DamageCooldown, Footprint, Health, IsoCamera,
    Motion, Regeneration, SourceRect, Sprite, TileMap, WeaponSlot, ARMORY_SLOTS,
};
use rand::Rng;

pub use config::{
    ArenaConfig, ArenaSettings, CameraSettings, ConfigError, HostileSettings, PlayerSettings,
};

/// Texture of the idle player.
pub const PLAYER_TEXTURE: &str = "main_idle";

/// Distance kept between scattered props and the arena edge, in world units.
const PROP_MARGIN: f32 = 1.0;

/// Decorative sprite together with its relative draw weight.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Prefab {
    texture: &'static str,
    width: i32,
    height: i32,
    weight: u32,
}

static PREFABS: [Prefab; 9] = [
    Prefab {
        texture: "bush1",
        width: 32,
        height: 32,
        weight: 20,
    },
    Prefab {
        texture: "bush2",
        width: 32,
        height: 32,
        weight: 20,
    },
    Prefab {
        texture: "tree1",
        width: 64,
        height: 96,
        weight: 10,
    },
    Prefab {
        texture: "tree2",
        width: 64,
        height: 96,
        weight: 10,
    },
    Prefab {
        texture: "tree3",
        width: 96,
        height: 128,
        weight: 2,
    },
    Prefab {
        texture: "tree4",
        width: 96,
        height: 128,
        weight: 2,
    },
    Prefab {
        texture: "broken1",
        width: 48,
        height: 32,
        weight: 1,
    },
    Prefab {
        texture: "broken2",
        width: 48,
        height: 32,
        weight: 1,
    },
    Prefab {
        texture: "broken3",
        width: 48,
        height: 48,
        weight: 2,
    },
];

/// Builds the opening state of an arena session.
#[derive(Clone, Debug)]
pub struct Bootstrap {
    config: ArenaConfig,
}

impl Bootstrap {
    /// Creates a bootstrap system for the provided configuration.
    #[must_use]
    pub fn new(config: ArenaConfig) -> Self {
        Self { config }
    }

    /// Configuration the arena is built from.
    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// World-space center of the arena.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.config.arena.columns as f32 / 2.0,
            self.config.arena.rows as f32 / 2.0,
        )
    }

    /// Floor layout with the configured solid tiles.
    #[must_use]
    pub fn tile_map(&self) -> TileMap {
        let arena = &self.config.arena;
        let mut tiles = TileMap::open(arena.columns, arena.rows);
        for [column, row] in &arena.solid_tiles {
            let _ = tiles.set_solid(*column, *row, true);
        }
        tiles
    }

    /// Camera centered on the arena.
    #[must_use]
    pub fn camera(&self) -> IsoCamera {
        let settings = self.config.camera;
        let mut camera = IsoCamera::new()
            .with_viewport(Vec2::from(settings.viewport))
            .with_zoom(settings.zoom);
        camera.set_tile_size(settings.tile_width, settings.tile_height);
        camera.center_on(self.center());
        camera
    }

    /// Blueprint of the player, standing at the arena center.
    #[must_use]
    pub fn player(&self) -> ActorBlueprint {
        let player = &self.config.player;
        let [width, height] = player.footprint;
        let mut slots: [Option<WeaponSlot>; ARMORY_SLOTS] = [None; ARMORY_SLOTS];
        for (slot, weapon) in slots.iter_mut().zip(&player.weapons) {
            *slot = Some(*weapon);
        }

        ActorBlueprint::new(self.center(), Allegiance::Player)
            .with_motion(Motion::at_rest(player.speed))
            .with_footprint(Footprint::new(width, height))
            .with_solid(true)
            .with_health(Health::new(player.health))
            .with_damage_cooldown(DamageCooldown::new(player.damage_cooldown))
            .with_armory(Armory::new(slots))
            .with_regeneration(Regeneration::default())
            .with_sprite(Sprite::new(
                PLAYER_TEXTURE,
                SourceRect::new(0, 0, width as i32, height as i32),
                Vec2::new(width, height),
            ))
    }

    /// Blueprints of the decorative props, drawn with weighted prefab odds.
    pub fn props<R: Rng>(&self, rng: &mut R) -> Vec<ActorBlueprint> {
        let arena = &self.config.arena;
        let extent = Vec2::new(arena.columns as f32, arena.rows as f32);
        let total_weight: u32 = PREFABS.iter().map(|prefab| prefab.weight).sum();

        (0..arena.props)
            .filter_map(|_| {
                let position = random_point(rng, extent, PROP_MARGIN);
                let prefab = pick_prefab(rng.gen_range(0..total_weight))?;
                let size = Vec2::new(prefab.width as f32, prefab.height as f32);
                Some(
                    ActorBlueprint::new(position, Allegiance::Neutral)
                        .with_footprint(Footprint::new(size.x, size.y))
                        .with_sprite(Sprite::new(
                            prefab.texture,
                            SourceRect::new(0, 0, prefab.width, prefab.height),
                            size,
                        )),
                )
            })
            .collect()
    }

    /// Emits the commands that populate an empty world: floor, camera, props
    /// and finally the player.
    pub fn populate<R: Rng>(&self, rng: &mut R, out: &mut Vec<Command>) {
        out.push(Command::ConfigureTileMap {
            tiles: self.tile_map(),
        });
        out.push(Command::ConfigureCamera {
            camera: self.camera(),
        });
        out.extend(
            self.props(rng)
                .into_iter()
                .map(|blueprint| Command::SpawnActor { blueprint }),
        );
        out.push(Command::SpawnActor {
            blueprint: self.player(),
        });
    }
}

/// Uniform point inside `extent`, keeping `margin` away from every edge.
///
/// Arenas narrower than twice the margin collapse onto their center line.
fn random_point<R: Rng>(rng: &mut R, extent: Vec2, margin: f32) -> Vec2 {
    let axis = |rng: &mut R, length: f32| {
        let low = margin.min(length / 2.0);
        let high = (length - margin).max(low);
        if high > low {
            rng.gen_range(low..high)
        } else {
            low
        }
    };
    let x = axis(rng, extent.x);
    let y = axis(rng, extent.y);
    Vec2::new(x, y)
}

fn pick_prefab(mut roll: u32) -> Option<&'static Prefab> {
    for prefab in &PREFABS {
        if roll < prefab.weight {
            return Some(prefab);
        }
        roll -= prefab.weight;
    }
    None
}
