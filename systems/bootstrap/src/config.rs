//! Arena configuration loaded from TOML.

use std::{fs, path::Path, path::PathBuf};

use iso_arena_core::{WeaponKind, WeaponSlot, ARMORY_SLOTS, DEFAULT_DAMAGE_COOLDOWN};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating an [`ArenaConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read arena config at {}", path.display())]
    Read {
        /// Location that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid TOML or has unexpected fields.
    #[error("failed to parse arena config")]
    Parse(#[from] toml::de::Error),
    /// The arena has no tiles.
    #[error("arena must be at least 1x1, got {columns}x{rows}")]
    EmptyArena {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// A solid tile lies outside the arena.
    #[error("solid tile ({column}, {row}) lies outside the {columns}x{rows} arena")]
    TileOutOfBounds {
        /// Tile column.
        column: u32,
        /// Tile row.
        row: u32,
        /// Arena column count.
        columns: u32,
        /// Arena row count.
        rows: u32,
    },
    /// The camera cannot project with a non-positive zoom.
    #[error("camera zoom must be positive, got {zoom}")]
    InvalidZoom {
        /// Configured zoom.
        zoom: f32,
    },
    /// The player lists more weapons than the armory holds.
    #[error("player carries {count} weapons but the armory holds {capacity}")]
    TooManyWeapons {
        /// Configured weapon count.
        count: usize,
        /// Available slots.
        capacity: usize,
    },
    /// Hostiles cannot be placed in the configured ring.
    #[error("hostile spawn ring [{inner}, {outer}] is empty")]
    InvalidSpawnRing {
        /// Inner ring radius.
        inner: f32,
        /// Outer ring radius.
        outer: f32,
    },
    /// The spawn timer would never drain a whole second per release.
    #[error("hostile spawn delay must be at least one second, got {delay}")]
    InvalidSpawnDelay {
        /// Configured delay in seconds.
        delay: f64,
    },
    /// Waves cannot advance without a positive duration.
    #[error("wave duration must be positive, got {duration}")]
    InvalidWaveDuration {
        /// Configured duration in seconds.
        duration: f64,
    },
    /// Hostile counts are undefined for a non-positive divisor.
    #[error("wave divisor must be positive, got {divisor}")]
    InvalidWaveDivisor {
        /// Configured divisor.
        divisor: f64,
    },
}

/// Complete description of an arena session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Seed for every random choice made during the session.
    pub seed: u64,
    /// Floor layout and decoration.
    pub arena: ArenaSettings,
    /// Projection parameters.
    pub camera: CameraSettings,
    /// Player stats and loadout.
    pub player: PlayerSettings,
    /// Hostile stats and wave tuning.
    pub hostiles: HostileSettings,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_a7e4_a000_0001,
            arena: ArenaSettings::default(),
            camera: CameraSettings::default(),
            player: PlayerSettings::default(),
            hostiles: HostileSettings::default(),
        }
    }
}

impl ArenaConfig {
    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ArenaSettings { columns, rows, .. } = self.arena;
        if columns == 0 || rows == 0 {
            return Err(ConfigError::EmptyArena { columns, rows });
        }
        if let Some([column, row]) = self
            .arena
            .solid_tiles
            .iter()
            .copied()
            .find(|[column, row]| *column >= columns || *row >= rows)
        {
            return Err(ConfigError::TileOutOfBounds {
                column,
                row,
                columns,
                rows,
            });
        }
        if !(self.camera.zoom > 0.0) {
            return Err(ConfigError::InvalidZoom {
                zoom: self.camera.zoom,
            });
        }
        if self.player.weapons.len() > ARMORY_SLOTS {
            return Err(ConfigError::TooManyWeapons {
                count: self.player.weapons.len(),
                capacity: ARMORY_SLOTS,
            });
        }
        let HostileSettings {
            inner_radius,
            outer_radius,
            spawn_delay,
            wave_duration,
            wave_divisor,
            ..
        } = self.hostiles;
        if !(inner_radius >= 0.0 && outer_radius >= inner_radius) {
            return Err(ConfigError::InvalidSpawnRing {
                inner: inner_radius,
                outer: outer_radius,
            });
        }
        if !(spawn_delay >= 1.0) {
            return Err(ConfigError::InvalidSpawnDelay { delay: spawn_delay });
        }
        if !(wave_duration > 0.0) {
            return Err(ConfigError::InvalidWaveDuration {
                duration: wave_duration,
            });
        }
        if !(wave_divisor > 0.0) {
            return Err(ConfigError::InvalidWaveDivisor {
                divisor: wave_divisor,
            });
        }
        Ok(())
    }
}

/// Floor layout and decoration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaSettings {
    /// Tile columns.
    pub columns: u32,
    /// Tile rows.
    pub rows: u32,
    /// Decorative props scattered at startup.
    pub props: u32,
    /// `[column, row]` pairs of impassable tiles.
    pub solid_tiles: Vec<[u32; 2]>,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            columns: 48,
            rows: 48,
            props: 200,
            solid_tiles: Vec::new(),
        }
    }
}

/// Projection parameters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSettings {
    /// Viewport extent in screen pixels.
    pub viewport: [f32; 2],
    /// Screen pixels per unzoomed pixel.
    pub zoom: f32,
    /// Tile art width in pixels.
    pub tile_width: f32,
    /// Tile art height in pixels, before halving.
    pub tile_height: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            viewport: [1000.0, 600.0],
            zoom: 2.0,
            tile_width: 64.0,
            tile_height: 32.0,
        }
    }
}

/// Player stats and loadout.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerSettings {
    /// Movement speed in screen pixels per second.
    pub speed: f32,
    /// Starting and maximum hit points.
    pub health: u32,
    /// Render and collision extent.
    pub footprint: [f32; 2],
    /// Seconds between two contact hits.
    pub damage_cooldown: f64,
    /// Weapons placed into the armory in slot order.
    pub weapons: Vec<WeaponSlot>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            speed: 200.0,
            health: 100,
            footprint: [56.0, 60.0],
            damage_cooldown: DEFAULT_DAMAGE_COOLDOWN,
            weapons: vec![
                WeaponSlot::linear(WeaponKind::MagicStick, 7.0, 2.0, 1, 0.1, 8, 400.0),
                WeaponSlot::radial(WeaponKind::Sword, 3.0, 1.5, 1, 0.1, 5),
            ],
        }
    }
}

/// Hostile stats and wave tuning.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostileSettings {
    /// Movement speed in screen pixels per second.
    pub speed: f32,
    /// Render and collision extent.
    pub footprint: [f32; 2],
    /// Hit points before wave scaling.
    pub base_health: u32,
    /// Extra hit points per wave multiplier step.
    pub health_per_wave: u32,
    /// Contact damage before wave scaling.
    pub base_contact_damage: u32,
    /// Extra contact damage per wave multiplier step.
    pub contact_damage_per_wave: u32,
    /// Seconds the spawn timer must reach before a wave is released.
    pub spawn_delay: f64,
    /// Seconds of play per wave multiplier step.
    pub wave_duration: f64,
    /// Divisor turning the wave multiplier into a base hostile count.
    pub wave_divisor: f64,
    /// Closest spawn distance from the player in world units.
    pub inner_radius: f32,
    /// Farthest spawn distance from the player in world units.
    pub outer_radius: f32,
}

impl Default for HostileSettings {
    fn default() -> Self {
        Self {
            speed: 80.0,
            footprint: [64.0, 64.0],
            base_health: 20,
            health_per_wave: 2,
            base_contact_damage: 10,
            contact_damage_per_wave: 2,
            spawn_delay: 2.0,
            wave_duration: 20.0,
            wave_divisor: 1.5,
            inner_radius: 4.0,
            outer_radius: 12.0,
        }
    }
}
