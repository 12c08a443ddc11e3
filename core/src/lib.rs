#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the arena simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems read immutable views of the
//! world, respond with [`Command`] batches, and the world applies those
//! commands through its `apply` entry point while reporting what changed as
//! [`Event`] values. Component records, the isometric camera and the tile map
//! live here so every crate speaks the same vocabulary.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod camera;
mod components;
mod geometry;
mod progression;
mod tiles;
mod weapons;

pub use camera::{IsoCamera, CULLING_MARGIN, DEFAULT_TILE_EXTENT, DEFAULT_VIEWPORT, DEFAULT_ZOOM};
pub use components::{
    Allegiance, ContactDamage, DamageCooldown, Footprint, Health, Motion, Regeneration, SourceRect,
    Sprite, Tint, DEFAULT_DAMAGE_COOLDOWN,
};
pub use geometry::ScreenRect;
pub use progression::{
    Experience, Modifiers, Upgrade, EXPERIENCE_PER_KILL, FIRST_LEVEL_THRESHOLD,
    LEVEL_THRESHOLD_GROWTH,
};
pub use tiles::{Tile, TileMap, TileMapError};
pub use weapons::{
    Armory, Projectile, ProjectileShape, WeaponKind, WeaponPhase, WeaponShape, WeaponSlot,
    WeaponState, ARMORY_SLOTS,
};

/// Stable identity of a simulated entity.
///
/// Identifiers are handed out in increasing order, so comparing two
/// identifiers compares their creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the arena floor.
    ConfigureTileMap {
        /// New tile layout.
        tiles: TileMap,
    },
    /// Replaces the camera used for projection.
    ConfigureCamera {
        /// New camera.
        camera: IsoCamera,
    },
    /// Centers the camera on a world-space location.
    FocusCamera {
        /// World-space point the camera should look at.
        target: Vec2,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Creates a new actor from the provided component set.
    SpawnActor {
        /// Components attached to the new actor.
        blueprint: ActorBlueprint,
    },
    /// Creates a projectile or effect on behalf of an armed actor.
    SpawnProjectile {
        /// Actor whose weapon produced the projectile.
        owner: EntityId,
        /// Components attached to the projectile.
        blueprint: ProjectileBlueprint,
    },
    /// Replaces the velocity of a moving entity.
    SetVelocity {
        /// Entity to steer.
        entity: EntityId,
        /// New screen-space velocity.
        velocity: Vec2,
    },
    /// Relocates an entity.
    MoveEntity {
        /// Entity to relocate.
        entity: EntityId,
        /// New world-space position.
        position: Vec2,
    },
    /// Removes hit points from an actor.
    DamageActor {
        /// Actor receiving the damage.
        target: EntityId,
        /// Hit points to remove.
        amount: u32,
    },
    /// Applies damage caused by solid contact and restarts the victim's cooldown.
    ApplyContactDamage {
        /// Actor whose contact damage is applied.
        attacker: EntityId,
        /// Actor receiving the damage.
        victim: EntityId,
        /// Hit points to remove.
        amount: u32,
    },
    /// Restores hit points to an actor.
    HealActor {
        /// Actor receiving the healing.
        target: EntityId,
        /// Hit points to restore.
        amount: u32,
    },
    /// Stores the burst bookkeeping of a weapon slot.
    UpdateWeapon {
        /// Actor owning the weapon.
        owner: EntityId,
        /// Index of the slot within the owner's armory.
        slot: usize,
        /// New runtime state.
        state: WeaponState,
    },
    /// Stores the elapsed lifetime of a projectile.
    AgeProjectile {
        /// Projectile to age.
        projectile: EntityId,
        /// New elapsed lifetime in seconds.
        lifetime: f32,
    },
    /// Replaces the alpha channel of an entity's sprite tint.
    FadeSprite {
        /// Entity whose sprite fades.
        entity: EntityId,
        /// New alpha value.
        alpha: u8,
    },
    /// Removes an entity and all of its components.
    Despawn {
        /// Entity to remove.
        entity: EntityId,
    },
    /// Awards experience to the player.
    GrantExperience {
        /// Experience points to add.
        amount: u32,
    },
    /// Applies a chosen upgrade to the player and the session modifiers.
    ApplyUpgrade {
        /// Upgrade to apply.
        upgrade: Upgrade,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the arena floor was replaced.
    TileMapConfigured {
        /// Number of tile columns.
        columns: u32,
        /// Number of tile rows.
        rows: u32,
    },
    /// Confirms that an actor was created.
    ActorSpawned {
        /// Identifier assigned to the actor.
        entity: EntityId,
        /// Side the actor fights for.
        allegiance: Allegiance,
    },
    /// Confirms that a projectile or effect was created.
    ProjectileSpawned {
        /// Identifier assigned to the projectile.
        entity: EntityId,
        /// Actor whose weapon produced it.
        owner: EntityId,
        /// Behaviour of the projectile.
        shape: ProjectileShape,
    },
    /// Reports hit points removed from an actor.
    ActorDamaged {
        /// Actor that took damage.
        target: EntityId,
        /// Hit points actually removed.
        amount: u32,
        /// Hit points left afterwards.
        remaining: u32,
    },
    /// Reports that an actor's health reached zero.
    ActorDefeated {
        /// Actor that was defeated.
        target: EntityId,
        /// Side the actor fought for.
        allegiance: Allegiance,
    },
    /// Reports hit points restored to an actor.
    ActorHealed {
        /// Actor that was healed.
        target: EntityId,
        /// Hit points actually restored.
        amount: u32,
    },
    /// Confirms that an entity was removed.
    EntityDespawned {
        /// Identifier of the removed entity.
        entity: EntityId,
    },
    /// Reports experience added to the player.
    ExperienceGained {
        /// Experience points added.
        amount: u32,
        /// Player level after the gain.
        level: u32,
    },
    /// Announces that the player reached a new level.
    LevelReached {
        /// Level that was reached.
        level: u32,
    },
    /// Confirms that an upgrade took effect.
    UpgradeApplied {
        /// Upgrade that was applied.
        upgrade: Upgrade,
    },
}

/// Component set used to create an actor.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorBlueprint {
    /// Initial world-space position.
    pub position: Vec2,
    /// Side the actor fights for.
    pub allegiance: Allegiance,
    /// Velocity and speed, if the actor moves.
    pub motion: Option<Motion>,
    /// Render and collision extent.
    pub footprint: Option<Footprint>,
    /// Whether the actor blocks and is blocked by other solid actors.
    pub solid: bool,
    /// Hit points, if the actor can be damaged.
    pub health: Option<Health>,
    /// Contact hit throttling.
    pub damage_cooldown: Option<DamageCooldown>,
    /// Damage dealt on solid contact.
    pub contact_damage: Option<ContactDamage>,
    /// Weapon slots.
    pub armory: Option<Armory>,
    /// Passive healing.
    pub regeneration: Option<Regeneration>,
    /// Render record.
    pub sprite: Option<Sprite>,
    /// Whether pursuit steering chases the player with this actor.
    pub pursues_player: bool,
}

impl ActorBlueprint {
    /// Creates a blueprint with only a position and allegiance.
    #[must_use]
    pub fn new(position: Vec2, allegiance: Allegiance) -> Self {
        Self {
            position,
            allegiance,
            motion: None,
            footprint: None,
            solid: false,
            health: None,
            damage_cooldown: None,
            contact_damage: None,
            armory: None,
            regeneration: None,
            sprite: None,
            pursues_player: false,
        }
    }

    /// Attaches motion.
    #[must_use]
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = Some(motion);
        self
    }

    /// Attaches a footprint.
    #[must_use]
    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = Some(footprint);
        self
    }

    /// Sets the solidity flag.
    #[must_use]
    pub fn with_solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    /// Attaches health.
    #[must_use]
    pub fn with_health(mut self, health: Health) -> Self {
        self.health = Some(health);
        self
    }

    /// Attaches contact hit throttling.
    #[must_use]
    pub fn with_damage_cooldown(mut self, cooldown: DamageCooldown) -> Self {
        self.damage_cooldown = Some(cooldown);
        self
    }

    /// Attaches contact damage.
    #[must_use]
    pub fn with_contact_damage(mut self, amount: u32) -> Self {
        self.contact_damage = Some(ContactDamage { amount });
        self
    }

    /// Attaches weapon slots.
    #[must_use]
    pub fn with_armory(mut self, armory: Armory) -> Self {
        self.armory = Some(armory);
        self
    }

    /// Attaches passive healing.
    #[must_use]
    pub fn with_regeneration(mut self, regeneration: Regeneration) -> Self {
        self.regeneration = Some(regeneration);
        self
    }

    /// Attaches a render record.
    #[must_use]
    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = Some(sprite);
        self
    }

    /// Marks the actor as chasing the player.
    #[must_use]
    pub fn pursuing_player(mut self) -> Self {
        self.pursues_player = true;
        self
    }
}

/// Component set used to create a projectile or effect.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileBlueprint {
    /// Initial world-space position.
    pub position: Vec2,
    /// Screen-space velocity, zero for stationary effects.
    pub velocity: Vec2,
    /// Render record; its size doubles as the footprint.
    pub sprite: Sprite,
    /// Projectile behaviour and timing.
    pub projectile: Projectile,
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// World-space position.
    pub position: Vec2,
    /// Side the entity fights for.
    pub allegiance: Allegiance,
    /// Velocity and speed, if the entity moves.
    pub motion: Option<Motion>,
    /// Render and collision extent.
    pub footprint: Option<Footprint>,
    /// Whether the entity takes part in solid blocking.
    pub solid: bool,
    /// Hit points, if the entity can be damaged.
    pub health: Option<Health>,
    /// Contact hit throttling.
    pub damage_cooldown: Option<DamageCooldown>,
    /// Damage dealt on solid contact.
    pub contact_damage: Option<ContactDamage>,
    /// Weapon slots.
    pub armory: Option<Armory>,
    /// Passive healing.
    pub regeneration: Option<Regeneration>,
    /// Whether the entity chases the player.
    pub pursues_player: bool,
}

impl ActorSnapshot {
    /// Creates a snapshot carrying only identity, position and allegiance.
    #[must_use]
    pub fn bare(id: EntityId, position: Vec2, allegiance: Allegiance) -> Self {
        Self {
            id,
            position,
            allegiance,
            motion: None,
            footprint: None,
            solid: false,
            health: None,
            damage_cooldown: None,
            contact_damage: None,
            armory: None,
            regeneration: None,
            pursues_player: false,
        }
    }

    /// Reports whether weapons may select this entity as a target.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        self.health.is_some() && !self.allegiance.is_player()
    }
}

/// Read-only snapshot describing every positioned entity.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new view from the provided snapshots, sorted by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&ActorSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// First player-aligned entity in creation order.
    #[must_use]
    pub fn player(&self) -> Option<&ActorSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.allegiance.is_player())
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ActorSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile or effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Unique identifier assigned to the projectile.
    pub id: EntityId,
    /// World-space position.
    pub position: Vec2,
    /// Projectile behaviour and timing.
    pub projectile: Projectile,
}

/// Read-only snapshot describing all projectiles and effects.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new view from the provided snapshots, sorted by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
        self.snapshots
    }
}

/// Render-facing snapshot of an entity that carries a sprite.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteSnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// World-space position.
    pub position: Vec2,
    /// Render record.
    pub sprite: Sprite,
    /// Side the entity fights for.
    pub allegiance: Allegiance,
    /// Contact hit throttling, used for damage flashes.
    pub damage_cooldown: Option<DamageCooldown>,
}

/// Read-only snapshot of every drawable entity.
#[derive(Clone, Debug, Default)]
pub struct SpriteView {
    snapshots: Vec<SpriteSnapshot>,
}

impl SpriteView {
    /// Creates a new view from the provided snapshots, sorted by identifier.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SpriteSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &SpriteSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<SpriteSnapshot> {
        self.snapshots
    }
}
