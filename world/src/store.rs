//! Sparse component tables keyed by entity identity.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use iso_arena_core::{
    ActorBlueprint, ActorSnapshot, Allegiance, Armory, ContactDamage, DamageCooldown, EntityId,
    Footprint, Health, Motion, Projectile, ProjectileBlueprint, ProjectileSnapshot, Regeneration,
    Sprite, SpriteSnapshot,
};

/// Registry that stores every entity's components and allocates identifiers.
///
/// Each component lives in its own ordered table so iteration always follows
/// creation order, independent of insertion history.
#[derive(Debug)]
pub(crate) struct EntityStore {
    next_entity: u32,
    positions: BTreeMap<EntityId, Vec2>,
    allegiances: BTreeMap<EntityId, Allegiance>,
    motions: BTreeMap<EntityId, Motion>,
    footprints: BTreeMap<EntityId, Footprint>,
    solids: BTreeSet<EntityId>,
    healths: BTreeMap<EntityId, Health>,
    cooldowns: BTreeMap<EntityId, DamageCooldown>,
    contact_damage: BTreeMap<EntityId, ContactDamage>,
    armories: BTreeMap<EntityId, Armory>,
    regenerations: BTreeMap<EntityId, Regeneration>,
    sprites: BTreeMap<EntityId, Sprite>,
    pursuers: BTreeSet<EntityId>,
    projectiles: BTreeMap<EntityId, Projectile>,
}

impl EntityStore {
    /// Creates an empty store with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            next_entity: 0,
            positions: BTreeMap::new(),
            allegiances: BTreeMap::new(),
            motions: BTreeMap::new(),
            footprints: BTreeMap::new(),
            solids: BTreeSet::new(),
            healths: BTreeMap::new(),
            cooldowns: BTreeMap::new(),
            contact_damage: BTreeMap::new(),
            armories: BTreeMap::new(),
            regenerations: BTreeMap::new(),
            sprites: BTreeMap::new(),
            pursuers: BTreeSet::new(),
            projectiles: BTreeMap::new(),
        }
    }

    fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(self.next_entity);
        self.next_entity = self.next_entity.wrapping_add(1);
        id
    }

    /// Inserts an actor and returns its identifier.
    pub(crate) fn spawn_actor(&mut self, blueprint: ActorBlueprint) -> EntityId {
        let id = self.allocate();
        let _ = self.positions.insert(id, blueprint.position);
        let _ = self.allegiances.insert(id, blueprint.allegiance);
        if let Some(motion) = blueprint.motion {
            let _ = self.motions.insert(id, motion);
        }
        if let Some(footprint) = blueprint.footprint {
            let _ = self.footprints.insert(id, footprint);
        }
        if blueprint.solid {
            let _ = self.solids.insert(id);
        }
        if let Some(health) = blueprint.health {
            let _ = self.healths.insert(id, health);
        }
        if let Some(cooldown) = blueprint.damage_cooldown {
            let _ = self.cooldowns.insert(id, cooldown);
        }
        if let Some(contact) = blueprint.contact_damage {
            let _ = self.contact_damage.insert(id, contact);
        }
        if let Some(armory) = blueprint.armory {
            let _ = self.armories.insert(id, armory);
        }
        if let Some(regeneration) = blueprint.regeneration {
            let _ = self.regenerations.insert(id, regeneration);
        }
        if let Some(sprite) = blueprint.sprite {
            let _ = self.sprites.insert(id, sprite);
        }
        if blueprint.pursues_player {
            let _ = self.pursuers.insert(id);
        }
        id
    }

    /// Inserts a projectile or effect and returns its identifier.
    pub(crate) fn spawn_projectile(&mut self, blueprint: ProjectileBlueprint) -> EntityId {
        let id = self.allocate();
        let footprint = Footprint::new(blueprint.sprite.size.x, blueprint.sprite.size.y);
        let _ = self.positions.insert(id, blueprint.position);
        let _ = self.allegiances.insert(id, Allegiance::Neutral);
        let _ = self.motions.insert(
            id,
            Motion {
                velocity: blueprint.velocity,
                speed: blueprint.velocity.length(),
            },
        );
        let _ = self.footprints.insert(id, footprint);
        let _ = self.sprites.insert(id, blueprint.sprite);
        let _ = self.projectiles.insert(id, blueprint.projectile);
        id
    }

    /// Removes every component of an entity. Returns `false` if it did not exist.
    pub(crate) fn despawn(&mut self, id: EntityId) -> bool {
        let existed = self.positions.remove(&id).is_some();
        let _ = self.allegiances.remove(&id);
        let _ = self.motions.remove(&id);
        let _ = self.footprints.remove(&id);
        let _ = self.solids.remove(&id);
        let _ = self.healths.remove(&id);
        let _ = self.cooldowns.remove(&id);
        let _ = self.contact_damage.remove(&id);
        let _ = self.armories.remove(&id);
        let _ = self.regenerations.remove(&id);
        let _ = self.sprites.remove(&id);
        let _ = self.pursuers.remove(&id);
        let _ = self.projectiles.remove(&id);
        existed
    }

    pub(crate) fn contains(&self, id: EntityId) -> bool {
        self.positions.contains_key(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }

    pub(crate) fn position(&self, id: EntityId) -> Option<Vec2> {
        self.positions.get(&id).copied()
    }

    pub(crate) fn position_mut(&mut self, id: EntityId) -> Option<&mut Vec2> {
        self.positions.get_mut(&id)
    }

    pub(crate) fn allegiance(&self, id: EntityId) -> Allegiance {
        self.allegiances.get(&id).copied().unwrap_or_default()
    }

    pub(crate) fn motion_mut(&mut self, id: EntityId) -> Option<&mut Motion> {
        self.motions.get_mut(&id)
    }

    pub(crate) fn health_mut(&mut self, id: EntityId) -> Option<&mut Health> {
        self.healths.get_mut(&id)
    }

    pub(crate) fn cooldown_mut(&mut self, id: EntityId) -> Option<&mut DamageCooldown> {
        self.cooldowns.get_mut(&id)
    }

    pub(crate) fn armory_mut(&mut self, id: EntityId) -> Option<&mut Armory> {
        self.armories.get_mut(&id)
    }

    /// Regeneration record of a live entity, created at zero if missing.
    pub(crate) fn regeneration_entry(&mut self, id: EntityId) -> Option<&mut Regeneration> {
        if !self.positions.contains_key(&id) {
            return None;
        }
        Some(self.regenerations.entry(id).or_default())
    }

    pub(crate) fn sprite_mut(&mut self, id: EntityId) -> Option<&mut Sprite> {
        self.sprites.get_mut(&id)
    }

    pub(crate) fn projectile_mut(&mut self, id: EntityId) -> Option<&mut Projectile> {
        self.projectiles.get_mut(&id)
    }

    /// First player-aligned entity in creation order.
    pub(crate) fn player(&self) -> Option<EntityId> {
        self.allegiances
            .iter()
            .find(|(_, allegiance)| allegiance.is_player())
            .map(|(id, _)| *id)
    }

    /// Snapshot of every positioned entity that is not a projectile.
    pub(crate) fn actor_snapshots(&self) -> Vec<ActorSnapshot> {
        self.positions
            .iter()
            .filter(|(id, _)| !self.projectiles.contains_key(id))
            .map(|(id, position)| self.actor_snapshot(*id, *position))
            .collect()
    }

    /// Snapshot of every positioned entity, projectiles included.
    pub(crate) fn entity_snapshots(&self) -> Vec<ActorSnapshot> {
        self.positions
            .iter()
            .map(|(id, position)| self.actor_snapshot(*id, *position))
            .collect()
    }

    fn actor_snapshot(&self, id: EntityId, position: Vec2) -> ActorSnapshot {
        ActorSnapshot {
            id,
            position,
            allegiance: self.allegiance(id),
            motion: self.motions.get(&id).copied(),
            footprint: self.footprints.get(&id).copied(),
            solid: self.solids.contains(&id),
            health: self.healths.get(&id).copied(),
            damage_cooldown: self.cooldowns.get(&id).copied(),
            contact_damage: self.contact_damage.get(&id).copied(),
            armory: self.armories.get(&id).copied(),
            regeneration: self.regenerations.get(&id).copied(),
            pursues_player: self.pursuers.contains(&id),
        }
    }

    pub(crate) fn projectile_snapshots(&self) -> Vec<ProjectileSnapshot> {
        self.projectiles
            .iter()
            .filter_map(|(id, projectile)| {
                let position = self.positions.get(id)?;
                Some(ProjectileSnapshot {
                    id: *id,
                    position: *position,
                    projectile: *projectile,
                })
            })
            .collect()
    }

    pub(crate) fn sprite_snapshots(&self) -> Vec<SpriteSnapshot> {
        self.sprites
            .iter()
            .filter_map(|(id, sprite)| {
                let position = self.positions.get(id)?;
                Some(SpriteSnapshot {
                    id: *id,
                    position: *position,
                    sprite: sprite.clone(),
                    allegiance: self.allegiance(*id),
                    damage_cooldown: self.cooldowns.get(id).copied(),
                })
            })
            .collect()
    }
}
