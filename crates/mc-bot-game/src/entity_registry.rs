//! Entity registry: bevy_ecs storage keyed by server entity id, plus the
//! vehicle/passenger graph.

use std::collections::HashMap;

use bevy_ecs::prelude::*;
use tracing::trace;

use mc_bot_proto::types::{metadata_from_entries, Metadata, MetadataEntry, Uuid, Vec3d};

use crate::components::*;

/// Read-only copy of everything known about one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub id: i32,
    pub kind: EntityKind,
    pub uuid: Option<Uuid>,
    pub position: Option<Vec3d>,
    pub look: Option<Look>,
    pub head_yaw: Option<f64>,
    pub velocity: Option<Vec3d>,
    pub on_ground: Option<bool>,
    pub metadata: Metadata,
    pub vehicle: Option<i32>,
    pub passengers: Vec<i32>,
    pub roster: Option<Uuid>,
}

/// All entities in the currently loaded world.
///
/// Every mutator creates the entity on first reference, the way the server
/// expects a client to treat ids it has not seen spawn yet.
pub struct EntityRegistry {
    world: World,
    index: HashMap<i32, Entity>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: i32) -> bool {
        self.index.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.index.keys().copied()
    }

    /// Look up or create the ECS entity for a network id. Returns whether it was created.
    pub fn get_or_create(&mut self, id: i32) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        let entity = self.world.spawn((NetworkId(id), EntityKind::Unknown)).id();
        self.index.insert(id, entity);
        trace!("Created entity {id}");
        true
    }

    fn handle(&mut self, id: i32) -> Entity {
        self.get_or_create(id);
        self.index[&id]
    }

    fn insert<C: Component>(&mut self, id: i32, component: C) {
        let entity = self.handle(id);
        self.world.entity_mut(entity).insert(component);
    }

    fn get<C: Component>(&self, id: i32) -> Option<&C> {
        let entity = *self.index.get(&id)?;
        self.world.get::<C>(entity)
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    pub fn set_kind(&mut self, id: i32, kind: EntityKind) {
        self.insert(id, kind);
    }

    pub fn set_uuid(&mut self, id: i32, uuid: Uuid) {
        self.insert(id, EntityUuid(uuid));
    }

    pub fn set_position(&mut self, id: i32, position: Vec3d) {
        self.insert(id, Position(position));
    }

    /// Offset a known position. Entities without a position stay unknown; returns whether it moved.
    pub fn move_by(&mut self, id: i32, delta: Vec3d) -> bool {
        let entity = self.handle(id);
        match self.world.get_mut::<Position>(entity) {
            Some(mut position) => {
                position.0 += delta;
                true
            }
            None => false,
        }
    }

    pub fn set_look(&mut self, id: i32, look: Look) {
        self.insert(id, look);
    }

    pub fn set_head_yaw(&mut self, id: i32, head_yaw: f64) {
        self.insert(id, HeadYaw(head_yaw));
    }

    pub fn set_velocity(&mut self, id: i32, velocity: Vec3d) {
        self.insert(id, Velocity(velocity));
    }

    pub fn set_on_ground(&mut self, id: i32, on_ground: bool) {
        self.insert(id, OnGround(on_ground));
    }

    /// Replace the whole metadata table (spawn packets).
    pub fn replace_metadata(&mut self, id: i32, entries: &[MetadataEntry]) {
        self.insert(id, EntityMetadata(metadata_from_entries(entries)));
    }

    /// Merge by index: sent entries overwrite, the rest keep their value.
    pub fn merge_metadata(&mut self, id: i32, entries: &[MetadataEntry]) {
        let entity = self.handle(id);
        let mut entity_mut = self.world.entity_mut(entity);
        match entity_mut.get_mut::<EntityMetadata>() {
            Some(mut metadata) => {
                for entry in entries {
                    metadata.0.insert(entry.index, entry.value.clone());
                }
            }
            None => {
                entity_mut.insert(EntityMetadata(metadata_from_entries(entries)));
            }
        }
    }

    /// Set (or clear) the vehicle reference of one entity. Does not touch the
    /// vehicle's passenger list; the server republishes that separately.
    pub fn set_vehicle(&mut self, id: i32, vehicle: Option<i32>) {
        match vehicle {
            Some(vehicle_id) => {
                self.get_or_create(vehicle_id);
                self.insert(id, Vehicle(vehicle_id));
            }
            None => {
                let entity = self.handle(id);
                self.world.entity_mut(entity).remove::<Vehicle>();
            }
        }
    }

    /// Replace the passenger list of `id` and point every passenger's vehicle at it.
    ///
    /// Former passengers that still pointed at `id` are dismounted, and new
    /// passengers are removed from whatever list held them before.
    pub fn set_passengers(&mut self, id: i32, passenger_ids: &[i32]) {
        let mut passengers: Vec<i32> = Vec::with_capacity(passenger_ids.len());
        for &passenger in passenger_ids {
            if passenger != id && !passengers.contains(&passenger) {
                passengers.push(passenger);
            }
        }

        let previous = self.passengers(id);
        for former in previous.into_iter().filter(|p| !passengers.contains(p)) {
            if self.vehicle(former) == Some(id) {
                self.set_vehicle(former, None);
            }
        }

        for &passenger in &passengers {
            if let Some(old_vehicle) = self.vehicle(passenger) {
                if old_vehicle != id {
                    self.remove_from_passengers(old_vehicle, passenger);
                }
            }
            self.insert(passenger, Vehicle(id));
        }

        self.insert(id, Passengers(passengers));
    }

    pub fn set_roster_link(&mut self, id: i32, uuid: Option<Uuid>) {
        match uuid {
            Some(uuid) => self.insert(id, RosterLink(uuid)),
            None => {
                if let Some(&entity) = self.index.get(&id) {
                    self.world.entity_mut(entity).remove::<RosterLink>();
                }
            }
        }
    }

    fn remove_from_passengers(&mut self, vehicle: i32, passenger: i32) {
        let Some(&entity) = self.index.get(&vehicle) else {
            return;
        };
        if let Some(mut passengers) = self.world.get_mut::<Passengers>(entity) {
            passengers.0.retain(|&p| p != passenger);
        }
    }

    /// Remove an entity and every reference other entities hold to it.
    /// Returns its last state so the caller can clean up the player list.
    pub fn remove(&mut self, id: i32) -> Option<EntitySnapshot> {
        let snapshot = self.snapshot(id)?;
        let entity = self.index.remove(&id)?;

        let riders: Vec<Entity> = self
            .world
            .query::<(Entity, &Vehicle)>()
            .iter(&self.world)
            .filter(|(_, vehicle)| vehicle.0 == id)
            .map(|(rider, _)| rider)
            .collect();
        for rider in riders {
            self.world.entity_mut(rider).remove::<Vehicle>();
        }

        let mut lists = self.world.query::<&mut Passengers>();
        for mut passengers in lists.iter_mut(&mut self.world) {
            if passengers.0.contains(&id) {
                passengers.0.retain(|&p| p != id);
            }
        }

        self.world.despawn(entity);
        trace!("Removed entity {id}");
        Some(snapshot)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn kind(&self, id: i32) -> Option<&EntityKind> {
        self.get::<EntityKind>(id)
    }

    pub fn uuid(&self, id: i32) -> Option<Uuid> {
        self.get::<EntityUuid>(id).map(|u| u.0)
    }

    pub fn position(&self, id: i32) -> Option<Vec3d> {
        self.get::<Position>(id).map(|p| p.0)
    }

    pub fn look(&self, id: i32) -> Option<Look> {
        self.get::<Look>(id).copied()
    }

    pub fn on_ground(&self, id: i32) -> Option<bool> {
        self.get::<OnGround>(id).map(|g| g.0)
    }

    pub fn vehicle(&self, id: i32) -> Option<i32> {
        self.get::<Vehicle>(id).map(|v| v.0)
    }

    pub fn passengers(&self, id: i32) -> Vec<i32> {
        self.get::<Passengers>(id)
            .map(|p| p.0.clone())
            .unwrap_or_default()
    }

    pub fn roster_link(&self, id: i32) -> Option<Uuid> {
        self.get::<RosterLink>(id).map(|r| r.0)
    }

    /// Find a player entity by its UUID.
    pub fn find_player(&self, uuid: Uuid) -> Option<i32> {
        self.index
            .iter()
            .find(|(_, entity)| {
                let entity = **entity;
                matches!(self.world.get::<EntityKind>(entity), Some(EntityKind::Player))
                    && self.world.get::<EntityUuid>(entity).map(|u| u.0) == Some(uuid)
            })
            .map(|(&id, _)| id)
    }

    pub fn snapshot(&self, id: i32) -> Option<EntitySnapshot> {
        let entity = *self.index.get(&id)?;
        let world = &self.world;
        Some(EntitySnapshot {
            id,
            kind: world
                .get::<EntityKind>(entity)
                .cloned()
                .unwrap_or(EntityKind::Unknown),
            uuid: world.get::<EntityUuid>(entity).map(|u| u.0),
            position: world.get::<Position>(entity).map(|p| p.0),
            look: world.get::<Look>(entity).copied(),
            head_yaw: world.get::<HeadYaw>(entity).map(|h| h.0),
            velocity: world.get::<Velocity>(entity).map(|v| v.0),
            on_ground: world.get::<OnGround>(entity).map(|g| g.0),
            metadata: world
                .get::<EntityMetadata>(entity)
                .map(|m| m.0.clone())
                .unwrap_or_default(),
            vehicle: world.get::<Vehicle>(entity).map(|v| v.0),
            passengers: world
                .get::<Passengers>(entity)
                .map(|p| p.0.clone())
                .unwrap_or_default(),
            roster: world.get::<RosterLink>(entity).map(|r| r.0),
        })
    }
}
