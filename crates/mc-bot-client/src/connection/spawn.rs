use super::*;

use mc_bot_game::components::{rad_from_deg, EntityKind};
use mc_bot_game::player_list::{link, unlink, unlink_entity};
use mc_bot_proto::types::{BlockPos, MetadataEntry, Uuid};

impl Connection {
    // -----------------------------------------------------------------------
    // Join / respawn
    // -----------------------------------------------------------------------

    pub(super) fn handle_join_game(
        &mut self,
        entity_id: i32,
        game_mode: GameMode,
        dimension: i32,
    ) -> Result<(), DesyncError> {
        info!("Joined game as entity {entity_id} in dimension {dimension} ({game_mode})");
        self.enter_world(entity_id, dimension, game_mode);
        Ok(())
    }

    pub(super) fn handle_respawn(
        &mut self,
        dimension: i32,
        game_mode: GameMode,
    ) -> Result<(), DesyncError> {
        let entity_id = self
            .avatar
            .entity_id
            .ok_or(DesyncError::NoWorld { event: "Respawn" })?;
        info!("Respawned in dimension {dimension} ({game_mode})");
        self.enter_world(entity_id, dimension, game_mode);
        Ok(())
    }

    /// Replace the world and rebuild the own entity in it. Position stays
    /// unknown until the next position confirmation.
    fn enter_world(&mut self, entity_id: i32, dimension: i32, game_mode: GameMode) {
        let mut world = GameWorld::new(dimension);
        self.avatar.reset_vitals();
        self.avatar.entity_id = Some(entity_id);
        self.player_list.clear_entity_links();

        world.entities.set_kind(entity_id, EntityKind::Player);
        if let Some(profile) = &self.profile {
            world.entities.set_uuid(entity_id, profile.id);
            let (entry, _) = self.player_list.get_or_insert(profile);
            entry.game_mode = Some(game_mode);
            link(&mut world.entities, &mut self.player_list, entity_id, profile.id);
        }
        self.world = Some(world);
    }

    // -----------------------------------------------------------------------
    // Entity spawns
    // -----------------------------------------------------------------------

    pub(super) fn handle_spawn_player(
        &mut self,
        entity_id: i32,
        uuid: Uuid,
        position: Vec3d,
        yaw: f32,
        pitch: f32,
        metadata: &[MetadataEntry],
    ) -> Result<(), DesyncError> {
        let Some(world) = self.world.as_mut() else {
            return Err(DesyncError::NoWorld {
                event: "SpawnPlayer",
            });
        };
        let entities = &mut world.entities;
        if entities.roster_link(entity_id) != Some(uuid) {
            unlink(entities, &mut self.player_list, entity_id);
        }
        entities.set_kind(entity_id, EntityKind::Player);
        entities.set_uuid(entity_id, uuid);
        entities.set_position(entity_id, position);
        entities.set_look(entity_id, Look::from_degrees(yaw, pitch));
        entities.replace_metadata(entity_id, metadata);

        if !link(entities, &mut self.player_list, entity_id, uuid) {
            warn!("Player entity {entity_id} spawned with unlisted uuid {uuid}");
        }
        Ok(())
    }

    /// Registry for a non-player spawn. An id reused from a player entity
    /// loses its roster link first.
    fn spawn_target(
        &mut self,
        event: &'static str,
        entity_id: i32,
    ) -> Result<&mut EntityRegistry, DesyncError> {
        let Some(world) = self.world.as_mut() else {
            return Err(DesyncError::NoWorld { event });
        };
        unlink(&mut world.entities, &mut self.player_list, entity_id);
        Ok(&mut world.entities)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn handle_spawn_object(
        &mut self,
        entity_id: i32,
        uuid: Uuid,
        object_type: i32,
        data: i32,
        position: Vec3d,
        look: Look,
        velocity: Vec3d,
    ) -> Result<(), DesyncError> {
        let entities = self.spawn_target("SpawnObject", entity_id)?;
        entities.set_kind(entity_id, EntityKind::Object { object_type, data });
        entities.set_uuid(entity_id, uuid);
        entities.set_position(entity_id, position);
        entities.set_look(entity_id, look);
        entities.set_velocity(entity_id, velocity);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn handle_spawn_mob(
        &mut self,
        entity_id: i32,
        uuid: Uuid,
        mob_type: i32,
        position: Vec3d,
        look: Look,
        head_yaw: f32,
        velocity: Vec3d,
        metadata: &[MetadataEntry],
    ) -> Result<(), DesyncError> {
        let entities = self.spawn_target("SpawnMob", entity_id)?;
        entities.set_kind(entity_id, EntityKind::Mob { mob_type });
        entities.set_uuid(entity_id, uuid);
        entities.set_position(entity_id, position);
        entities.set_look(entity_id, look);
        entities.set_head_yaw(entity_id, rad_from_deg(head_yaw as f64));
        entities.set_velocity(entity_id, velocity);
        entities.replace_metadata(entity_id, metadata);
        Ok(())
    }

    pub(super) fn handle_spawn_painting(
        &mut self,
        entity_id: i32,
        uuid: Uuid,
        painting_type: String,
        direction: u8,
        position: BlockPos,
    ) -> Result<(), DesyncError> {
        let entities = self.spawn_target("SpawnPainting", entity_id)?;
        entities.set_kind(
            entity_id,
            EntityKind::Painting {
                painting_type,
                direction,
            },
        );
        entities.set_uuid(entity_id, uuid);
        entities.set_position(entity_id, position.as_vec3d());
        Ok(())
    }

    pub(super) fn handle_spawn_exp_orb(
        &mut self,
        entity_id: i32,
        position: Vec3d,
        count: i32,
    ) -> Result<(), DesyncError> {
        let entities = self.spawn_target("SpawnExpOrb", entity_id)?;
        entities.set_kind(entity_id, EntityKind::ExpOrb { count });
        entities.set_position(entity_id, position);
        Ok(())
    }

    pub(super) fn handle_spawn_global(
        &mut self,
        entity_id: i32,
        global_type: i32,
        position: Vec3d,
    ) -> Result<(), DesyncError> {
        let entities = self.spawn_target("SpawnGlobalEntity", entity_id)?;
        entities.set_kind(entity_id, EntityKind::Global { global_type });
        entities.set_position(entity_id, position);
        Ok(())
    }

    pub(super) fn handle_destroy(&mut self, entity_ids: &[i32]) -> Result<(), DesyncError> {
        let Some(world) = self.world.as_mut() else {
            return Err(DesyncError::NoWorld {
                event: "DestroyEntities",
            });
        };
        for &id in entity_ids {
            match world.entities.remove(id) {
                Some(removed) => unlink_entity(&mut self.player_list, id, removed.roster),
                None => trace!("Destroy of unknown entity {id}"),
            }
        }
        Ok(())
    }
}
