//! Connection state machine and inbound event dispatch.
//!
//! States: idle (no transport), awaiting join (transport and profile set, no
//! world), spawned (world, own entity and position known), terminated (end
//! reason set). Only a fresh [`Connection::attach`] leaves the terminated
//! state, and it resets every model first.

mod movement;
mod roster;
mod spawn;
mod survival;
mod world_events;

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use mc_bot_game::components::Look;
use mc_bot_game::{Avatar, EntityRegistry, EntitySnapshot, Experience, GameWorld, PlayerList, Window};
use mc_bot_proto::types::{GameMode, GameProfile, Vec3d};
use mc_bot_proto::{ClientboundEvent, ServerboundEvent};
use mc_bot_world::World;

use crate::error::{ConnectionError, DesyncError};
use crate::events::BotEvent;
use crate::ticker::{AvatarSnapshot, PositionTicker, DEFAULT_TICK_INTERVAL};
use crate::transport::Transport;

/// One client session and everything it knows about the server.
pub struct Connection {
    transport: Option<Arc<dyn Transport>>,
    profile: Option<GameProfile>,
    end_reason: Option<String>,
    /// `None` until the first join.
    world: Option<GameWorld>,
    player_list: PlayerList,
    avatar: Avatar,
    /// Undrained notifications. Unbounded: owners call `drain_events()`
    /// after each dispatch.
    events: Vec<BotEvent>,
    ticker: PositionTicker,
    snapshot: watch::Sender<AvatarSnapshot>,
    tick_interval: Duration,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    pub fn new() -> Self {
        Self::with_tick_interval(DEFAULT_TICK_INTERVAL)
    }

    pub fn with_tick_interval(tick_interval: Duration) -> Self {
        let (snapshot, _) = watch::channel(AvatarSnapshot::default());
        Self {
            transport: None,
            profile: None,
            end_reason: None,
            world: None,
            player_list: PlayerList::new(),
            avatar: Avatar::new(),
            events: Vec::new(),
            ticker: PositionTicker::new(),
            snapshot,
            tick_interval,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start a session. Fails while a transport is attached; from the idle or
    /// terminated state all models of the previous session are discarded.
    pub fn attach(
        &mut self,
        transport: Arc<dyn Transport>,
        profile: GameProfile,
    ) -> Result<(), ConnectionError> {
        if self.transport.is_some() {
            return Err(ConnectionError::AlreadyConnected);
        }
        self.ticker.stop();
        self.world = None;
        self.player_list.clear();
        self.avatar = Avatar::new();
        self.end_reason = None;
        self.snapshot.send_replace(AvatarSnapshot::default());

        info!("Attached to {} as {profile}", transport.remote_address());
        self.transport = Some(transport);
        self.profile = Some(profile);
        Ok(())
    }

    /// End the session. Only the first reason is kept; later calls are no-ops.
    pub fn terminate(&mut self, reason: &str, cause: Option<&dyn Error>) {
        if let Some(existing) = &self.end_reason {
            debug!("Already terminated ({existing}), ignoring: {reason}");
            return;
        }
        match cause {
            Some(cause) => warn!("Connection terminated: {reason} ({cause})"),
            None => warn!("Connection terminated: {reason}"),
        }
        self.end_reason = Some(reason.to_string());
        self.ticker.stop();
        if let Some(transport) = self.transport.take() {
            transport.disconnect(reason);
        }
        self.events.push(BotEvent::Disconnected {
            reason: reason.to_string(),
        });
    }

    /// Apply one inbound event. Ignored unless connected; a desync terminates.
    pub fn apply(&mut self, event: ClientboundEvent) {
        if !self.connected() {
            trace!("Not connected, dropping {}", event.name());
            return;
        }
        if let Err(e) = self.dispatch(event) {
            self.terminate(&e.to_string(), Some(&e as &dyn Error));
        }
        self.publish_snapshot();
    }

    fn dispatch(&mut self, event: ClientboundEvent) -> Result<(), DesyncError> {
        use ClientboundEvent as E;

        let name = event.name();
        trace!("Dispatching {name}");
        match event {
            E::JoinGame {
                entity_id,
                game_mode,
                dimension,
            } => self.handle_join_game(entity_id, game_mode, dimension),
            E::Respawn {
                dimension,
                game_mode,
            } => self.handle_respawn(dimension, game_mode),
            E::Chat { message } => {
                info!("[CHAT] {message}");
                Ok(())
            }
            E::PlayerHealth {
                health,
                food,
                saturation,
            } => {
                self.handle_health(health, food, saturation);
                Ok(())
            }
            E::SetExperience {
                progress,
                level,
                total,
            } => {
                self.avatar.experience = Some(Experience {
                    progress,
                    level,
                    total,
                });
                Ok(())
            }
            E::PlayerPositionRotation {
                position,
                yaw,
                pitch,
                relative,
                teleport_id,
            } => self.handle_player_position(position, yaw, pitch, relative, teleport_id),
            E::VehicleMove {
                position,
                yaw,
                pitch,
            } => self.handle_vehicle_move(position, yaw, pitch),

            E::PlayerListEntry { action, entries } => {
                self.handle_player_list(action, entries);
                Ok(())
            }

            E::SpawnPlayer {
                entity_id,
                uuid,
                position,
                yaw,
                pitch,
                metadata,
            } => self.handle_spawn_player(entity_id, uuid, position, yaw, pitch, &metadata),
            E::SpawnObject {
                entity_id,
                uuid,
                object_type,
                data,
                position,
                yaw,
                pitch,
                velocity,
            } => self.handle_spawn_object(
                entity_id,
                uuid,
                object_type,
                data,
                position,
                Look::from_degrees(yaw, pitch),
                velocity,
            ),
            E::SpawnMob {
                entity_id,
                uuid,
                mob_type,
                position,
                yaw,
                pitch,
                head_yaw,
                velocity,
                metadata,
            } => self.handle_spawn_mob(
                entity_id,
                uuid,
                mob_type,
                position,
                Look::from_degrees(yaw, pitch),
                head_yaw,
                velocity,
                &metadata,
            ),
            E::SpawnPainting {
                entity_id,
                uuid,
                painting_type,
                direction,
                position,
            } => self.handle_spawn_painting(entity_id, uuid, painting_type, direction, position),
            E::SpawnExpOrb {
                entity_id,
                position,
                count,
            } => self.handle_spawn_exp_orb(entity_id, position, count),
            E::SpawnGlobalEntity {
                entity_id,
                global_type,
                position,
            } => self.handle_spawn_global(entity_id, global_type, position),
            E::DestroyEntities { entity_ids } => self.handle_destroy(&entity_ids),

            E::EntityTeleport {
                entity_id,
                position,
                yaw,
                pitch,
                on_ground,
            } => self.handle_entity_teleport(entity_id, position, yaw, pitch, on_ground),
            E::EntityVelocity {
                entity_id,
                velocity,
            } => {
                self.entities_mut(name)?.set_velocity(entity_id, velocity);
                Ok(())
            }
            E::EntityPosition {
                entity_id,
                dx,
                dy,
                dz,
                on_ground,
            } => self.handle_entity_move(entity_id, (dx, dy, dz), None, on_ground),
            E::EntityPositionRotation {
                entity_id,
                dx,
                dy,
                dz,
                yaw,
                pitch,
                on_ground,
            } => self.handle_entity_move(
                entity_id,
                (dx, dy, dz),
                Some(Look::from_degrees(yaw, pitch)),
                on_ground,
            ),
            E::EntityRotation {
                entity_id,
                yaw,
                pitch,
                on_ground,
            } => {
                let entities = self.entities_mut(name)?;
                entities.set_look(entity_id, Look::from_degrees(yaw, pitch));
                entities.set_on_ground(entity_id, on_ground);
                Ok(())
            }
            E::EntityHeadLook {
                entity_id,
                head_yaw,
            } => self.handle_head_look(entity_id, head_yaw),

            E::EntityAttach {
                entity_id,
                attached_to_id,
            } => self.handle_attach(entity_id, attached_to_id),
            E::EntitySetPassengers {
                entity_id,
                passenger_ids,
            } => {
                self.entities_mut(name)?
                    .set_passengers(entity_id, &passenger_ids);
                Ok(())
            }
            E::EntityMetadata {
                entity_id,
                metadata,
            } => {
                self.entities_mut(name)?.merge_metadata(entity_id, &metadata);
                Ok(())
            }

            E::ChunkData { column } => {
                self.terrain_mut(name)?.update_column(&column);
                Ok(())
            }
            E::UnloadChunk { x, z } => {
                self.terrain_mut(name)?.unload_column(x, z);
                Ok(())
            }
            E::BlockChange { record } => {
                self.terrain_mut(name)?.set_block(&record);
                Ok(())
            }
            E::MultiBlockChange { records } => {
                let terrain = self.terrain_mut(name)?;
                for record in &records {
                    terrain.set_block(record);
                }
                Ok(())
            }
            E::BlockValue {
                position,
                block_id,
                action_type,
                action_param,
            } => self.handle_block_value(position, block_id, action_type, action_param),
            E::NotifyClient { change } => self.handle_notify(change),

            E::WindowItems { window_id, items } => {
                self.handle_window_items(window_id, items);
                Ok(())
            }
            E::SetSlot {
                window_id,
                slot,
                item,
            } => {
                self.handle_set_slot(window_id, slot, item);
                Ok(())
            }
            E::HeldItemChange { slot } => {
                self.handle_held_item(slot);
                Ok(())
            }

            E::EntityStatus { .. }
            | E::EntityAnimation { .. }
            | E::EntityEquipment { .. }
            | E::EntityEffect { .. }
            | E::EntityRemoveEffect { .. }
            | E::CollectItem { .. }
            | E::OpenWindow { .. }
            | E::CloseWindow { .. }
            | E::KeepAlive { .. }
            | E::Unknown { .. } => {
                trace!("Ignoring {name}");
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers shared by the dispatch submodules
    // -----------------------------------------------------------------------

    fn world_mut(&mut self, event: &'static str) -> Result<&mut GameWorld, DesyncError> {
        self.world.as_mut().ok_or(DesyncError::NoWorld { event })
    }

    fn entities_mut(&mut self, event: &'static str) -> Result<&mut EntityRegistry, DesyncError> {
        Ok(&mut self.world_mut(event)?.entities)
    }

    fn terrain_mut(&mut self, event: &'static str) -> Result<&mut World, DesyncError> {
        Ok(&mut self.world_mut(event)?.terrain)
    }

    /// Publish the avatar's transform for the ticker.
    fn publish_snapshot(&self) {
        let snapshot = match (self.avatar.entity_id, &self.world) {
            (Some(id), Some(world)) => AvatarSnapshot {
                position: world.entities.position(id),
                look: world.entities.look(id),
                on_ground: world.entities.on_ground(id),
            },
            _ => AvatarSnapshot::default(),
        };
        self.snapshot.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn start_ticker(&mut self) {
        let Some(transport) = self.transport.clone() else {
            return;
        };
        self.publish_snapshot();
        self.ticker
            .start(transport, self.snapshot.subscribe(), self.tick_interval);
    }

    /// Hand an event to the transport. Dropped when not connected.
    pub fn send(&self, event: ServerboundEvent) {
        match &self.transport {
            Some(transport) => transport.send(event),
            None => debug!("No transport, dropping {}", event.name()),
        }
    }

    /// Send a chat message or command as the avatar.
    pub fn chat(&self, message: impl Into<String>) {
        self.send(ServerboundEvent::Chat {
            message: message.into(),
        });
    }

    /// Take the notifications collected since the last call. The queue is
    /// never trimmed, so a long-lived connection must be drained regularly.
    pub fn drain_events(&mut self) -> Vec<BotEvent> {
        std::mem::take(&mut self.events)
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// Transport attached, profile assigned, and not terminated.
    pub fn connected(&self) -> bool {
        self.transport.is_some() && self.end_reason.is_none() && self.profile.is_some()
    }

    /// Connected with world, position, health, and experience all known.
    pub fn spawned(&self) -> bool {
        self.connected()
            && self.world.is_some()
            && self.position().is_some()
            && self.avatar.health.is_some()
            && self.avatar.experience.is_some()
    }

    pub fn alive(&self) -> bool {
        self.spawned() && !self.avatar.is_dead()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    pub fn end_reason(&self) -> Option<&str> {
        self.end_reason.as_deref()
    }

    pub fn profile(&self) -> Option<&GameProfile> {
        self.profile.as_ref()
    }

    pub fn own_entity_id(&self) -> Option<i32> {
        self.avatar.entity_id
    }

    pub fn own_entity(&self) -> Option<EntitySnapshot> {
        self.entities()?.snapshot(self.avatar.entity_id?)
    }

    pub fn position(&self) -> Option<Vec3d> {
        self.entities()?.position(self.avatar.entity_id?)
    }

    pub fn look(&self) -> Option<Look> {
        self.entities()?.look(self.avatar.entity_id?)
    }

    pub fn on_ground(&self) -> Option<bool> {
        self.entities()?.on_ground(self.avatar.entity_id?)
    }

    pub fn health(&self) -> Option<f32> {
        self.avatar.health
    }

    pub fn food(&self) -> Option<i32> {
        self.avatar.food
    }

    pub fn saturation(&self) -> Option<f32> {
        self.avatar.saturation
    }

    pub fn experience(&self) -> Option<Experience> {
        self.avatar.experience
    }

    /// Read from the avatar's own player-list entry.
    pub fn game_mode(&self) -> Option<GameMode> {
        let profile = self.profile.as_ref()?;
        self.player_list.get(profile.id)?.game_mode
    }

    pub fn inventory(&self) -> Option<&Window> {
        self.avatar.inventory.as_ref()
    }

    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    pub fn game_world(&self) -> Option<&GameWorld> {
        self.world.as_ref()
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref().map(|w| &w.terrain)
    }

    pub fn entities(&self) -> Option<&EntityRegistry> {
        self.world.as_ref().map(|w| &w.entities)
    }

    pub fn player_list(&self) -> &PlayerList {
        &self.player_list
    }
}

#[cfg(test)]
mod test_support {
    use super::*;
    use crate::transport::{ChannelTransport, TransportCommand};
    use mc_bot_proto::types::Uuid;
    use tokio::sync::mpsc::UnboundedReceiver;

    pub(super) const OWN_ID: i32 = 100;

    pub(super) fn own_profile() -> GameProfile {
        GameProfile::new(Uuid::new(0, 0xB07), "Bot")
    }

    pub(super) fn attached() -> (Connection, UnboundedReceiver<TransportCommand>) {
        let (transport, rx) = ChannelTransport::new("test");
        let mut conn = Connection::new();
        conn.attach(Arc::new(transport), own_profile()).unwrap();
        (conn, rx)
    }

    /// Attached and joined to dimension 0 as survival.
    pub(super) fn joined() -> (Connection, UnboundedReceiver<TransportCommand>) {
        let (mut conn, rx) = attached();
        conn.apply(ClientboundEvent::JoinGame {
            entity_id: OWN_ID,
            game_mode: GameMode::Survival,
            dimension: 0,
        });
        (conn, rx)
    }

    pub(super) fn drain(rx: &mut UnboundedReceiver<TransportCommand>) -> Vec<TransportCommand> {
        let mut out = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            out.push(cmd);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::transport::{ChannelTransport, TransportCommand};
    use mc_bot_proto::clientbound::{PlayerListAction, PlayerListItem};
    use mc_bot_proto::types::Uuid;

    #[test]
    fn new_connection_is_idle() {
        let conn = Connection::new();
        assert!(!conn.connected());
        assert!(!conn.spawned());
        assert!(conn.end_reason().is_none());
        assert!(conn.world().is_none());
    }

    #[test]
    fn attach_connects() {
        let (conn, _rx) = attached();
        assert!(conn.connected());
        assert!(!conn.spawned());
        assert_eq!(conn.profile(), Some(&own_profile()));
    }

    #[test]
    fn attach_twice_fails() {
        let (mut conn, _rx) = attached();
        let (other, _other_rx) = ChannelTransport::new("other");
        assert_eq!(
            conn.attach(Arc::new(other), own_profile()),
            Err(ConnectionError::AlreadyConnected)
        );
        assert!(conn.connected());
    }

    #[test]
    fn events_before_attach_are_ignored() {
        let mut conn = Connection::new();
        conn.apply(ClientboundEvent::JoinGame {
            entity_id: OWN_ID,
            game_mode: GameMode::Survival,
            dimension: 0,
        });
        assert!(conn.world().is_none());
    }

    #[test]
    fn terminate_keeps_first_reason() {
        let (mut conn, mut rx) = joined();
        conn.terminate("Kicked", None);
        conn.terminate("Second", None);

        assert!(!conn.connected());
        assert_eq!(conn.end_reason(), Some("Kicked"));
        assert_eq!(
            drain(&mut rx),
            vec![TransportCommand::Disconnect {
                reason: "Kicked".into()
            }]
        );
        assert_eq!(
            conn.drain_events(),
            vec![BotEvent::Disconnected {
                reason: "Kicked".into()
            }]
        );
    }

    #[test]
    fn events_after_terminate_are_ignored() {
        let (mut conn, _rx) = joined();
        conn.terminate("bye", None);
        conn.apply(ClientboundEvent::PlayerHealth {
            health: 20.0,
            food: 20,
            saturation: 5.0,
        });
        assert_eq!(conn.health(), None);
    }

    #[test]
    fn terminate_without_attach_is_safe() {
        let mut conn = Connection::new();
        conn.terminate("never connected", None);
        assert_eq!(conn.end_reason(), Some("never connected"));
    }

    #[test]
    fn reattach_resets_models() {
        let (mut conn, _rx) = joined();
        let stranger = GameProfile::new(Uuid::new(0, 9), "stranger");
        conn.apply(ClientboundEvent::PlayerListEntry {
            action: PlayerListAction::AddPlayer,
            entries: vec![PlayerListItem {
                profile: stranger.clone(),
                game_mode: None,
                ping: 0,
                display_name: None,
            }],
        });
        conn.apply(ClientboundEvent::PlayerHealth {
            health: 12.0,
            food: 10,
            saturation: 1.0,
        });
        conn.terminate("lost", None);

        let (transport, _rx2) = ChannelTransport::new("again");
        conn.attach(Arc::new(transport), own_profile()).unwrap();
        assert!(conn.connected());
        assert_eq!(conn.end_reason(), None);
        assert!(conn.world().is_none());
        assert!(conn.player_list().is_empty());
        assert_eq!(conn.health(), None);
        assert_eq!(conn.own_entity_id(), None);
    }

    #[test]
    fn unhandled_events_are_accepted() {
        let (mut conn, _rx) = joined();
        conn.apply(ClientboundEvent::Unknown { packet_id: 0x7f });
        conn.apply(ClientboundEvent::KeepAlive { id: 5 });
        conn.apply(ClientboundEvent::EntityStatus {
            entity_id: 3,
            status: 2,
        });
        assert!(conn.connected());
    }

    #[test]
    fn world_events_before_join_terminate() {
        let (mut conn, _rx) = attached();
        conn.apply(ClientboundEvent::UnloadChunk { x: 0, z: 0 });
        assert!(!conn.connected());
        assert_eq!(
            conn.end_reason(),
            Some("UnloadChunk received before joining a world")
        );
    }

    #[test]
    fn chat_does_not_change_state() {
        let (mut conn, _rx) = joined();
        conn.apply(ClientboundEvent::Chat {
            message: "hello".into(),
        });
        assert!(conn.connected());
    }

    #[test]
    fn chat_goes_to_transport() {
        let (conn, mut rx) = joined();
        conn.chat("/help");
        assert_eq!(
            drain(&mut rx),
            vec![TransportCommand::Send(ServerboundEvent::Chat {
                message: "/help".into()
            })]
        );
    }

    #[test]
    fn events_queue_until_drained() {
        let (mut conn, _rx) = joined();
        for health in [20.0, 19.0, 18.0] {
            conn.apply(ClientboundEvent::PlayerHealth {
                health,
                food: 20,
                saturation: 5.0,
            });
        }
        let events = conn.drain_events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[2],
            BotEvent::VitalsChanged {
                health: 18.0,
                food: 20,
                saturation: 5.0
            }
        );
        assert!(conn.drain_events().is_empty());
    }
}
