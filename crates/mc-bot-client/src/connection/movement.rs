use super::*;

use mc_bot_game::components::rad_from_deg;
use mc_bot_proto::clientbound::{decode_delta, PositionElement};

impl Connection {
    // -----------------------------------------------------------------------
    // Avatar position
    // -----------------------------------------------------------------------

    /// Server position correction. Always acknowledged; relative coordinates
    /// are not supported and end the connection.
    pub(super) fn handle_player_position(
        &mut self,
        position: Vec3d,
        yaw: f32,
        pitch: f32,
        relative: Vec<PositionElement>,
        teleport_id: i32,
    ) -> Result<(), DesyncError> {
        self.send(ServerboundEvent::TeleportConfirm { teleport_id });
        if !relative.is_empty() {
            return Err(DesyncError::RelativeTeleport { flags: relative });
        }

        let event = "PlayerPositionRotation";
        let entity_id = self.avatar.entity_id.ok_or(DesyncError::NoWorld { event })?;
        let entities = self.entities_mut(event)?;
        entities.set_position(entity_id, position);
        entities.set_look(entity_id, Look::from_degrees(yaw, pitch));
        debug!("Position confirmed at {position} (teleport {teleport_id})");

        self.start_ticker();
        Ok(())
    }

    pub(super) fn handle_vehicle_move(
        &mut self,
        position: Vec3d,
        yaw: f32,
        pitch: f32,
    ) -> Result<(), DesyncError> {
        let entity_id = self.avatar.entity_id;
        let entities = self.entities_mut("VehicleMove")?;
        let vehicle = entity_id
            .and_then(|id| entities.vehicle(id))
            .ok_or(DesyncError::VehicleMoveWithoutVehicle)?;
        entities.set_position(vehicle, position);
        entities.set_look(vehicle, Look::from_degrees(yaw, pitch));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Entity transforms
    // -----------------------------------------------------------------------

    pub(super) fn handle_entity_teleport(
        &mut self,
        entity_id: i32,
        position: Vec3d,
        yaw: f32,
        pitch: f32,
        on_ground: bool,
    ) -> Result<(), DesyncError> {
        let entities = self.entities_mut("EntityTeleport")?;
        entities.set_position(entity_id, position);
        entities.set_look(entity_id, Look::from_degrees(yaw, pitch));
        entities.set_on_ground(entity_id, on_ground);
        Ok(())
    }

    /// Relative move, optionally with a new look. Both variants use the same delta scale.
    pub(super) fn handle_entity_move(
        &mut self,
        entity_id: i32,
        (dx, dy, dz): (i16, i16, i16),
        look: Option<Look>,
        on_ground: bool,
    ) -> Result<(), DesyncError> {
        let entities = self.entities_mut("EntityPosition")?;
        if !entities.move_by(entity_id, decode_delta(dx, dy, dz)) {
            trace!("Relative move for entity {entity_id} with unknown position");
        }
        if let Some(look) = look {
            entities.set_look(entity_id, look);
        }
        entities.set_on_ground(entity_id, on_ground);
        Ok(())
    }

    pub(super) fn handle_head_look(
        &mut self,
        entity_id: i32,
        head_yaw: f32,
    ) -> Result<(), DesyncError> {
        self.entities_mut("EntityHeadLook")?
            .set_head_yaw(entity_id, rad_from_deg(head_yaw as f64));
        Ok(())
    }

    /// Single-edge attach. A negative target detaches.
    pub(super) fn handle_attach(
        &mut self,
        entity_id: i32,
        attached_to_id: i32,
    ) -> Result<(), DesyncError> {
        let vehicle = (attached_to_id >= 0).then_some(attached_to_id);
        self.entities_mut("EntityAttach")?
            .set_vehicle(entity_id, vehicle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::transport::TransportCommand;

    fn confirm(position: Vec3d, yaw: f32, pitch: f32, teleport_id: i32) -> ClientboundEvent {
        ClientboundEvent::PlayerPositionRotation {
            position,
            yaw,
            pitch,
            relative: Vec::new(),
            teleport_id,
        }
    }

    fn assert_look_degrees(look: Look, yaw: f64, pitch: f64) {
        assert!((look.yaw_degrees() - yaw).abs() < 1e-6, "yaw {look:?}");
        assert!((look.pitch_degrees() - pitch).abs() < 1e-6, "pitch {look:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn position_confirmation_acks_and_starts_ticker() {
        let (mut conn, mut rx) = joined();
        conn.apply(confirm(Vec3d::new(0.0, 64.0, 0.0), 0.0, 0.0, 42));

        assert_eq!(
            drain(&mut rx),
            vec![TransportCommand::Send(ServerboundEvent::TeleportConfirm {
                teleport_id: 42
            })]
        );
        assert!(conn.is_ticking());
        assert_eq!(conn.position(), Some(Vec3d::new(0.0, 64.0, 0.0)));
        conn.terminate("done", None);
    }

    #[tokio::test(start_paused = true)]
    async fn teleport_overwrites_position_and_look() {
        let (mut conn, _rx) = joined();
        conn.apply(confirm(Vec3d::new(0.0, 0.0, 0.0), 45.0, 10.0, 1));
        conn.apply(ClientboundEvent::EntityPosition {
            entity_id: OWN_ID,
            dx: 4096,
            dy: 4096,
            dz: 4096,
            on_ground: true,
        });
        conn.apply(confirm(Vec3d::new(10.0, 64.0, -3.0), 90.0, 0.0, 2));

        assert_eq!(conn.position(), Some(Vec3d::new(10.0, 64.0, -3.0)));
        assert_look_degrees(conn.look().unwrap(), 90.0, 0.0);
        conn.terminate("done", None);
    }

    #[test]
    fn relative_teleport_acks_then_terminates() {
        let (mut conn, mut rx) = joined();
        conn.apply(ClientboundEvent::PlayerPositionRotation {
            position: Vec3d::new(1.0, 0.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            relative: vec![PositionElement::X],
            teleport_id: 9,
        });

        assert!(!conn.connected());
        assert!(conn.end_reason().unwrap().contains("relative teleport"));
        assert_eq!(conn.position(), None);
        assert!(!conn.is_ticking());
        let sent = drain(&mut rx);
        assert_eq!(
            sent[0],
            TransportCommand::Send(ServerboundEvent::TeleportConfirm { teleport_id: 9 })
        );
        assert!(matches!(sent[1], TransportCommand::Disconnect { .. }));
    }

    #[test]
    fn delta_move_uses_fixed_point_scale() {
        let (mut conn, _rx) = joined();
        conn.world
            .as_mut()
            .unwrap()
            .entities
            .set_position(5, Vec3d::new(0.0, 64.0, 0.0));

        conn.apply(ClientboundEvent::EntityPosition {
            entity_id: 5,
            dx: 4096,
            dy: 0,
            dz: -4096,
            on_ground: false,
        });
        let entities = conn.entities().unwrap();
        assert_eq!(entities.position(5), Some(Vec3d::new(1.0, 64.0, -1.0)));
        assert_eq!(entities.on_ground(5), Some(false));
    }

    #[test]
    fn move_and_look_share_the_scale() {
        let (mut conn, _rx) = joined();
        conn.world
            .as_mut()
            .unwrap()
            .entities
            .set_position(5, Vec3d::new(0.0, 64.0, 0.0));

        conn.apply(ClientboundEvent::EntityPositionRotation {
            entity_id: 5,
            dx: 2048,
            dy: -4096,
            dz: 0,
            yaw: 180.0,
            pitch: -30.0,
            on_ground: true,
        });
        let entities = conn.entities().unwrap();
        assert_eq!(entities.position(5), Some(Vec3d::new(0.5, 63.0, 0.0)));
        assert_look_degrees(entities.look(5).unwrap(), 180.0, -30.0);
    }

    #[test]
    fn delta_for_unseen_entity_creates_it_without_position() {
        let (mut conn, _rx) = joined();
        conn.apply(ClientboundEvent::EntityPosition {
            entity_id: 77,
            dx: 10,
            dy: 0,
            dz: 0,
            on_ground: true,
        });
        let entities = conn.entities().unwrap();
        assert!(entities.contains(77));
        assert_eq!(entities.position(77), None);
    }

    #[test]
    fn rotation_teleport_velocity_head_look() {
        let (mut conn, _rx) = joined();
        conn.apply(ClientboundEvent::EntityTeleport {
            entity_id: 5,
            position: Vec3d::new(3.0, 70.0, 3.0),
            yaw: 0.0,
            pitch: 0.0,
            on_ground: true,
        });
        conn.apply(ClientboundEvent::EntityRotation {
            entity_id: 5,
            yaw: -90.0,
            pitch: 45.0,
            on_ground: false,
        });
        conn.apply(ClientboundEvent::EntityVelocity {
            entity_id: 5,
            velocity: Vec3d::new(0.1, 0.0, 0.0),
        });
        conn.apply(ClientboundEvent::EntityHeadLook {
            entity_id: 5,
            head_yaw: 180.0,
        });

        let entity = conn.entities().unwrap().snapshot(5).unwrap();
        assert_eq!(entity.position, Some(Vec3d::new(3.0, 70.0, 3.0)));
        assert_look_degrees(entity.look.unwrap(), -90.0, 45.0);
        assert_eq!(entity.on_ground, Some(false));
        assert_eq!(entity.velocity, Some(Vec3d::new(0.1, 0.0, 0.0)));
        assert!((entity.head_yaw.unwrap() - std::f64::consts::PI).abs() < 1e-9);
    }

    #[test]
    fn vehicle_move_without_vehicle_terminates() {
        let (mut conn, _rx) = joined();
        conn.apply(ClientboundEvent::VehicleMove {
            position: Vec3d::new(0.0, 64.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
        });
        assert!(!conn.connected());
        assert_eq!(
            conn.end_reason(),
            Some("vehicle move received while not riding anything")
        );
    }

    #[test]
    fn vehicle_move_moves_the_vehicle() {
        let (mut conn, _rx) = joined();
        conn.apply(ClientboundEvent::EntitySetPassengers {
            entity_id: 50,
            passenger_ids: vec![OWN_ID],
        });
        conn.apply(ClientboundEvent::VehicleMove {
            position: Vec3d::new(8.0, 63.5, 8.0),
            yaw: 90.0,
            pitch: 0.0,
        });
        assert!(conn.connected());
        let entities = conn.entities().unwrap();
        assert_eq!(entities.position(50), Some(Vec3d::new(8.0, 63.5, 8.0)));
        assert_look_degrees(entities.look(50).unwrap(), 90.0, 0.0);
    }

    #[test]
    fn attach_and_detach() {
        let (mut conn, _rx) = joined();
        conn.apply(ClientboundEvent::EntityAttach {
            entity_id: 5,
            attached_to_id: 6,
        });
        assert_eq!(conn.entities().unwrap().vehicle(5), Some(6));
        conn.apply(ClientboundEvent::EntityAttach {
            entity_id: 5,
            attached_to_id: -1,
        });
        assert_eq!(conn.entities().unwrap().vehicle(5), None);
    }

    #[test]
    fn passenger_list_is_idempotent() {
        let (mut conn, _rx) = joined();
        let event = ClientboundEvent::EntitySetPassengers {
            entity_id: 50,
            passenger_ids: vec![5, 6],
        };
        conn.apply(event.clone());
        let once: Vec<_> = [5, 6, 50]
            .iter()
            .map(|&id| conn.entities().unwrap().snapshot(id))
            .collect();
        conn.apply(event);
        let twice: Vec<_> = [5, 6, 50]
            .iter()
            .map(|&id| conn.entities().unwrap().snapshot(id))
            .collect();
        assert_eq!(once, twice);
        assert_eq!(conn.entities().unwrap().passengers(50), vec![5, 6]);
        assert_eq!(conn.entities().unwrap().vehicle(6), Some(50));
    }

    #[test]
    fn passenger_list_overwrites() {
        let (mut conn, _rx) = joined();
        conn.apply(ClientboundEvent::EntitySetPassengers {
            entity_id: 50,
            passenger_ids: vec![5, 6],
        });
        conn.apply(ClientboundEvent::EntitySetPassengers {
            entity_id: 50,
            passenger_ids: vec![6],
        });
        let entities = conn.entities().unwrap();
        assert_eq!(entities.passengers(50), vec![6]);
        assert_eq!(entities.vehicle(5), None);
        assert_eq!(entities.vehicle(6), Some(50));
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_reports_and_stops_after_terminate() {
        let (mut conn, mut rx) = joined();
        conn.apply(confirm(Vec3d::new(10.0, 64.0, -3.0), 90.0, 0.0, 1));
        drain(&mut rx);

        tokio::time::sleep(Duration::from_millis(125)).await;
        let reports = drain(&mut rx);
        assert_eq!(reports.len(), 2);
        match &reports[0] {
            TransportCommand::Send(ServerboundEvent::PlayerPositionRotation {
                on_ground,
                position,
                yaw,
                ..
            }) => {
                assert!(*on_ground);
                assert_eq!(*position, Vec3d::new(10.0, 64.0, -3.0));
                assert!((yaw - 90.0).abs() < 1e-4);
            }
            other => panic!("unexpected {other:?}"),
        }

        conn.terminate("stop", None);
        assert!(!conn.is_ticking());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            drain(&mut rx),
            vec![TransportCommand::Disconnect {
                reason: "stop".into()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_follows_respawn() {
        let (mut conn, mut rx) = joined();
        conn.apply(confirm(Vec3d::new(0.0, 64.0, 0.0), 0.0, 0.0, 1));
        conn.apply(ClientboundEvent::Respawn {
            dimension: 1,
            game_mode: GameMode::Survival,
        });
        drain(&mut rx);

        // position unknown after respawn: ticks are skipped, not fatal
        tokio::time::sleep(Duration::from_millis(125)).await;
        assert!(drain(&mut rx).is_empty());
        assert!(conn.is_ticking());

        conn.apply(confirm(Vec3d::new(5.0, 80.0, 5.0), 0.0, 0.0, 2));
        drain(&mut rx);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(drain(&mut rx).len(), 1);
        conn.terminate("done", None);
    }
}
