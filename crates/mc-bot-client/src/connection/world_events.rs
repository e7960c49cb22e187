use super::*;

use mc_bot_proto::clientbound::GameStateChange;
use mc_bot_proto::types::BlockPos;
use mc_bot_world::BlockData;

impl Connection {
    pub(super) fn handle_block_value(
        &mut self,
        position: BlockPos,
        block_id: i32,
        action_type: u8,
        action_param: u8,
    ) -> Result<(), DesyncError> {
        let data = BlockData {
            block_id,
            action_type,
            action_param,
        };
        if !self.terrain_mut("BlockValue")?.set_block_data(position, data) {
            debug!("Block value at {position} in unloaded column");
        }
        Ok(())
    }

    pub(super) fn handle_notify(&mut self, change: GameStateChange) -> Result<(), DesyncError> {
        match change {
            GameStateChange::BeginRain => self.terrain_mut("NotifyClient")?.raining = true,
            GameStateChange::EndRain => self.terrain_mut("NotifyClient")?.raining = false,
            GameStateChange::RainStrength { strength } => {
                self.terrain_mut("NotifyClient")?.rain_strength = strength;
            }
            GameStateChange::ThunderStrength { strength } => {
                self.terrain_mut("NotifyClient")?.sky_darkness = strength as f64;
            }
            GameStateChange::ChangeGameMode { mode } => {
                if let Some(profile) = &self.profile {
                    let (entry, _) = self.player_list.get_or_insert(profile);
                    entry.game_mode = Some(mode);
                }
                info!("Game mode changed to {mode}");
            }
            GameStateChange::Other { reason, value } => {
                debug!("Unhandled game state change {reason} ({value})");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use mc_bot_proto::clientbound::{BlockChangeRecord, ColumnData, SectionData};
    use mc_bot_proto::types::ChunkPos;

    fn column(x: i32, z: i32, block: u32) -> ColumnData {
        ColumnData {
            x,
            z,
            full: true,
            sections: vec![Some(SectionData {
                palette: vec![block],
                blocks: vec![0; 4096],
            })],
        }
    }

    fn notify(change: GameStateChange) -> ClientboundEvent {
        ClientboundEvent::NotifyClient { change }
    }

    #[test]
    fn load_change_unload() {
        let (mut conn, _rx) = joined();
        conn.apply(ClientboundEvent::ChunkData {
            column: column(0, 0, 1),
        });
        let pos = BlockPos::new(3, 5, 4);
        assert_eq!(conn.world().unwrap().get_block(pos), Some(1));

        conn.apply(ClientboundEvent::BlockChange {
            record: BlockChangeRecord {
                position: pos,
                block: 9,
            },
        });
        conn.apply(ClientboundEvent::MultiBlockChange {
            records: vec![
                BlockChangeRecord {
                    position: BlockPos::new(0, 0, 0),
                    block: 2,
                },
                BlockChangeRecord {
                    position: BlockPos::new(15, 100, 15),
                    block: 3,
                },
            ],
        });
        let world = conn.world().unwrap();
        assert_eq!(world.get_block(pos), Some(9));
        assert_eq!(world.get_block(BlockPos::new(0, 0, 0)), Some(2));
        assert_eq!(world.get_block(BlockPos::new(15, 100, 15)), Some(3));

        conn.apply(ClientboundEvent::UnloadChunk { x: 0, z: 0 });
        assert_eq!(conn.world().unwrap().get_block(pos), None);
    }

    #[test]
    fn block_change_in_unloaded_column_is_noop() {
        let (mut conn, _rx) = joined();
        conn.apply(ClientboundEvent::BlockChange {
            record: BlockChangeRecord {
                position: BlockPos::new(40, 10, 40),
                block: 5,
            },
        });
        let world = conn.world().unwrap();
        assert!(!world.is_loaded(ChunkPos::new(2, 2)));
        assert_eq!(world.column_count(), 0);
        assert!(conn.connected());
    }

    #[test]
    fn block_values_need_loaded_column() {
        let (mut conn, _rx) = joined();
        let pos = BlockPos::new(1, 64, 1);
        let value = ClientboundEvent::BlockValue {
            position: pos,
            block_id: 25,
            action_type: 0,
            action_param: 12,
        };
        conn.apply(value.clone());
        assert!(conn.world().unwrap().block_data(pos).is_none());

        conn.apply(ClientboundEvent::ChunkData {
            column: column(0, 0, 1),
        });
        conn.apply(value);
        assert_eq!(
            conn.world().unwrap().block_data(pos),
            Some(&BlockData {
                block_id: 25,
                action_type: 0,
                action_param: 12
            })
        );
    }

    #[test]
    fn weather_notifications() {
        let (mut conn, _rx) = joined();
        conn.apply(notify(GameStateChange::BeginRain));
        conn.apply(notify(GameStateChange::RainStrength { strength: 0.5 }));
        conn.apply(notify(GameStateChange::ThunderStrength { strength: 0.75 }));
        let world = conn.world().unwrap();
        assert!(world.raining);
        assert_eq!(world.rain_strength, 0.5);
        assert_eq!(world.sky_darkness, 0.75);

        conn.apply(notify(GameStateChange::EndRain));
        conn.apply(notify(GameStateChange::Other {
            reason: 10,
            value: 0.0,
        }));
        assert!(!conn.world().unwrap().raining);
        assert!(conn.connected());
    }

    #[test]
    fn game_mode_notification_updates_own_entry() {
        let (mut conn, _rx) = joined();
        conn.apply(notify(GameStateChange::ChangeGameMode {
            mode: GameMode::Creative,
        }));
        assert_eq!(conn.game_mode(), Some(GameMode::Creative));
        assert_eq!(
            conn.player_list().get(own_profile().id).unwrap().game_mode,
            Some(GameMode::Creative)
        );
    }

    #[test]
    fn new_world_after_respawn_has_no_columns() {
        let (mut conn, _rx) = joined();
        conn.apply(ClientboundEvent::ChunkData {
            column: column(0, 0, 1),
        });
        conn.apply(ClientboundEvent::Respawn {
            dimension: 0,
            game_mode: GameMode::Survival,
        });
        assert_eq!(conn.world().unwrap().column_count(), 0);
    }
}
