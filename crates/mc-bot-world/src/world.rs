//! Loaded terrain and ambient state for one dimension.

use std::collections::HashMap;

use tracing::{debug, warn};

use mc_bot_proto::clientbound::{BlockChangeRecord, ColumnData};
use mc_bot_proto::types::{BlockPos, ChunkPos};

use crate::chunk::{BlockData, ChunkColumn};

/// Terrain columns plus weather for the dimension the client is in.
///
/// Replaced wholesale on join/respawn; never reused across dimensions.
#[derive(Debug)]
pub struct World {
    pub dimension: i32,
    columns: HashMap<ChunkPos, ChunkColumn>,
    pub raining: bool,
    /// 0.0 - 1.0, from rain-strength notifications.
    pub rain_strength: f32,
    /// 0.0 - 1.0, from thunder-strength notifications.
    pub sky_darkness: f64,
}

impl World {
    pub fn new(dimension: i32) -> Self {
        Self {
            dimension,
            columns: HashMap::new(),
            raining: false,
            rain_strength: 0.0,
            sky_darkness: 0.0,
        }
    }

    /// Store or patch a column. Malformed sections leave the world unchanged.
    pub fn update_column(&mut self, data: &ColumnData) {
        let pos = ChunkPos::new(data.x, data.z);
        if data.full {
            match ChunkColumn::from_data(data) {
                Ok(column) => {
                    self.columns.insert(pos, column);
                }
                Err(e) => warn!("Dropping malformed column {pos}: {e}"),
            }
            return;
        }
        match self.columns.get_mut(&pos) {
            Some(column) => {
                // validate first so a bad section cannot leave a half-patched column
                let mut patched = column.clone();
                match patched.patch(data) {
                    Ok(()) => *column = patched,
                    Err(e) => warn!("Dropping malformed column patch {pos}: {e}"),
                }
            }
            None => debug!("Partial column {pos} for unloaded column, ignoring"),
        }
    }

    /// Returns the removed column, if it was loaded.
    pub fn unload_column(&mut self, x: i32, z: i32) -> Option<ChunkColumn> {
        self.columns.remove(&ChunkPos::new(x, z))
    }

    pub fn column(&self, pos: ChunkPos) -> Option<&ChunkColumn> {
        self.columns.get(&pos)
    }

    pub fn is_loaded(&self, pos: ChunkPos) -> bool {
        self.columns.contains_key(&pos)
    }

    pub fn loaded_columns(&self) -> impl Iterator<Item = &ChunkPos> {
        self.columns.keys()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Block state at `pos`, or `None` when its column is not loaded.
    pub fn get_block(&self, pos: BlockPos) -> Option<u32> {
        let column = self.columns.get(&pos.chunk_pos())?;
        let (x, y, z) = pos.column_local();
        Some(column.get_block(x, y, z))
    }

    /// Apply a block change. Unloaded columns are never created; returns whether it applied.
    pub fn set_block(&mut self, record: &BlockChangeRecord) -> bool {
        let Some(column) = self.columns.get_mut(&record.position.chunk_pos()) else {
            debug!("Block change at {} in unloaded column", record.position);
            return false;
        };
        let (x, y, z) = record.position.column_local();
        column.set_block(x, y, z, record.block)
    }

    /// Record a block action on a loaded column.
    pub fn set_block_data(&mut self, pos: BlockPos, data: BlockData) -> bool {
        match self.columns.get_mut(&pos.chunk_pos()) {
            Some(column) => {
                column.block_data.insert(pos, data);
                true
            }
            None => false,
        }
    }

    pub fn block_data(&self, pos: BlockPos) -> Option<&BlockData> {
        self.columns.get(&pos.chunk_pos())?.block_data.get(&pos)
    }
}
