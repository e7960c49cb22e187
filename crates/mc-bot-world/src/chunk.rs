//! Chunk column and sub-chunk data structures.

use std::collections::HashMap;

use mc_bot_proto::clientbound::{ColumnData, SectionData};
use mc_bot_proto::types::{BlockPos, ChunkPos};
use mc_bot_proto::ProtoError;

/// Sections per column: Y range [0, 255] = 256 blocks / 16 = 16.
pub const SECTION_COUNT: usize = 16;

/// Blocks per section (16³).
pub const SECTION_VOLUME: usize = 4096;

/// Palette length at which unused entries are dropped before growing further.
/// Keeps every index within `u16`.
pub const MAX_PALETTE: usize = 2 * SECTION_VOLUME;

/// Block state id of air.
pub const AIR: u32 = 0;

/// A 16x16x16 sub-chunk with a single block storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubChunk {
    /// Palette indices for each block, stored in XZY order: `(x*16 + z)*16 + y`.
    pub blocks: Box<[u16; SECTION_VOLUME]>,
    /// Palette of block state ids.
    pub palette: Vec<u32>,
}

impl SubChunk {
    /// Create a sub-chunk filled entirely with a single block.
    pub fn new_single(state: u32) -> Self {
        Self {
            blocks: Box::new([0; SECTION_VOLUME]),
            palette: vec![state],
        }
    }

    /// Build from decoded section data, rejecting indices outside the palette.
    pub fn from_section(data: &SectionData) -> Result<Self, ProtoError> {
        if data.blocks.len() != SECTION_VOLUME {
            return Err(ProtoError::SectionSize {
                expected: SECTION_VOLUME,
                got: data.blocks.len(),
            });
        }
        if let Some(&index) = data
            .blocks
            .iter()
            .find(|&&i| i as usize >= data.palette.len())
        {
            return Err(ProtoError::PaletteIndex {
                index,
                palette_len: data.palette.len(),
            });
        }
        let mut blocks = Box::new([0u16; SECTION_VOLUME]);
        blocks.copy_from_slice(&data.blocks);
        Ok(Self {
            blocks,
            palette: data.palette.clone(),
        })
    }

    /// Set a block at local coordinates within this sub-chunk.
    /// `x`, `y`, `z` must each be in `[0, 15]`.
    pub fn set_block(&mut self, x: usize, y: usize, z: usize, state: u32) {
        debug_assert!(x < 16 && y < 16 && z < 16);
        let palette_index = match self.palette.iter().position(|&id| id == state) {
            Some(idx) => idx,
            None => {
                if self.palette.len() >= MAX_PALETTE {
                    self.compact_palette();
                }
                self.palette.push(state);
                self.palette.len() - 1
            }
        };
        let block_index = (x * 16 + z) * 16 + y;
        self.blocks[block_index] = palette_index as u16;
    }

    /// Drop palette entries no block refers to, renumbering in first-use order.
    pub fn compact_palette(&mut self) {
        let mut remap: Vec<Option<u16>> = vec![None; self.palette.len()];
        let mut palette = Vec::new();
        for index in self.blocks.iter_mut() {
            let old = *index as usize;
            let new = match remap[old] {
                Some(new) => new,
                None => {
                    // at most SECTION_VOLUME distinct entries survive
                    let new = palette.len() as u16;
                    palette.push(self.palette[old]);
                    remap[old] = Some(new);
                    new
                }
            };
            *index = new;
        }
        self.palette = palette;
    }

    /// Get the state id of the block at local coordinates.
    pub fn get_block(&self, x: usize, y: usize, z: usize) -> u32 {
        let block_index = (x * 16 + z) * 16 + y;
        let palette_index = self.blocks[block_index] as usize;
        self.palette[palette_index]
    }
}

/// Last block action received for a position (note blocks, chests, pistons).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockData {
    pub block_id: i32,
    pub action_type: u8,
    pub action_param: u8,
}

/// A full chunk column (16x256x16).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkColumn {
    pub pos: ChunkPos,
    /// `None` sections are all air.
    pub sections: Vec<Option<SubChunk>>,
    /// Block actions keyed by absolute position.
    pub block_data: HashMap<BlockPos, BlockData>,
}

impl ChunkColumn {
    /// An all-air column.
    pub fn empty(pos: ChunkPos) -> Self {
        Self {
            pos,
            sections: vec![None; SECTION_COUNT],
            block_data: HashMap::new(),
        }
    }

    /// Build a column from decoded data. Sections beyond [`SECTION_COUNT`] are dropped.
    pub fn from_data(data: &ColumnData) -> Result<Self, ProtoError> {
        let mut column = Self::empty(ChunkPos::new(data.x, data.z));
        column.patch(data)?;
        Ok(column)
    }

    /// Overwrite the sections `data` carries, keeping the rest.
    pub fn patch(&mut self, data: &ColumnData) -> Result<(), ProtoError> {
        for (index, section) in data.sections.iter().enumerate().take(SECTION_COUNT) {
            if let Some(section) = section {
                self.sections[index] = Some(SubChunk::from_section(section)?);
            }
        }
        Ok(())
    }

    /// Block state at column-local `x`/`z` and absolute `y`. Out-of-range `y` reads as air.
    pub fn get_block(&self, x: usize, y: i32, z: usize) -> u32 {
        let Some((section, local_y)) = section_of(y) else {
            return AIR;
        };
        match &self.sections[section] {
            Some(sub) => sub.get_block(x, local_y, z),
            None => AIR,
        }
    }

    /// Set a block; returns `false` when `y` is outside the column.
    pub fn set_block(&mut self, x: usize, y: i32, z: usize, state: u32) -> bool {
        let Some((section, local_y)) = section_of(y) else {
            return false;
        };
        self.sections[section]
            .get_or_insert_with(|| SubChunk::new_single(AIR))
            .set_block(x, local_y, z, state);
        true
    }
}

fn section_of(y: i32) -> Option<(usize, usize)> {
    if !(0..(SECTION_COUNT as i32 * 16)).contains(&y) {
        return None;
    }
    Some(((y >> 4) as usize, (y & 15) as usize))
}
