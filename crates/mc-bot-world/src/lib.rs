//! Terrain model: chunk columns, block state, and weather for the current dimension.

pub mod chunk;
pub mod world;

pub use chunk::{BlockData, ChunkColumn, SubChunk};
pub use world::World;
