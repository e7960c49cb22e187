//! Protocol-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("invalid game mode id: {0}")]
    InvalidGameMode(u8),

    #[error("invalid UUID: {0:?}")]
    InvalidUuid(String),

    #[error("section data has {got} block indices, expected {expected}")]
    SectionSize { expected: usize, got: usize },

    #[error("block index {index} out of range for palette of {palette_len}")]
    PaletteIndex { index: u16, palette_len: usize },
}
