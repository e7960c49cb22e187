//! Minecraft Java Edition protocol vocabulary: base types and the decoded
//! event enumerations exchanged with the transport.

pub mod clientbound;
pub mod error;
pub mod serverbound;
pub mod types;

pub use clientbound::ClientboundEvent;
pub use error::ProtoError;
pub use serverbound::ServerboundEvent;
