//! Client connection: drives the game state from decoded server events and
//! reports the avatar's position back on a fixed tick.

pub mod config;
pub mod connection;
pub mod error;
pub mod events;
pub mod replay;
pub mod ticker;
pub mod transport;

pub use connection::Connection;
pub use error::{ConnectionError, DesyncError};
pub use events::BotEvent;
pub use transport::{ChannelTransport, Transport, TransportCommand};
