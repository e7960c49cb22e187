//! Notifications for consumers of a [`Connection`](crate::Connection),
//! collected during dispatch and taken with `drain_events()`.

use std::fmt;

use mc_bot_proto::types::GameProfile;

#[derive(Debug, Clone, PartialEq)]
pub enum BotEvent {
    /// An account was added to the player list.
    PlayerJoined { profile: GameProfile },
    /// An account was removed from the player list.
    PlayerLeft { profile: GameProfile },
    /// The server updated the avatar's health, food, and saturation.
    VitalsChanged {
        health: f32,
        food: i32,
        saturation: f32,
    },
    /// The connection terminated. Emitted once per session.
    Disconnected { reason: String },
}

impl fmt::Display for BotEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotEvent::PlayerJoined { profile } => write!(f, "{} joined", profile.name),
            BotEvent::PlayerLeft { profile } => write!(f, "{} left", profile.name),
            BotEvent::VitalsChanged {
                health,
                food,
                saturation,
            } => write!(
                f,
                "health {health:.1}, food {food}, saturation {saturation:.1}"
            ),
            BotEvent::Disconnected { reason } => write!(f, "disconnected: {reason}"),
        }
    }
}
