//! Client → Server events, handed to the transport for encoding.

use serde::{Deserialize, Serialize};

use crate::types::Vec3d;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerboundEvent {
    /// Acknowledges a server position correction; echoes its id.
    TeleportConfirm { teleport_id: i32 },
    /// Periodic position/orientation report. Angles in degrees.
    PlayerPositionRotation {
        on_ground: bool,
        position: Vec3d,
        yaw: f32,
        pitch: f32,
    },
    Chat { message: String },
}

impl ServerboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerboundEvent::TeleportConfirm { .. } => "TeleportConfirm",
            ServerboundEvent::PlayerPositionRotation { .. } => "PlayerPositionRotation",
            ServerboundEvent::Chat { .. } => "Chat",
        }
    }
}
