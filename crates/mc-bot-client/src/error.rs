use mc_bot_proto::clientbound::PositionElement;

/// Lifecycle misuse of a [`Connection`](crate::Connection).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    #[error("already connected")]
    AlreadyConnected,
}

/// The server sent something our state cannot account for. Always fatal:
/// the connection is terminated with this error as the reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DesyncError {
    #[error("relative teleport is not supported (relative: {flags:?})")]
    RelativeTeleport { flags: Vec<PositionElement> },

    #[error("vehicle move received while not riding anything")]
    VehicleMoveWithoutVehicle,

    #[error("{event} received before joining a world")]
    NoWorld { event: &'static str },
}
