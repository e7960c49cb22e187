//! Boundary to the protocol session that encodes and sends outbound events.

use tokio::sync::mpsc;
use tracing::debug;

use mc_bot_proto::ServerboundEvent;

/// Outbound half of a protocol session.
///
/// Called from both the dispatch path and the position ticker, so
/// implementations must accept concurrent calls. Neither method may block.
pub trait Transport: Send + Sync {
    fn send(&self, event: ServerboundEvent);

    /// Close the session. Later sends are dropped.
    fn disconnect(&self, reason: &str);

    /// Human-readable peer address, for logging.
    fn remote_address(&self) -> &str;
}

/// What a [`ChannelTransport`] forwards to its session task.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    Send(ServerboundEvent),
    Disconnect { reason: String },
}

/// Transport that queues commands on an unbounded channel. The receiving
/// end owns the actual socket (or, in tests, just records the traffic).
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    address: String,
    tx: mpsc::UnboundedSender<TransportCommand>,
}

impl ChannelTransport {
    pub fn new(address: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<TransportCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                address: address.into(),
                tx,
            },
            rx,
        )
    }
}

impl Transport for ChannelTransport {
    fn send(&self, event: ServerboundEvent) {
        let name = event.name();
        if self.tx.send(TransportCommand::Send(event)).is_err() {
            debug!("Session for {} closed, dropping {name}", self.address);
        }
    }

    fn disconnect(&self, reason: &str) {
        let _ = self.tx.send(TransportCommand::Disconnect {
            reason: reason.to_string(),
        });
    }

    fn remote_address(&self) -> &str {
        &self.address
    }
}
