//! Feed a recorded JSON-lines event stream through a [`Connection`].
//!
//! One `ClientboundEvent` per line, in its serde form, e.g.
//! `{"type":"join_game","entity_id":1,"game_mode":"survival","dimension":0}`.
//! Blank lines and lines starting with `#` are skipped.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use mc_bot_proto::ClientboundEvent;

use crate::connection::Connection;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: usize,
    /// Lines that failed to parse.
    pub skipped: usize,
}

/// Parse one line; `None` for blank and comment lines.
pub fn parse_line(line: &str) -> Option<Result<ClientboundEvent, serde_json::Error>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    Some(serde_json::from_str(line))
}

/// Apply every event from `reader`, logging notifications as they occur.
/// Stops early once the connection is no longer connected.
pub async fn replay<R>(connection: &mut Connection, reader: R) -> std::io::Result<ReplayStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = ReplayStats::default();
    let mut lines = reader.lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        match parse_line(&line) {
            None => continue,
            Some(Ok(event)) => {
                connection.apply(event);
                stats.applied += 1;
            }
            Some(Err(e)) => {
                warn!("Skipping line {line_no}: {e}");
                stats.skipped += 1;
            }
        }
        for event in connection.drain_events() {
            info!("{event}");
        }
        if !connection.connected() {
            break;
        }
    }
    Ok(stats)
}
