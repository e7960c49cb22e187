//! Periodic position report.
//!
//! The ticker never touches the connection's models. It reads the latest
//! [`AvatarSnapshot`] published by the connection through a watch channel
//! and sends one report per tick while both position and look are known.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

use mc_bot_game::components::Look;
use mc_bot_proto::types::Vec3d;
use mc_bot_proto::ServerboundEvent;

use crate::transport::Transport;

/// Protocol tick period.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

/// What the ticker needs to know about the avatar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AvatarSnapshot {
    pub position: Option<Vec3d>,
    pub look: Option<Look>,
    pub on_ground: Option<bool>,
}

impl AvatarSnapshot {
    /// The report for this tick, or `None` while position or look is unknown.
    pub fn report(&self) -> Option<ServerboundEvent> {
        let (position, look) = (self.position?, self.look?);
        Some(ServerboundEvent::PlayerPositionRotation {
            // no physics yet, so an unknown ground state is reported as grounded
            on_ground: self.on_ground.unwrap_or(true),
            position,
            yaw: look.yaw_degrees() as f32,
            pitch: look.pitch_degrees() as f32,
        })
    }
}

#[derive(Default)]
pub struct PositionTicker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PositionTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Spawn the tick task on the current tokio runtime. Starting a running
    /// ticker is a no-op; returns whether a task was spawned.
    pub fn start(
        &mut self,
        transport: Arc<dyn Transport>,
        snapshot: watch::Receiver<AvatarSnapshot>,
        period: Duration,
    ) -> bool {
        if self.is_running() {
            return false;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("No tokio runtime, position ticker not started");
            return false;
        };
        // a fresh flag per run, so a task aborted late can never see `true` again
        let running = Arc::new(AtomicBool::new(true));
        self.running = running.clone();
        self.handle = Some(runtime.spawn(run(transport, snapshot, period, running)));
        debug!("Position ticker started ({}ms)", period.as_millis());
        true
    }

    /// Stop the task. Safe to call when never started.
    pub fn stop(&mut self) {
        let was_running = self.running.swap(false, Ordering::AcqRel);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        if was_running {
            debug!("Position ticker stopped");
        }
    }
}

impl Drop for PositionTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    transport: Arc<dyn Transport>,
    snapshot: watch::Receiver<AvatarSnapshot>,
    period: Duration,
    running: Arc<AtomicBool>,
) {
    let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        if !running.load(Ordering::Acquire) {
            break;
        }
        let current = *snapshot.borrow();
        match current.report() {
            Some(report) => transport.send(report),
            None => trace!("Position unknown, skipping tick"),
        }
    }
}
