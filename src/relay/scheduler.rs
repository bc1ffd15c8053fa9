//! Periodic trigger for the dispatcher.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::dispatcher::{CycleReport, Relay};
use crate::config::MAX_SCHEDULER_INTERVAL_SECS;

/// Default tick interval in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Background poller.
///
/// Each tick runs one round-robin cycle for the current minute. Ticks are
/// awaited in sequence, so cycles started by the scheduler never overlap.
pub struct Scheduler {
    relay: Arc<Relay>,
    interval: Duration,
}

impl Scheduler {
    /// Create a scheduler with the default interval.
    pub fn new(relay: Arc<Relay>) -> Self {
        Self::with_interval(relay, DEFAULT_INTERVAL_SECS)
    }

    /// Create a scheduler with a custom interval, clamped to one tick per
    /// second at most and one per minute at least.
    pub fn with_interval(relay: Arc<Relay>, interval_secs: u64) -> Self {
        Self {
            relay,
            interval: Duration::from_secs(interval_secs.clamp(1, MAX_SCHEDULER_INTERVAL_SECS)),
        }
    }

    /// Tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the scheduler loop forever.
    pub async fn run(&self) {
        info!(
            "Scheduler started (interval: {} seconds, {} sources)",
            self.interval.as_secs(),
            self.relay.sources().len()
        );

        let mut timer = interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            timer.tick().await;
            self.tick(Utc::now()).await;
        }
    }

    /// Run the cycle due at `now`. Errors and panics are logged, never
    /// propagated, so one bad cycle does not stop the loop.
    pub async fn tick(&self, now: DateTime<Utc>) -> Option<CycleReport> {
        debug!("Scheduler tick at {}", now);
        let relay = self.relay.clone();
        match tokio::spawn(async move { relay.run_cycle(now).await }).await {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                warn!("Scheduled cycle failed: {}", e);
                None
            }
            Err(e) => {
                error!("Scheduled cycle aborted: {}", e);
                None
            }
        }
    }
}
