//! Periodic reaper that drops sessions abandoned past their deadline.
//!
//! The mission timer stays advisory for gameplay; the sweeper only bounds
//! the memory held by sessions nobody came back to.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::state::{SharedState, now_ms};

/// How often the sweeper scans the session registry.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Spawn the background sweeper for the application state.
pub fn spawn(state: SharedState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            let grace_ms = state.config().sweep_grace_ms();
            let expired = state.expired_sessions(now_ms(), grace_ms).await;
            for code in expired {
                info!(%code, "sweeping abandoned session");
                state.remove_session(&code).await;
            }
        }
    })
}
