//! Session housekeeping
//!
//! Idle sessions are evicted by a background task; the accumulator itself
//! never expires anything.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use event_planner_agent::SessionStore;

/// Start a background task that periodically evicts idle sessions
///
/// Returns a shutdown sender; send `true` to stop the task. The task runs every
/// `interval` and removes sessions idle longer than `timeout`.
pub fn start_cleanup_task(
    store: Arc<dyn SessionStore>,
    timeout: Duration,
    interval: Duration,
) -> watch::Sender<bool> {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(interval);
        interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval_timer.tick() => {
                    let removed = store.evict_idle(timeout);
                    if removed > 0 {
                        tracing::info!(
                            removed,
                            remaining = store.count(),
                            "Session cleanup removed idle sessions"
                        );
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        tracing::info!("Session cleanup task shutting down");
                        break;
                    }
                }
            }
        }
    });

    shutdown_tx
}
