//! The periodic maintenance task, SPEC_FULL §4.F. Runs independently of datagram
//! arrival; its wait is raced against shutdown (see `server.rs`) so a slow sweep
//! interval never delays process exit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use relay_core::Registry;
use tokio::time::interval;
use tracing::debug;

/// Runs sweeps forever, one every `sweep_interval`. Intended to be raced against a
/// shutdown signal in a `tokio::select!` by the caller, since `interval.tick()` never
/// returns `None`.
pub async fn run(registry: Arc<Registry>, sweep_interval: Duration) {
    let mut ticker = interval(sweep_interval);
    loop {
        ticker.tick().await;
        let now = Instant::now();
        let report = registry.sweep(now);
        if report.clients_reaped > 0 || report.groups_reaped > 0 {
            debug!(
                clients_reaped = report.clients_reaped,
                groups_reaped = report.groups_reaped,
                "sweep pass complete"
            );
        }
    }
}
