//! Periodic removal of presentations whose expiry has passed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use deck_core::MutationService;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Runs `purge_expired` every `period` until the handle is aborted.
/// The first pass runs immediately.
pub fn spawn(service: Arc<MutationService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match service.purge_expired(Utc::now()).await {
                Ok(purged) => debug!(purged, "expiry sweep finished"),
                Err(err) => warn!(error = %err, "expiry sweep failed"),
            }
        }
    })
}
