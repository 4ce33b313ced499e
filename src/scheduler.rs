// src/scheduler.rs
use tokio::task::JoinHandle;

use crate::api::{collect_and_store, AppState};

/// Spawn the periodic collection task. The first tick of a tokio interval
/// fires immediately; it is consumed up front so startup does not trigger a
/// surprise collection run.
pub fn spawn_collect_scheduler(state: AppState, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            tracing::info!("scheduled collection triggered");
            match collect_and_store(&state).await {
                Ok(0) => tracing::info!("scheduled collection found nothing new"),
                Ok(n) => tracing::info!(count = n, "scheduled collection stored"),
                Err(e) => tracing::warn!(error = %e, "scheduled collection failed to persist"),
            }
        }
    })
}
