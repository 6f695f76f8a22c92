use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::engine::Engine;

/// Background task that periodically completes confirmed bookings whose
/// interval has fully elapsed.
pub async fn run_sweeper(engine: Arc<Engine>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let now = engine.now();
        let elapsed = match engine.collect_elapsed(now).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("completion sweep scan failed: {e}");
                continue;
            }
        };
        for id in elapsed {
            match engine.complete(id).await {
                Ok(()) => info!("completed elapsed booking {id}"),
                Err(e) => {
                    // May have been canceled or completed concurrently — that's fine
                    tracing::debug!("sweep skip {id}: {e}");
                }
            }
        }
    }
}
