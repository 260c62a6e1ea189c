use std::sync::Arc;
use std::time::Duration;

use seatlock_core::SeatRegistry;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Spawn the background task that releases expired seat locks every
/// `interval` until `shutdown` is cancelled.
pub fn spawn_sweep_worker(
    registry: Arc<SeatRegistry>,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_sweep_worker(registry, interval, shutdown))
}

pub async fn run_sweep_worker(
    registry: Arc<SeatRegistry>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Sweep worker started, interval {:?}", interval);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let released = registry.sweep_expired_locks();
                if released > 0 {
                    info!("Sweep released {} expired seat locks", released);
                } else {
                    debug!("Sweep found no expired seat locks");
                }
            }
        }
    }

    info!("Sweep worker stopped");
}
