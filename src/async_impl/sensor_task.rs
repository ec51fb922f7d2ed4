use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::EmitterSettings;
use crate::ipc::SharedGenerator;
use crate::metrics::EmissionMetrics;
use crate::sensor::Reading;

/// Emit one reading per tick until `count`/`duration` is reached or the
/// receiver is closed. Returns the number of readings delivered.
pub async fn sensor_task(
    generator: SharedGenerator,
    tx: mpsc::Sender<Reading>,
    settings: EmitterSettings,
    metrics: EmissionMetrics,
) -> u64 {
    let started = Instant::now();
    let mut interval_timer = interval(settings.interval.max(Duration::from_millis(1)));
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut emitted = 0u64;

    info!(interval = ?settings.interval, count = ?settings.count, "sensor task started");

    loop {
        if settings.count.is_some_and(|limit| emitted >= limit) {
            break;
        }
        interval_timer.tick().await;
        if settings.duration.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }

        let gen_start = Instant::now();
        let step = generator.step();
        metrics.record_generation(gen_start.elapsed());
        metrics.record_step(&step);

        if step.onset {
            info!(remaining = generator.anomaly_state().remaining_steps(), "anomaly episode started");
        }

        if tx.send(step.reading).await.is_err() {
            warn!("reading receiver closed, stopping sensor task");
            break;
        }
        emitted += 1;
    }

    info!(emitted, "sensor task finished");
    emitted
}
