use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::EmitterSettings;
use crate::ipc::ReadingSender;
use crate::metrics::EmissionMetrics;
use crate::sensor::{Regime, TelemetryGenerator};

pub struct EmitterStats {
    pub emitted: AtomicU64,
    pub anomalous: AtomicU64,
    pub shutdown: AtomicBool,
}

impl EmitterStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            emitted: AtomicU64::new(0),
            anomalous: AtomicU64::new(0),
            shutdown: AtomicBool::new(false),
        })
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

/// Run the generator on its own thread, sending one reading per interval.
///
/// The loop ends on shutdown, when `count` or `duration` is reached, or when
/// the receiving side has gone away. The sender is dropped on exit.
pub fn spawn_sensor_thread(
    mut generator: TelemetryGenerator,
    tx: ReadingSender,
    settings: EmitterSettings,
    metrics: EmissionMetrics,
) -> (thread::JoinHandle<()>, Arc<EmitterStats>) {
    let stats = EmitterStats::new();
    let stats_clone = stats.clone();

    let handle = thread::spawn(move || {
        let started = Instant::now();
        info!(interval = ?settings.interval, count = ?settings.count, "sensor thread started");

        loop {
            if stats_clone.shutdown.load(Ordering::Relaxed) {
                info!("sensor thread shutting down");
                break;
            }
            let emitted = stats_clone.emitted.load(Ordering::Relaxed);
            if settings.count.is_some_and(|limit| emitted >= limit) {
                break;
            }
            if settings.duration.is_some_and(|limit| started.elapsed() >= limit) {
                break;
            }

            let cycle_start = Instant::now();

            let gen_start = Instant::now();
            let step = generator.step();
            metrics.record_generation(gen_start.elapsed());
            metrics.record_step(&step);

            if step.onset {
                info!(
                    remaining = generator.anomaly_state().remaining_steps(),
                    "anomaly episode started"
                );
            }
            if step.regime == Regime::Anomalous {
                stats_clone.anomalous.fetch_add(1, Ordering::Relaxed);
            }

            if tx.send(step.reading).is_err() {
                warn!("reading channel closed, stopping sensor thread");
                break;
            }
            stats_clone.emitted.fetch_add(1, Ordering::Relaxed);

            let elapsed = cycle_start.elapsed();
            if elapsed < settings.interval {
                thread::sleep(settings.interval - elapsed);
            }
        }

        info!(
            emitted = stats_clone.emitted.load(Ordering::Relaxed),
            anomalous = stats_clone.anomalous.load(Ordering::Relaxed),
            "sensor thread finished"
        );
    });

    (handle, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::reading_channel;
    use crate::sensor::{AnomalySchedule, SeedBand};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn fast(count: Option<u64>) -> EmitterSettings {
        EmitterSettings {
            interval: Duration::from_millis(1),
            count,
            duration: None,
        }
    }

    #[test]
    fn emits_exact_count_then_disconnects() {
        let (tx, rx) = reading_channel(64);
        let metrics = EmissionMetrics::new().unwrap();
        let (handle, stats) =
            spawn_sensor_thread(TelemetryGenerator::new(42), tx, fast(Some(20)), metrics.clone());
        let received: Vec<_> = rx.iter().collect();
        handle.join().unwrap();
        assert_eq!(received.len(), 20);
        assert_eq!(stats.emitted.load(Ordering::Relaxed), 20);
        assert_eq!(metrics.report().total_readings, 20);
    }

    #[test]
    fn counts_back_to_back_episodes() {
        let (tx, rx) = reading_channel(64);
        let metrics = EmissionMetrics::new().unwrap();
        let schedule = AnomalySchedule::new(1.0, 5, 5).unwrap();
        let generator =
            TelemetryGenerator::from_rng(StdRng::seed_from_u64(4), SeedBand::Normal, schedule);
        let (handle, stats) = spawn_sensor_thread(generator, tx, fast(Some(20)), metrics.clone());
        assert_eq!(rx.iter().count(), 20);
        handle.join().unwrap();

        let report = metrics.report();
        assert_eq!(stats.anomalous.load(Ordering::Relaxed), 20);
        assert_eq!(report.anomaly_episodes, 4);
        assert_eq!(report.longest_episode, 5);
    }

    #[test]
    fn stream_matches_direct_generation() {
        let (tx, rx) = reading_channel(64);
        let metrics = EmissionMetrics::new().unwrap();
        let (handle, _) =
            spawn_sensor_thread(TelemetryGenerator::new(9), tx, fast(Some(30)), metrics);
        let received: Vec<_> = rx.iter().collect();
        handle.join().unwrap();

        let mut direct = TelemetryGenerator::new(9);
        for r in received {
            assert_eq!(r, direct.generate_reading());
        }
    }

    #[test]
    fn shutdown_flag_stops_unbounded_loop() {
        let (tx, rx) = reading_channel(1024);
        let metrics = EmissionMetrics::new().unwrap();
        let (handle, stats) =
            spawn_sensor_thread(TelemetryGenerator::new(1), tx, fast(None), metrics);
        rx.recv_timeout(Duration::from_secs(1)).unwrap();
        stats.request_shutdown();
        let drain = std::thread::spawn(move || rx.iter().count());
        handle.join().unwrap();
        drain.join().unwrap();
        assert!(stats.emitted.load(Ordering::Relaxed) >= 1);
    }

    #[test]
    fn stops_when_receiver_dropped() {
        let (tx, rx) = reading_channel(1);
        drop(rx);
        let metrics = EmissionMetrics::new().unwrap();
        let (handle, stats) =
            spawn_sensor_thread(TelemetryGenerator::new(1), tx, fast(None), metrics);
        handle.join().unwrap();
        assert_eq!(stats.emitted.load(Ordering::Relaxed), 0);
    }
}
