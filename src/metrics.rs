//! Metrics module - Generation latency and anomaly episode statistics

use std::sync::Arc;
use std::time::Duration;

use hdrhistogram::{CreationError, Histogram};
use parking_lot::Mutex;

use crate::sensor::{Regime, Step};

// ============================================================================
// EMISSION METRICS - Thread-safe, shared between emitter and reporter
// ============================================================================

#[derive(Clone)]
pub struct EmissionMetrics {
    generation_hist: Arc<Mutex<Histogram<u64>>>,
    episodes: Arc<Mutex<EpisodeTracker>>,
}

#[derive(Default)]
struct EpisodeTracker {
    total_readings: u64,
    anomalous_readings: u64,
    episodes: u64,
    current_run: u64,
    longest_run: u64,
}

impl EmissionMetrics {
    pub fn new() -> Result<Self, CreationError> {
        Ok(Self {
            generation_hist: Arc::new(Mutex::new(Histogram::new(3)?)),
            episodes: Arc::new(Mutex::new(EpisodeTracker::default())),
        })
    }

    pub fn record_generation(&self, duration: Duration) {
        self.generation_hist.lock().record(duration.as_nanos() as u64).ok();
    }

    /// Feed each emitted step, in order.
    ///
    /// Episodes are counted from the generator's onset flag, so an episode
    /// starting right after another one ends is counted separately.
    pub fn record_step(&self, step: &Step) {
        let mut t = self.episodes.lock();
        t.total_readings += 1;
        match step.regime {
            Regime::Anomalous => {
                if step.onset {
                    t.episodes += 1;
                    t.current_run = 0;
                }
                t.current_run += 1;
                t.anomalous_readings += 1;
                t.longest_run = t.longest_run.max(t.current_run);
            }
            Regime::Normal => t.current_run = 0,
        }
    }

    pub fn report(&self) -> MetricsReport {
        let gen = self.generation_hist.lock();
        let t = self.episodes.lock();

        MetricsReport {
            generation_p50: Duration::from_nanos(gen.value_at_quantile(0.5)),
            generation_p99: Duration::from_nanos(gen.value_at_quantile(0.99)),
            total_readings: t.total_readings,
            anomalous_readings: t.anomalous_readings,
            anomaly_episodes: t.episodes,
            longest_episode: t.longest_run,
        }
    }
}

// ============================================================================
// METRICS REPORT - Summary statistics
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsReport {
    pub generation_p50: Duration,
    pub generation_p99: Duration,
    pub total_readings: u64,
    pub anomalous_readings: u64,
    pub anomaly_episodes: u64,
    pub longest_episode: u64,
}

impl MetricsReport {
    pub fn anomalous_fraction(&self) -> f64 {
        if self.total_readings == 0 {
            0.0
        } else {
            self.anomalous_readings as f64 / self.total_readings as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::{AnomalySchedule, AnomalyState, SeedBand, TelemetryGenerator};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn counts_episodes_from_onsets() {
        let metrics = EmissionMetrics::new().unwrap();
        let schedule = AnomalySchedule::new(0.0, 5, 10).unwrap();
        let mut gen = TelemetryGenerator::from_rng(StdRng::seed_from_u64(17), SeedBand::Normal, schedule);

        metrics.record_step(&gen.step());
        gen.set_anomaly_state(AnomalyState::with_remaining(3));
        for _ in 0..3 {
            metrics.record_step(&gen.step());
        }
        metrics.record_step(&gen.step());
        gen.set_anomaly_state(AnomalyState::with_remaining(2));
        for _ in 0..2 {
            metrics.record_step(&gen.step());
        }
        metrics.record_step(&gen.step());

        let report = metrics.report();
        assert_eq!(report.total_readings, 8);
        assert_eq!(report.anomalous_readings, 5);
        assert_eq!(report.anomaly_episodes, 2);
        assert_eq!(report.longest_episode, 3);
        assert!((report.anomalous_fraction() - 0.625).abs() < 1e-12);
    }

    #[test]
    fn back_to_back_episodes_are_counted_separately() {
        let metrics = EmissionMetrics::new().unwrap();
        let schedule = AnomalySchedule::new(1.0, 5, 5).unwrap();
        let mut gen = TelemetryGenerator::from_rng(StdRng::seed_from_u64(1), SeedBand::Normal, schedule);
        for _ in 0..20 {
            metrics.record_step(&gen.step());
        }
        let report = metrics.report();
        assert_eq!(report.anomalous_readings, 20);
        assert_eq!(report.anomaly_episodes, 4);
        assert_eq!(report.longest_episode, 5);
    }

    #[test]
    fn longest_episode_respects_duration_bound() {
        let metrics = EmissionMetrics::new().unwrap();
        let mut gen = TelemetryGenerator::new(2024);
        let mut onsets = 0u64;
        for _ in 0..20_000 {
            let step = gen.step();
            onsets += step.onset as u64;
            metrics.record_step(&step);
        }
        let report = metrics.report();
        assert_eq!(report.anomaly_episodes, onsets);
        assert!(report.longest_episode <= 10, "longest {}", report.longest_episode);
        assert!(report.longest_episode >= 5);
    }

    #[test]
    fn empty_report_is_zeroed() {
        let report = EmissionMetrics::new().unwrap().report();
        assert_eq!(report.total_readings, 0);
        assert_eq!(report.anomalous_fraction(), 0.0);
        assert_eq!(report.generation_p99, Duration::ZERO);
    }

    #[test]
    fn clones_share_state() {
        let metrics = EmissionMetrics::new().unwrap();
        let other = metrics.clone();
        other.record_generation(Duration::from_micros(3));
        other.record_step(&TelemetryGenerator::new(1).step());
        assert_eq!(metrics.report().total_readings, 1);
        assert!(metrics.report().generation_p50 >= Duration::from_micros(2));
    }
}
