use std::sync::Arc;

use parking_lot::Mutex;

use crate::sensor::{AnomalyState, Reading, Step, TelemetryGenerator};

/// A generator handle that can be moved between threads and tasks.
///
/// Every call takes the lock for exactly one step, so concurrent callers see
/// a single serialized walk.
#[derive(Clone)]
pub struct SharedGenerator {
    inner: Arc<Mutex<TelemetryGenerator>>,
}

impl SharedGenerator {
    pub fn new(generator: TelemetryGenerator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(generator)),
        }
    }

    pub fn step(&self) -> Step {
        self.inner.lock().step()
    }

    pub fn generate_reading(&self) -> Reading {
        self.inner.lock().generate_reading()
    }

    pub fn anomaly_state(&self) -> AnomalyState {
        self.inner.lock().anomaly_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn matches_unshared_stream() {
        let shared = SharedGenerator::new(TelemetryGenerator::new(11));
        let mut plain = TelemetryGenerator::new(11);
        for _ in 0..100 {
            assert_eq!(shared.step(), plain.step());
        }
    }

    #[test]
    fn serializes_concurrent_callers() {
        let shared = SharedGenerator::new(TelemetryGenerator::new(3));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let g = shared.clone();
                thread::spawn(move || (0..250).map(|_| g.generate_reading()).count())
            })
            .collect();
        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 1000);

        // 1000 serialized steps leave the walk where a single owner would be.
        let mut plain = TelemetryGenerator::new(3);
        for _ in 0..1000 {
            plain.step();
        }
        assert_eq!(shared.generate_reading(), plain.generate_reading());
    }
}
