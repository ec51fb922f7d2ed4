use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::anomaly::{AnomalySchedule, AnomalyState, Regime};
use super::channel::{Band, Channel};
use super::reading::Reading;
use crate::error::ConfigError;

/// Band each channel is seeded from at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedBand {
    #[default]
    Normal,
    Anomalous,
}

impl TryFrom<u8> for SeedBand {
    type Error = ConfigError;

    fn try_from(target: u8) -> Result<Self, Self::Error> {
        match target {
            0 => Ok(SeedBand::Normal),
            1 => Ok(SeedBand::Anomalous),
            other => Err(ConfigError::InvalidTarget(other)),
        }
    }
}

/// Output of a single generation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub reading: Reading,
    pub regime: Regime,
    /// True when this step started a new anomaly episode.
    pub onset: bool,
}

/// Bounded random walk over the five channels with injected anomaly episodes.
///
/// Owns its PRNG, so two generators built from the same seed produce the same
/// stream. Not meant to be shared between threads without external locking;
/// see [`crate::ipc::shared::SharedGenerator`].
pub struct TelemetryGenerator<R = StdRng> {
    rng: R,
    values: [f64; Channel::COUNT],
    state: AnomalyState,
    schedule: AnomalySchedule,
    // Set when an episode is forced from `Normal`; the next step is its onset.
    forced_onset: bool,
}

impl TelemetryGenerator<StdRng> {
    pub fn new(seed: u64) -> Self {
        Self::from_rng(
            StdRng::seed_from_u64(seed),
            SeedBand::Normal,
            AnomalySchedule::default(),
        )
    }

    pub fn from_entropy() -> Self {
        Self::from_rng(
            StdRng::from_entropy(),
            SeedBand::Normal,
            AnomalySchedule::default(),
        )
    }

    /// Seeded when `seed` is given, entropy-backed otherwise.
    pub fn with_options(seed: Option<u64>, band: SeedBand, schedule: AnomalySchedule) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::from_rng(rng, band, schedule)
    }
}

impl<R: Rng> TelemetryGenerator<R> {
    pub fn from_rng(mut rng: R, band: SeedBand, schedule: AnomalySchedule) -> Self {
        let values = Channel::ALL.map(|ch| seed_band(ch, band).sample(&mut rng));
        Self {
            rng,
            values,
            state: AnomalyState::Normal,
            schedule,
            forced_onset: false,
        }
    }

    /// Produce one reading and advance the walk by one step.
    pub fn generate_reading(&mut self) -> Reading {
        self.step().reading
    }

    pub fn step(&mut self) -> Step {
        let before = self.state;
        self.state = self.schedule.begin_step(self.state, &mut self.rng);
        let onset = std::mem::take(&mut self.forced_onset)
            || (!before.in_anomaly_mode() && self.state.in_anomaly_mode());
        if onset {
            debug!(steps = self.state.remaining_steps(), "anomaly episode started");
        }

        let regime = if self.state.in_anomaly_mode() {
            Regime::Anomalous
        } else {
            Regime::Normal
        };

        for ch in Channel::ALL {
            let band = active_band(ch, regime);
            let slot = &mut self.values[ch.index()];
            *slot = band.adjust(*slot, &mut self.rng);
        }

        if regime == Regime::Anomalous {
            self.state = self.state.consume();
            if !self.state.in_anomaly_mode() {
                debug!("anomaly episode finished");
            }
        }

        Step {
            reading: Reading::from_raw(self.values),
            regime,
            onset,
        }
    }

    pub fn anomaly_state(&self) -> AnomalyState {
        self.state
    }

    /// Override the state machine, e.g. to force an episode.
    ///
    /// Forcing an episode from `Normal` makes the next step its onset.
    pub fn set_anomaly_state(&mut self, state: AnomalyState) {
        self.forced_onset =
            (self.forced_onset || !self.state.in_anomaly_mode()) && state.in_anomaly_mode();
        self.state = state;
    }

    pub fn schedule(&self) -> &AnomalySchedule {
        &self.schedule
    }

    /// Unrounded current value of a channel.
    pub fn current_value(&self, channel: Channel) -> f64 {
        self.values[channel.index()]
    }
}

fn seed_band(channel: Channel, band: SeedBand) -> Band {
    match band {
        SeedBand::Normal => channel.spec().normal,
        SeedBand::Anomalous => channel.spec().anomalous,
    }
}

pub fn active_band(channel: Channel, regime: Regime) -> Band {
    match regime {
        Regime::Normal => channel.spec().normal,
        Regime::Anomalous => channel.spec().anomalous,
    }
}
