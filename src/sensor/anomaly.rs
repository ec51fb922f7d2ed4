use std::num::NonZeroU32;

use rand::Rng;

use crate::error::ConfigError;

/// Anomaly state machine for one generator instance.
///
/// `Anomaly { remaining }` counts the anomalous readings still to be produced,
/// including the one about to be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnomalyState {
    #[default]
    Normal,
    Anomaly { remaining: NonZeroU32 },
}

impl AnomalyState {
    /// `Anomaly` with `remaining` steps, or `Normal` when `remaining` is zero.
    pub fn with_remaining(remaining: u32) -> Self {
        match NonZeroU32::new(remaining) {
            Some(remaining) => AnomalyState::Anomaly { remaining },
            None => AnomalyState::Normal,
        }
    }

    pub fn in_anomaly_mode(&self) -> bool {
        matches!(self, AnomalyState::Anomaly { .. })
    }

    pub fn remaining_steps(&self) -> u32 {
        match self {
            AnomalyState::Normal => 0,
            AnomalyState::Anomaly { remaining } => remaining.get(),
        }
    }

    /// Account for one anomalous reading having been produced.
    ///
    /// `Anomaly(1)` drops straight to `Normal`, so the next call is the first
    /// normal-mode step.
    pub fn consume(self) -> Self {
        match self {
            AnomalyState::Normal => AnomalyState::Normal,
            AnomalyState::Anomaly { remaining } => Self::with_remaining(remaining.get() - 1),
        }
    }
}

impl std::fmt::Display for AnomalyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyState::Normal => write!(f, "Normal"),
            AnomalyState::Anomaly { remaining } => write!(f, "Anomaly({})", remaining),
        }
    }
}

/// Which band a step's values were walked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Normal,
    Anomalous,
}

/// Onset probability and episode length for injected anomalies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalySchedule {
    onset_probability: f64,
    min_steps: u32,
    max_steps: u32,
}

impl AnomalySchedule {
    pub const DEFAULT_ONSET_PROBABILITY: f64 = 0.15;
    pub const DEFAULT_MIN_STEPS: u32 = 5;
    pub const DEFAULT_MAX_STEPS: u32 = 10;

    pub fn new(onset_probability: f64, min_steps: u32, max_steps: u32) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&onset_probability) {
            return Err(ConfigError::InvalidProbability(onset_probability));
        }
        if min_steps == 0 || min_steps > max_steps {
            return Err(ConfigError::InvalidDuration {
                min: min_steps,
                max: max_steps,
            });
        }
        Ok(Self {
            onset_probability,
            min_steps,
            max_steps,
        })
    }

    pub fn onset_probability(&self) -> f64 {
        self.onset_probability
    }

    pub fn min_steps(&self) -> u32 {
        self.min_steps
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    /// Transition decision made at the start of every step.
    ///
    /// An ongoing episode is never re-rolled. From `Normal`, a uniform draw in
    /// `[0, 1)` below the onset probability starts an episode whose length is
    /// drawn from `min_steps..=max_steps`.
    pub fn begin_step<R: Rng + ?Sized>(&self, state: AnomalyState, rng: &mut R) -> AnomalyState {
        if state.in_anomaly_mode() {
            return state;
        }
        let roll: f64 = rng.gen();
        if roll < self.onset_probability {
            AnomalyState::with_remaining(rng.gen_range(self.min_steps..=self.max_steps))
        } else {
            AnomalyState::Normal
        }
    }
}

impl Default for AnomalySchedule {
    fn default() -> Self {
        Self {
            onset_probability: Self::DEFAULT_ONSET_PROBABILITY,
            min_steps: Self::DEFAULT_MIN_STEPS,
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }
}
