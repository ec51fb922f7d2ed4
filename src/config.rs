//! Simulator configuration loaded from a TOML file

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::sensor::{AnomalySchedule, SeedBand};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorConfig {
    pub generator: GeneratorSection,
    pub emitter: EmitterSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorSection {
    pub seed: Option<u64>,
    /// 0 seeds channels in the normal band, 1 in the anomalous band.
    pub target: u8,
    pub onset_probability: f64,
    pub min_anomaly_steps: u32,
    pub max_anomaly_steps: u32,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            seed: None,
            target: 0,
            onset_probability: AnomalySchedule::DEFAULT_ONSET_PROBABILITY,
            min_anomaly_steps: AnomalySchedule::DEFAULT_MIN_STEPS,
            max_anomaly_steps: AnomalySchedule::DEFAULT_MAX_STEPS,
        }
    }
}

impl GeneratorSection {
    pub fn schedule(&self) -> Result<AnomalySchedule, ConfigError> {
        AnomalySchedule::new(
            self.onset_probability,
            self.min_anomaly_steps,
            self.max_anomaly_steps,
        )
    }

    pub fn seed_band(&self) -> Result<SeedBand, ConfigError> {
        SeedBand::try_from(self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `{"airTemp": .., ...}`
    #[default]
    Map,
    /// `{"columns": [..], "values": [..]}`
    Columns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    #[default]
    Threaded,
    Async,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitterSection {
    pub interval_ms: u64,
    pub count: Option<u64>,
    pub duration_secs: Option<u64>,
    pub format: OutputFormat,
    pub runtime: RuntimeKind,
    pub channel_capacity: usize,
}

impl Default for EmitterSection {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            count: None,
            duration_secs: None,
            format: OutputFormat::Map,
            runtime: RuntimeKind::Threaded,
            channel_capacity: 256,
        }
    }
}

/// Pacing and termination for an emission loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterSettings {
    pub interval: Duration,
    pub count: Option<u64>,
    pub duration: Option<Duration>,
}

impl EmitterSection {
    pub fn settings(&self) -> Result<EmitterSettings, ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(EmitterSettings {
            interval: Duration::from_millis(self.interval_ms),
            count: self.count,
            duration: self.duration_secs.map(Duration::from_secs),
        })
    }
}

impl SimulatorConfig {
    /// Check every section, returning the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.schedule()?;
        self.generator.seed_band()?;
        self.emitter.settings()?;
        Ok(())
    }
}

pub fn parse_config(contents: &str) -> Result<SimulatorConfig, ConfigError> {
    let config: SimulatorConfig = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<SimulatorConfig, ConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.generator.seed, None);
        assert_eq!(cfg.generator.onset_probability, 0.15);
        assert_eq!(cfg.generator.min_anomaly_steps, 5);
        assert_eq!(cfg.generator.max_anomaly_steps, 10);
        assert_eq!(cfg.emitter.interval_ms, 2000);
        assert_eq!(cfg.emitter.format, OutputFormat::Map);
        assert_eq!(cfg.emitter.runtime, RuntimeKind::Threaded);
    }

    #[test]
    fn parses_full_file() {
        let cfg = parse_config(
            r#"
            [generator]
            seed = 42
            target = 1
            onset_probability = 0.3
            min_anomaly_steps = 2
            max_anomaly_steps = 4

            [emitter]
            interval_ms = 50
            count = 100
            format = "columns"
            runtime = "async"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.generator.seed, Some(42));
        assert_eq!(cfg.generator.seed_band().unwrap(), SeedBand::Anomalous);
        let schedule = cfg.generator.schedule().unwrap();
        assert_eq!(schedule.min_steps(), 2);
        assert_eq!(schedule.max_steps(), 4);
        let settings = cfg.emitter.settings().unwrap();
        assert_eq!(settings.interval, Duration::from_millis(50));
        assert_eq!(settings.count, Some(100));
        assert_eq!(cfg.emitter.format, OutputFormat::Columns);
        assert_eq!(cfg.emitter.runtime, RuntimeKind::Async);
    }

    #[test]
    fn rejects_bad_values() {
        let err = parse_config("[generator]\nonset_probability = 2.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProbability(_)));

        let err = parse_config("[generator]\ntarget = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTarget(3)));

        let err = parse_config("[emitter]\ninterval_ms = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInterval));

        let err = parse_config("[generator]\nunknown = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[emitter]\ncount = 3").unwrap();
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.emitter.count, Some(3));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config("/nonexistent/simulator.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
