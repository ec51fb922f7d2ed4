//! Error types for configuration loading and reading output

use std::path::PathBuf;

/// Errors raised while loading or validating simulator configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("anomaly onset probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("anomaly duration must satisfy 1 <= min <= max, got {min}..={max}")]
    InvalidDuration { min: u32, max: u32 },

    #[error("seed target must be 0 (normal) or 1 (anomalous), got {0}")]
    InvalidTarget(u8),

    #[error("emit interval must be greater than zero")]
    InvalidInterval,
}

/// Errors raised while writing readings to an output stream.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
