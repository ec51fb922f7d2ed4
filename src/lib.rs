//! Synthetic industrial sensor telemetry.
//!
//! [`sensor::TelemetryGenerator`] walks five correlated channels (air and
//! process temperature, rotational speed, torque, tool wear) inside their
//! normal bands and occasionally injects an anomaly episode that shifts every
//! channel into a higher band for a bounded number of steps. The remaining
//! modules pace the generator, serialize its readings and track statistics.

pub mod async_impl;
pub mod config;
pub mod error;
pub mod ipc;
pub mod metrics;
pub mod sensor;
pub mod sink;
pub mod threaded_impl;

pub use config::{load_config, EmitterSettings, OutputFormat, RuntimeKind, SimulatorConfig};
pub use error::{ConfigError, SinkError};
pub use metrics::{EmissionMetrics, MetricsReport};
pub use sensor::{
    AnomalySchedule, AnomalyState, Channel, ColumnarReading, Reading, Regime, SeedBand, Step,
    TelemetryGenerator,
};
pub use sink::ReadingSink;
