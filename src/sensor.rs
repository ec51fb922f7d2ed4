//! Sensor module - Channel table, anomaly injection, and reading generation

pub mod anomaly;
pub mod channel;
pub mod generator;
pub mod reading;

pub use anomaly::{AnomalySchedule, AnomalyState, Regime};
pub use channel::{adjust, Band, Channel, ChannelSpec};
pub use generator::{SeedBand, Step, TelemetryGenerator};
pub use reading::{ColumnarReading, Reading};
