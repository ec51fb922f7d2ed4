//! Async emission loop on tokio

pub mod sensor_task;

pub use sensor_task::sensor_task;
