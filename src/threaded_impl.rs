//! Threaded emission loop

pub mod sensor_thread;

pub use sensor_thread::{spawn_sensor_thread, EmitterStats};
