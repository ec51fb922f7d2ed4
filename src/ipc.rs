//! IPC module - Reading channels and shared generator access

pub mod channels;
pub mod shared;

pub use channels::{reading_channel, ReadingReceiver, ReadingSender};
pub use shared::SharedGenerator;
