use crossbeam::channel::{bounded, Receiver, Sender};

use crate::sensor::Reading;

pub type ReadingSender = Sender<Reading>;
pub type ReadingReceiver = Receiver<Reading>;

/// Bounded channel between an emitter and a sink.
///
/// The receiver reports disconnection once every sender has been dropped,
/// which is how a sink learns the emitter has finished.
pub fn reading_channel(buffer_size: usize) -> (ReadingSender, ReadingReceiver) {
    bounded(buffer_size.max(1))
}
