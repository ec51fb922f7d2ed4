use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::channel::{round2, Channel};

/// One rounded snapshot of all five channels.
///
/// Values are copied out of the generator, so a reading never aliases the
/// walk's internal state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    values: [f64; Channel::COUNT],
}

impl Reading {
    /// Build a reading from raw channel values, rounding each to 2 decimals.
    pub fn from_raw(raw: [f64; Channel::COUNT]) -> Self {
        Self {
            values: raw.map(round2),
        }
    }

    pub fn get(&self, channel: Channel) -> f64 {
        self.values[channel.index()]
    }

    pub fn values(&self) -> &[f64; Channel::COUNT] {
        &self.values
    }

    /// `(channel, value)` pairs in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, f64)> + '_ {
        Channel::ALL.iter().map(move |&ch| (ch, self.get(ch)))
    }

    pub fn to_columns(&self) -> ColumnarReading {
        ColumnarReading {
            columns: Channel::ALL.iter().map(|c| c.name()).collect(),
            values: self.values.to_vec(),
        }
    }
}

impl Serialize for Reading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Channel::COUNT))?;
        for (channel, value) in self.iter() {
            map.serialize_entry(channel.name(), &value)?;
        }
        map.end()
    }
}

/// Parallel name/value sequences for consumers expecting a tabular shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnarReading {
    pub columns: Vec<&'static str>,
    pub values: Vec<f64>,
}
