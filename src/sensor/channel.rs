use rand::Rng;

/// One of the five simulated physical quantities, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    AirTemp,
    ProcessTemp,
    RotationSpeed,
    Torque,
    ToolWear,
}

impl Channel {
    pub const COUNT: usize = 5;

    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::AirTemp,
        Channel::ProcessTemp,
        Channel::RotationSpeed,
        Channel::Torque,
        Channel::ToolWear,
    ];

    /// Wire name used by downstream consumers.
    pub fn name(self) -> &'static str {
        match self {
            Channel::AirTemp => "airTemp",
            Channel::ProcessTemp => "processTemp",
            Channel::RotationSpeed => "rotationSpeed",
            Channel::Torque => "torque",
            Channel::ToolWear => "toolWear",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> ChannelSpec {
        CHANNEL_SPECS[self.index()]
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A closed value range plus the per-step jitter applied inside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
    pub jitter: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64, jitter: f64) -> Self {
        Self { min, max, jitter }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Uniform draw over the whole band, used to seed a channel.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min..=self.max)
    }

    pub fn adjust<R: Rng + ?Sized>(&self, value: f64, rng: &mut R) -> f64 {
        adjust(value, self.min, self.max, self.jitter, rng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSpec {
    pub normal: Band,
    pub anomalous: Band,
}

const CHANNEL_SPECS: [ChannelSpec; Channel::COUNT] = [
    // airTemp (K)
    ChannelSpec {
        normal: Band::new(295.3, 299.0, 0.1),
        anomalous: Band::new(299.1, 304.0, 0.5),
    },
    // processTemp (K)
    ChannelSpec {
        normal: Band::new(305.7, 310.0, 0.1),
        anomalous: Band::new(310.1, 313.0, 0.5),
    },
    // rotationSpeed (rpm)
    ChannelSpec {
        normal: Band::new(1200.0, 1600.0, 5.0),
        anomalous: Band::new(1400.0, 2886.0, 20.0),
    },
    // torque (Nm)
    ChannelSpec {
        normal: Band::new(15.0, 40.0, 1.0),
        anomalous: Band::new(45.0, 76.0, 2.0),
    },
    // toolWear (min)
    ChannelSpec {
        normal: Band::new(0.0, 100.0, 2.0),
        anomalous: Band::new(100.0, 253.0, 3.0),
    },
];

/// Bounded random-walk step: perturb by `uniform(-step, step)` and clamp.
///
/// Clamping pins the value to the boundary rather than reflecting or
/// resampling, so a walk can sit on a bound for several consecutive steps.
pub fn adjust<R: Rng + ?Sized>(value: f64, min: f64, max: f64, step: f64, rng: &mut R) -> f64 {
    let delta = if step > 0.0 {
        rng.gen_range(-step..=step)
    } else {
        0.0
    };
    (value + delta).clamp(min, max)
}

/// Round to two decimal places, as carried on the wire.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
