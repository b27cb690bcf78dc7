use chrono::{DateTime, Duration, Utc};

use crate::error::DiveLogError;

/// Seawater depth per atmosphere of pressure, in feet.
const FEET_PER_ATM: f64 = 33.0;

/// Seawater depth per atmosphere of pressure, in metres.
const METERS_PER_ATM: f64 = 10.0;

/// Unit system a log records depths in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum DepthUnits {
    Feet,
    Meters,
}

impl Default for DepthUnits {
    fn default() -> Self {
        DepthUnits::Feet
    }
}

impl DepthUnits {
    pub fn from_imperial(imperial: bool) -> Self {
        if imperial {
            DepthUnits::Feet
        } else {
            DepthUnits::Meters
        }
    }

    /// Absolute pressure in atmospheres at `depth` of seawater.
    pub fn to_atm(self, depth: f64) -> f64 {
        depth / self.per_atm() + 1.0
    }

    /// Depth of seawater at which the absolute pressure is `atm`.
    pub fn from_atm(self, atm: f64) -> f64 {
        (atm - 1.0) * self.per_atm()
    }

    pub fn label(self) -> &'static str {
        match self {
            DepthUnits::Feet => "ft",
            DepthUnits::Meters => "m",
        }
    }

    fn per_atm(self) -> f64 {
        match self {
            DepthUnits::Feet => FEET_PER_ATM,
            DepthUnits::Meters => METERS_PER_ATM,
        }
    }
}

/// One logged instant of a dive.
#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct Sample {
    /// Seconds since the dive started
    pub offset_sec: u32,
    /// Depth in the dive's [`DepthUnits`]
    pub depth: f64,
    pub average_ppo2: f64,
    pub fraction_o2: f64,
    pub fraction_he: f64,
}

impl Sample {
    pub fn new(offset_sec: u32, depth: f64) -> Self {
        Sample {
            offset_sec,
            depth,
            average_ppo2: 0.0,
            fraction_o2: 0.0,
            fraction_he: 0.0,
        }
    }
}

/// A fully loaded dive: its start time and a time-ordered sample sequence.
///
/// Read-only once built. [`Dive::new`] guarantees that sample offsets never
/// decrease, which the matcher and the playback driver rely on.
#[derive(Clone, Debug, PartialEq)]
pub struct Dive {
    start_time: DateTime<Utc>,
    units: DepthUnits,
    samples: Vec<Sample>,
}

impl Dive {
    pub fn new(
        start_time: DateTime<Utc>,
        units: DepthUnits,
        samples: Vec<Sample>,
    ) -> Result<Self, DiveLogError> {
        for (index, pair) in samples.windows(2).enumerate() {
            if pair[1].offset_sec < pair[0].offset_sec {
                return Err(DiveLogError::OutOfOrderSample {
                    index: index + 1,
                    previous: pair[0].offset_sec,
                    offset: pair[1].offset_sec,
                });
            }
        }
        if let Some(last) = samples.last() {
            let end = Duration::seconds(i64::from(last.offset_sec));
            if start_time.checked_add_signed(end).is_none() {
                return Err(DiveLogError::InvalidTimestamp(start_time.timestamp()));
            }
        }
        Ok(Dive {
            start_time,
            units,
            samples,
        })
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn units(&self) -> DepthUnits {
        self.units
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Absolute time of `sample`, shifted by `adjust_hours`. `None` when the
    /// shift moves it outside the representable range; unshifted times of
    /// the dive's own samples always exist.
    pub fn sample_time(&self, sample: &Sample, adjust_hours: i32) -> Option<DateTime<Utc>> {
        let seconds = i64::from(sample.offset_sec) + i64::from(adjust_hours) * 60 * 60;
        self.start_time.checked_add_signed(Duration::seconds(seconds))
    }
}
