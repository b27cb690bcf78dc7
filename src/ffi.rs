//! Foreign-language bindings.
//!
//! Dives cross the boundary as plain [`DiveRecord`] values and are
//! validated on the way in. Each call runs without diagnostics.

use chrono::DateTime;

use crate::buhlmann::Buhlmann;
use crate::diagnostics::Diagnostics;
use crate::error::DiveLogError;
use crate::gas::GasMix;
use crate::matcher::{self, BestMatch};
use crate::metrics::{self, DepthHistogram};
use crate::models::{DepthUnits, Dive, Sample};
use crate::playback::{self, PlaybackOptions, PlaybackResult};
use crate::shearwater;

#[derive(Clone, Debug, PartialEq, uniffi::Record)]
pub struct DiveRecord {
    pub start_time_unix: i64,
    pub units: DepthUnits,
    pub samples: Vec<Sample>,
}

impl TryFrom<DiveRecord> for Dive {
    type Error = DiveLogError;

    fn try_from(record: DiveRecord) -> Result<Self, Self::Error> {
        let start = DateTime::from_timestamp(record.start_time_unix, 0)
            .ok_or(DiveLogError::InvalidTimestamp(record.start_time_unix))?;
        Dive::new(start, record.units, record.samples)
    }
}

impl From<Dive> for DiveRecord {
    fn from(dive: Dive) -> Self {
        DiveRecord {
            start_time_unix: dive.start_time().timestamp(),
            units: dive.units(),
            samples: dive.samples().to_vec(),
        }
    }
}

#[uniffi::export]
pub fn parse_shearwater_log(xml: String) -> Result<DiveRecord, DiveLogError> {
    Ok(shearwater::parse_str(&xml)?.dive.into())
}

#[uniffi::export]
pub fn dive_max_depth(dive: DiveRecord) -> Result<f64, DiveLogError> {
    Ok(metrics::max_depth(&Dive::try_from(dive)?))
}

#[uniffi::export]
pub fn dive_best_match(
    dive: DiveRecord,
    target_unix: i64,
    adjust_hours: i32,
) -> Result<BestMatch, DiveLogError> {
    let dive = Dive::try_from(dive)?;
    let target = DateTime::from_timestamp(target_unix, 0)
        .ok_or(DiveLogError::InvalidTimestamp(target_unix))?;
    Ok(matcher::find_best_match(
        &dive,
        target,
        adjust_hours,
        &mut Diagnostics::new(),
    ))
}

#[uniffi::export]
pub fn dive_histogram(dive: DiveRecord) -> Result<DepthHistogram, DiveLogError> {
    Ok(DepthHistogram::compute(&Dive::try_from(dive)?))
}

/// Play the dive through ZHL-16C with the given gradient factors (0.0–1.0).
#[uniffi::export]
pub fn dive_playback(
    dive: DiveRecord,
    gf_low: f64,
    gf_high: f64,
    use_ppo2: bool,
    baseline: GasMix,
) -> Result<PlaybackResult, DiveLogError> {
    if !baseline.is_valid() {
        return Err(DiveLogError::InvalidGasMix {
            o2: baseline.o2,
            he: baseline.he,
        });
    }
    let dive = Dive::try_from(dive)?;
    let mut model = Buhlmann::zhl16c(gf_low, gf_high).with_units(dive.units());
    let options = PlaybackOptions { use_ppo2, baseline };
    Ok(playback::playback(
        &dive,
        &mut model,
        options,
        &mut Diagnostics::new(),
    ))
}
