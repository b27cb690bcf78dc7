//! Plain-text rendering of dives and their statistics.

use std::io::{self, Write};

use crate::metrics::DepthHistogram;
use crate::models::{DepthUnits, Dive};
use crate::shearwater::ShearwaterLog;

/// Layout of per-sample timestamps, e.g. `Thu Nov  7 13:12:46 UTC 2019`.
const SAMPLE_TIME_FORMAT: &str = "%a %b %e %H:%M:%S UTC %Y";

/// Header line followed by every sample.
pub fn print_all(w: &mut impl Write, log: &ShearwaterLog) -> io::Result<()> {
    writeln!(w, "{}", log.header)?;
    print_samples(w, &log.dive)
}

/// One line per sample: time, depth, PPO2 and gas mix.
pub fn print_samples(w: &mut impl Write, dive: &Dive) -> io::Result<()> {
    for sample in dive.samples() {
        let t = match dive.sample_time(sample, 0) {
            Some(t) => t.format(SAMPLE_TIME_FORMAT).to_string(),
            None => format!("+{}s", sample.offset_sec),
        };
        writeln!(
            w,
            "{} depth {} ppo2 {} mix {}/{}",
            t,
            sample.depth,
            sample.average_ppo2,
            sample.fraction_o2,
            sample.fraction_he
        )?;
    }
    Ok(())
}

/// Average depth, then each depth holding deco time, then the total.
pub fn print_histogram(
    w: &mut impl Write,
    histogram: &DepthHistogram,
    units: DepthUnits,
) -> io::Result<()> {
    let unit = units.label();
    writeln!(
        w,
        "Avg {:4}{unit} {}min",
        histogram.average_depth, histogram.total_minutes
    )?;
    writeln!(w, "Deco({unit},min):")?;
    for bucket in histogram.deco_stops() {
        writeln!(w, "{:4} {}", bucket.depth, bucket.deco_minutes)?;
    }
    writeln!(w, "total deco {}", histogram.total_deco_minutes)
}
