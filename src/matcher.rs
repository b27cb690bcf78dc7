//! Correlating an external event time with a logged depth.

use chrono::{DateTime, Duration, Utc};

use crate::diagnostics::{diag_trace, Diagnostics};
use crate::models::Dive;

/// A match further than this from its target is not trusted.
pub const MATCH_TOLERANCE_SECS: i64 = 10;

/// Depth found for a target time.
#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct BestMatch {
    pub depth: f64,
    /// False when the dive is empty or the closest preceding sample is more
    /// than [`MATCH_TOLERANCE_SECS`] from the target. `depth` is still
    /// reported in the latter case.
    pub found: bool,
}

impl BestMatch {
    fn within_tolerance(depth: f64, delta: Duration) -> Self {
        BestMatch {
            depth,
            found: delta <= Duration::seconds(MATCH_TOLERANCE_SECS),
        }
    }
}

/// Find the depth of the sample closest to, and not after, `target`.
///
/// `adjust_hours` shifts every sample time before comparing, for logs kept
/// in a different timezone than the target. A target before the first
/// sample matches the first sample. Relies on the dive's sample ordering
/// to stop as soon as it walks past the target.
pub fn find_best_match(
    dive: &Dive,
    target: DateTime<Utc>,
    adjust_hours: i32,
    diag: &mut Diagnostics,
) -> BestMatch {
    let mut best: Option<(f64, Duration)> = None;

    for (i, sample) in dive.samples().iter().enumerate() {
        let Some(t) = dive.sample_time(sample, adjust_hours) else {
            diag_trace!(diag, "shift of {}h leaves the time range", adjust_hours);
            return BestMatch {
                depth: 0.0,
                found: false,
            };
        };

        if t == target {
            diag_trace!(diag, "perfect match {} depth {}", target, sample.depth);
            return BestMatch {
                depth: sample.depth,
                found: true,
            };
        }

        if t > target {
            if i == 0 {
                diag_trace!(diag, "target {} precedes dive at {}", target, t);
                return BestMatch {
                    depth: sample.depth,
                    found: true,
                };
            }
            diag_trace!(diag, "past target {} at {}", target, t);
            break;
        }

        let delta = target - t;
        if best.map_or(true, |(_, d)| delta < d) {
            diag_trace!(
                diag,
                "{} {} delta {}s depth {}",
                target,
                t,
                delta.num_seconds(),
                sample.depth
            );
            best = Some((sample.depth, delta));
        }
    }

    match best {
        Some((depth, delta)) => BestMatch::within_tolerance(depth, delta),
        None => BestMatch {
            depth: 0.0,
            found: false,
        },
    }
}
