//! Depth statistics for dive samples.
//!
//! Pure functions over a loaded [`Dive`]; nothing here mutates it.

use std::collections::BTreeMap;

use crate::models::Dive;

/// Real time each logged sample stands for.
pub const SAMPLE_INTERVAL_SECS: u32 = 10;

/// Depth bucket width.
const BUCKET_WIDTH: f64 = 10.0;

/// Buckets at or beyond this depth are dropped.
const MAX_BUCKET: u32 = 1000;

/// Whole minutes covered by `count` samples, truncated.
pub(crate) fn samples_to_minutes(count: u32) -> u32 {
    (f64::from(count) * (f64::from(SAMPLE_INTERVAL_SECS) / 60.0)) as u32
}

/// Time spent around one depth.
#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct DepthBucket {
    /// Bucket depth, a multiple of 10 depth units
    pub depth: u32,
    pub samples: u32,
    pub minutes: u32,
    /// Minutes beyond the first, counted as a decompression stop
    pub deco_minutes: u32,
}

/// Depth profile of a dive bucketed to the nearest 10 depth units.
#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct DepthHistogram {
    /// Sample-weighted mean bucket depth, truncated
    pub average_depth: u32,
    pub total_minutes: u32,
    pub total_deco_minutes: u32,
    /// Non-empty buckets, shallowest first
    pub buckets: Vec<DepthBucket>,
}

impl DepthHistogram {
    /// Bucket every sample and estimate deco time.
    ///
    /// The first minute at a depth is treated as transit; only time beyond
    /// it counts toward deco. The surface bucket never does.
    pub fn compute(dive: &Dive) -> Self {
        let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
        for sample in dive.samples() {
            let bucket = ((sample.depth / BUCKET_WIDTH).round() * BUCKET_WIDTH) as u32;
            if bucket < MAX_BUCKET {
                *counts.entry(bucket).or_insert(0) += 1;
            }
        }

        let mut weighted: u64 = 0;
        let mut total: u32 = 0;
        let mut total_deco_minutes = 0;
        let mut buckets = Vec::with_capacity(counts.len());

        for (&depth, &samples) in &counts {
            weighted += u64::from(depth) * u64::from(samples);
            total += samples;

            let minutes = samples_to_minutes(samples);
            let deco_minutes = if depth > 0 && minutes > 1 {
                minutes - 1
            } else {
                0
            };
            total_deco_minutes += deco_minutes;

            buckets.push(DepthBucket {
                depth,
                samples,
                minutes,
                deco_minutes,
            });
        }

        let average_depth = if total > 0 {
            (weighted / u64::from(total)) as u32
        } else {
            0
        };

        DepthHistogram {
            average_depth,
            total_minutes: samples_to_minutes(total),
            total_deco_minutes,
            buckets,
        }
    }

    /// Buckets that contribute deco time.
    pub fn deco_stops(&self) -> impl Iterator<Item = &DepthBucket> {
        self.buckets.iter().filter(|b| b.deco_minutes > 0)
    }
}

/// Greatest depth reached, 0.0 for an empty dive.
pub fn max_depth(dive: &Dive) -> f64 {
    dive.samples()
        .iter()
        .map(|s| s.depth)
        .fold(0.0, f64::max)
}
