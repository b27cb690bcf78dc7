//! Replaying a dive through a decompression model.
//!
//! Each sample is held for one sampling interval at its depth. Once per
//! elapsed minute the model's ceiling is compared with the actual depth,
//! and the extreme clearances are kept.

use crate::buhlmann::{Buhlmann, DecoModel};
use crate::diagnostics::{diag_trace, Diagnostics};
use crate::gas::GasMix;
use crate::metrics::SAMPLE_INTERVAL_SECS;
use crate::models::Dive;

/// Samples at or shallower than this are treated as near the surface.
const SUBMERGED_DEPTH: f64 = 10.0;

/// Clearances are only tracked shallower than this.
const MAX_TRACKED_DEPTH: f64 = 100.0;

/// Whole minutes that must pass before the maximum clearance is tracked.
const MAX_CLEARANCE_AFTER_MIN: u32 = 60;

/// Whole minutes that must pass before the minimum clearance is tracked.
const MIN_CLEARANCE_AFTER_MIN: u32 = 30;

/// Legacy value reported when no minimum clearance qualified.
pub const MIN_CLEARANCE_SENTINEL: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackOptions {
    /// Derive a rebreather loop mix from each sample's average PPO2.
    pub use_ppo2: bool,
    /// Gas breathed, or the diluent when `use_ppo2` is set.
    pub baseline: GasMix,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        PlaybackOptions {
            use_ppo2: false,
            baseline: GasMix::trimix(18, 45),
        }
    }
}

impl PlaybackOptions {
    pub fn rebreather() -> Self {
        PlaybackOptions {
            use_ppo2: true,
            ..Self::default()
        }
    }
}

/// Extreme distances between the diver and the model's ceiling.
#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct PlaybackResult {
    /// Largest clearance after the first hour, 0.0 if none exceeded that
    pub max_clearance: f64,
    /// Smallest clearance after the first half hour, if any qualified
    pub min_clearance: Option<f64>,
}

impl PlaybackResult {
    /// Minimum clearance capped at [`MIN_CLEARANCE_SENTINEL`], the value
    /// older reports used when nothing smaller had been seen.
    pub fn min_clearance_capped(&self) -> f64 {
        self.min_clearance
            .map_or(MIN_CLEARANCE_SENTINEL, |m| m.min(MIN_CLEARANCE_SENTINEL))
    }
}

/// Play the dive through `model`, which the caller owns and may inspect
/// afterwards.
pub fn playback<M>(
    dive: &Dive,
    model: &mut M,
    options: PlaybackOptions,
    diag: &mut Diagnostics,
) -> PlaybackResult
where
    M: DecoModel + ?Sized,
{
    let step = f64::from(SAMPLE_INTERVAL_SECS) / 60.0;
    let units = dive.units();

    let mut elapsed = 0.0;
    let mut last_minute = 0;
    let mut result = PlaybackResult {
        max_clearance: 0.0,
        min_clearance: None,
    };

    for sample in dive.samples() {
        let depth = sample.depth;
        elapsed += step;
        diag_trace!(diag, "playback: depth {depth} time {elapsed}");

        let mix = if options.use_ppo2 {
            GasMix::rebreather(options.baseline, units.to_atm(depth), sample.average_ppo2)
        } else {
            options.baseline
        };
        model.level_off(step, depth, mix);

        let minute = elapsed as u32;
        if minute == last_minute {
            continue;
        }
        last_minute = minute;

        let ceiling = model.ceiling();
        diag_trace!(diag, "playback: ceiling {ceiling}");
        if let Some(sink) = diag.model_sink() {
            if let Err(e) = model.print(true, &format!("playback{minute}"), sink) {
                tracing::warn!("model print sink failed: {e}");
            }
        }

        if depth <= SUBMERGED_DEPTH {
            continue;
        }
        let clearance = depth - ceiling;
        diag_trace!(diag, "playback: depth {depth} ceiling {ceiling} clearance {clearance}");
        if depth >= MAX_TRACKED_DEPTH {
            continue;
        }

        if clearance > result.max_clearance && minute > MAX_CLEARANCE_AFTER_MIN {
            result.max_clearance = clearance;
        }
        if minute > MIN_CLEARANCE_AFTER_MIN && result.min_clearance.map_or(true, |m| clearance < m)
        {
            result.min_clearance = Some(clearance);
            diag_trace!(
                diag,
                "playback: minimum clearance reset at {minute} min / {depth:.2}{} {clearance:.2}",
                units.label()
            );
        }
    }

    diag_trace!(
        diag,
        "playback: max clearance {} min clearance {:?}",
        result.max_clearance,
        result.min_clearance
    );
    tracing::debug!(
        samples = dive.samples().len(),
        max_clearance = result.max_clearance,
        min_clearance = ?result.min_clearance,
        "playback complete"
    );
    result
}

/// Play the dive through a fresh ZHL-16C GF 20/70 model in the dive's units.
pub fn playback_default(
    dive: &Dive,
    options: PlaybackOptions,
    diag: &mut Diagnostics,
) -> PlaybackResult {
    let mut model = Buhlmann::default().with_units(dive.units());
    playback(dive, &mut model, options, diag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::tests::SharedBuf;
    use crate::models::{DepthUnits, Sample};
    use chrono::{TimeZone, Utc};
    use std::io::{self, Write};

    /// Reports a fixed ceiling and records every call.
    #[derive(Default)]
    struct ScriptedModel {
        ceiling: f64,
        steps: Vec<(f64, f64, GasMix)>,
        queries: std::cell::Cell<usize>,
    }

    impl DecoModel for ScriptedModel {
        fn level_off(&mut self, minutes: f64, depth: f64, mix: GasMix) {
            self.steps.push((minutes, depth, mix));
        }

        fn ceiling(&self) -> f64 {
            self.queries.set(self.queries.get() + 1);
            self.ceiling
        }

        fn print(&self, _verbose: bool, label: &str, out: &mut dyn Write) -> io::Result<()> {
            writeln!(out, "{label}")
        }
    }

    fn dive(samples: Vec<Sample>) -> Dive {
        let start = Utc.with_ymd_and_hms(2019, 11, 7, 13, 0, 0).unwrap();
        Dive::new(start, DepthUnits::Feet, samples).unwrap()
    }

    /// One sample per 10 seconds, depth given per minute.
    fn by_minute(depth_at_minute: impl Fn(u32) -> f64, minutes: u32) -> Dive {
        let samples = (0..minutes * 6)
            .map(|i| {
                let mut s = Sample::new(i * SAMPLE_INTERVAL_SECS, depth_at_minute(i / 6));
                s.average_ppo2 = 1.2;
                s
            })
            .collect();
        dive(samples)
    }

    #[test]
    fn test_each_sample_advances_model_one_step() {
        let d = by_minute(|_| 50.0, 3);
        let mut model = ScriptedModel::default();
        playback(&d, &mut model, PlaybackOptions::default(), &mut Diagnostics::new());

        assert_eq!(model.steps.len(), 18);
        for (minutes, depth, mix) in &model.steps {
            assert!((minutes - 1.0 / 6.0).abs() < 1e-12);
            assert_eq!(*depth, 50.0);
            assert_eq!(*mix, GasMix::trimix(18, 45));
        }
        // Ceiling queried once per crossed minute; accumulated steps land
        // just short of the third minute on the last sample
        assert_eq!(model.queries.get(), 2);
    }

    #[test]
    fn test_rebreather_mix_follows_ppo2() {
        let d = by_minute(|_| 66.0, 1);
        let mut model = ScriptedModel::default();
        playback(&d, &mut model, PlaybackOptions::rebreather(), &mut Diagnostics::new());

        let (_, _, mix) = model.steps[0];
        // 66ft = 3 atm, setpoint 1.2
        assert!((mix.o2 - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_guards_before_thresholds() {
        // 40 minutes at 50ft: past the min guard, not the max guard
        let d = by_minute(|_| 50.0, 40);
        let mut model = ScriptedModel {
            ceiling: 20.0,
            ..Default::default()
        };
        let result = playback(&d, &mut model, PlaybackOptions::default(), &mut Diagnostics::new());
        assert_eq!(result.max_clearance, 0.0);
        assert_eq!(result.min_clearance, Some(30.0));
    }

    #[test]
    fn test_nothing_tracked_in_first_half_hour() {
        let d = by_minute(|_| 50.0, 30);
        let mut model = ScriptedModel {
            ceiling: 45.0,
            ..Default::default()
        };
        let result = playback(&d, &mut model, PlaybackOptions::default(), &mut Diagnostics::new());
        assert_eq!(
            result,
            PlaybackResult {
                max_clearance: 0.0,
                min_clearance: None
            }
        );
        assert_eq!(result.min_clearance_capped(), MIN_CLEARANCE_SENTINEL);
    }

    #[test]
    fn test_depth_guards() {
        // Deep (>= 100) for the whole dive, then near-surface (<= 10)
        let d = by_minute(|m| if m < 70 { 150.0 } else { 5.0 }, 80);
        let mut model = ScriptedModel::default();
        let result = playback(&d, &mut model, PlaybackOptions::default(), &mut Diagnostics::new());
        assert_eq!(result.max_clearance, 0.0);
        assert_eq!(result.min_clearance, None);
    }

    #[test]
    fn test_depth_guard_boundaries() {
        let run = |depth: f64| {
            let d = by_minute(|_| depth, 70);
            let mut model = ScriptedModel {
                ceiling: 5.0,
                ..Default::default()
            };
            playback(&d, &mut model, PlaybackOptions::default(), &mut Diagnostics::new())
        };
        let untracked = PlaybackResult {
            max_clearance: 0.0,
            min_clearance: None,
        };

        // Both thresholds are exclusive
        assert_eq!(run(MAX_TRACKED_DEPTH), untracked);
        assert_eq!(run(SUBMERGED_DEPTH), untracked);

        let deep = run(99.9);
        assert_eq!(deep.max_clearance, 99.9 - 5.0);
        assert_eq!(deep.min_clearance, Some(99.9 - 5.0));

        let shallow = run(10.1);
        assert_eq!(shallow.max_clearance, 10.1 - 5.0);
        assert_eq!(shallow.min_clearance, Some(10.1 - 5.0));
    }

    #[test]
    fn test_max_and_min_tracked() {
        // Deep start, then a stop profile shallowing every 10 minutes
        let profile = |m: u32| match m {
            0..=29 => 150.0,
            30..=49 => 70.0,
            50..=69 => 40.0,
            _ => 20.0,
        };
        let d = by_minute(profile, 90);
        let mut model = ScriptedModel {
            ceiling: 30.0,
            ..Default::default()
        };
        let result = playback(&d, &mut model, PlaybackOptions::default(), &mut Diagnostics::new());
        // Max only after minute 60: 40 - 30
        assert_eq!(result.max_clearance, 10.0);
        // Min after minute 30: 20 - 30
        assert_eq!(result.min_clearance, Some(-10.0));
        assert_eq!(result.min_clearance_capped(), -10.0);
    }

    #[test]
    fn test_empty_dive() {
        let d = dive(vec![]);
        let result = playback_default(&d, PlaybackOptions::default(), &mut Diagnostics::new());
        assert_eq!(result.max_clearance, 0.0);
        assert_eq!(result.min_clearance, None);
    }

    #[test]
    fn test_diagnostics_do_not_change_results() {
        let profile = |m: u32| match m {
            0..=2 => 60.0 * f64::from(m + 1),
            3..=29 => 200.0,
            30..=59 => 90.0,
            60..=89 => 50.0,
            _ => 20.0,
        };
        let d = by_minute(profile, 120);

        let quiet = playback_default(&d, PlaybackOptions::rebreather(), &mut Diagnostics::new());

        let trace = SharedBuf::default();
        let dumps = SharedBuf::default();
        let mut diag = Diagnostics::new()
            .with_trace(trace.clone())
            .with_model_print(dumps.clone());
        let loud = playback_default(&d, PlaybackOptions::rebreather(), &mut diag);

        assert_eq!(quiet, loud);
        assert!(trace.contents().contains("playback: max clearance"));
        assert!(dumps.contents().contains("playback1:"));
        assert!(dumps.contents().contains("playback119:"));
    }

    #[test]
    fn test_real_model_reports_stops() {
        // 200ft for 25 minutes on 18/45, then staged stops
        let profile = |m: u32| match m {
            0..=24 => 200.0,
            25..=34 => 90.0,
            35..=54 => 60.0,
            55..=84 => 30.0,
            _ => 20.0,
        };
        let d = by_minute(profile, 120);
        let mut model = Buhlmann::default();
        let result = playback(&d, &mut model, PlaybackOptions::default(), &mut Diagnostics::new());

        assert!(result.max_clearance >= 0.0);
        let min = result.min_clearance.unwrap();
        assert!(min < 90.0, "min clearance {min}");
        // Model is left in its end-of-dive state for the caller
        assert!(model.ceiling() < 30.0);
    }
}
