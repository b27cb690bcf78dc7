//! A dive together with the diagnostics settings for analysing it.

use chrono::{DateTime, Utc};

use crate::buhlmann::DecoModel;
use crate::diagnostics::Diagnostics;
use crate::matcher::{self, BestMatch};
use crate::metrics::{self, DepthHistogram};
use crate::models::Dive;
use crate::playback::{self, PlaybackOptions, PlaybackResult};

/// Analysis session over one dive.
///
/// Each session carries its own [`Diagnostics`], so sessions running side
/// by side never share output sinks.
#[derive(Debug)]
pub struct DiveAnalysis<'a> {
    dive: &'a Dive,
    diagnostics: Diagnostics,
}

impl<'a> DiveAnalysis<'a> {
    pub fn new(dive: &'a Dive) -> Self {
        Self::with_diagnostics(dive, Diagnostics::new())
    }

    pub fn with_diagnostics(dive: &'a Dive, diagnostics: Diagnostics) -> Self {
        DiveAnalysis { dive, diagnostics }
    }

    pub fn dive(&self) -> &Dive {
        self.dive
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn max_depth(&self) -> f64 {
        metrics::max_depth(self.dive)
    }

    pub fn histogram(&self) -> DepthHistogram {
        DepthHistogram::compute(self.dive)
    }

    pub fn find_best_match(&mut self, target: DateTime<Utc>, adjust_hours: i32) -> BestMatch {
        matcher::find_best_match(self.dive, target, adjust_hours, &mut self.diagnostics)
    }

    /// Play the dive through a caller-owned model.
    pub fn playback_with<M>(&mut self, model: &mut M, options: PlaybackOptions) -> PlaybackResult
    where
        M: DecoModel + ?Sized,
    {
        playback::playback(self.dive, model, options, &mut self.diagnostics)
    }

    /// Play the dive through the default ZHL-16C GF 20/70 model.
    pub fn playback(&mut self, options: PlaybackOptions) -> PlaybackResult {
        playback::playback_default(self.dive, options, &mut self.diagnostics)
    }
}
