//! Bühlmann ZHL-16C decompression model.
//!
//! Implements a full 16-compartment tissue model using the Haldane equation
//! for constant-depth exposures, tracking N2 and He loading. The ceiling is
//! computed with gradient factors: GF low applies at the deepest ceiling
//! seen so far on the dive, GF high at the surface, interpolated linearly
//! in between.

use std::io::{self, Write};

use crate::gas::GasMix;
use crate::models::DepthUnits;

// ============================================================================
// Physical Constants
// ============================================================================

/// Water vapour pressure in the lungs (bar), at 37°C.
const P_WATER_VAPOR: f64 = 0.0627;

/// Bar per atmosphere.
const BAR_PER_ATM: f64 = 1.01325;

/// Default surface atmospheric pressure (bar) at sea level.
const DEFAULT_SURFACE_PRESSURE: f64 = 1.01325;

/// Fraction of N2 in air.
const AIR_FN2: f64 = 0.7902;

/// Fixed-point passes used to settle the GF-dependent ceiling.
const CEILING_ITERATIONS: usize = 4;

// ============================================================================
// ZHL-16C Compartment Constants (Bühlmann / Baker)
// ============================================================================

/// Number of tissue compartments.
const NUM_COMPARTMENTS: usize = 16;

/// N2 half-times in minutes for compartments 1–16 (ZHL-16C).
const N2_HALF_TIMES: [f64; NUM_COMPARTMENTS] = [
    5.0, 8.0, 12.5, 18.5, 27.0, 38.3, 54.3, 77.0, 109.0, 146.0, 187.0, 239.0, 305.0, 390.0, 498.0,
    635.0,
];

/// He half-times in minutes for compartments 1–16 (ZHL-16C).
const HE_HALF_TIMES: [f64; NUM_COMPARTMENTS] = [
    1.88, 3.02, 4.72, 6.99, 10.21, 14.48, 20.53, 29.11, 41.20, 55.19, 70.69, 90.34, 115.29, 147.42,
    188.24, 240.03,
];

/// N2 'a' coefficients (bar) for ZHL-16C.
const A_N2: [f64; NUM_COMPARTMENTS] = [
    1.1696, 1.0000, 0.8618, 0.7562, 0.6200, 0.5043, 0.4410, 0.4000, 0.3750, 0.3500, 0.3295, 0.3065,
    0.2835, 0.2610, 0.2480, 0.2327,
];

/// N2 'b' coefficients (dimensionless) for ZHL-16C.
const B_N2: [f64; NUM_COMPARTMENTS] = [
    0.5578, 0.6514, 0.7222, 0.7825, 0.8126, 0.8434, 0.8693, 0.8910, 0.9092, 0.9222, 0.9319, 0.9403,
    0.9477, 0.9544, 0.9602, 0.9653,
];

/// He 'a' coefficients (bar) for ZHL-16C.
const A_HE: [f64; NUM_COMPARTMENTS] = [
    1.6189, 1.3830, 1.1919, 1.0458, 0.9220, 0.8205, 0.7305, 0.6502, 0.5950, 0.5545, 0.5333, 0.5189,
    0.5181, 0.5176, 0.5172, 0.5119,
];

/// He 'b' coefficients (dimensionless) for ZHL-16C.
const B_HE: [f64; NUM_COMPARTMENTS] = [
    0.4770, 0.5747, 0.6527, 0.7223, 0.7582, 0.7957, 0.8279, 0.8553, 0.8757, 0.8903, 0.8997, 0.9073,
    0.9122, 0.9171, 0.9217, 0.9267,
];

// ============================================================================
// Model Interface
// ============================================================================

/// A decompression model the playback driver can step through a dive.
pub trait DecoModel {
    /// Hold `depth` (in the model's depth units) for `minutes` breathing `mix`.
    fn level_off(&mut self, minutes: f64, depth: f64, mix: GasMix);

    /// Shallowest depth the diver may currently ascend to.
    fn ceiling(&self) -> f64;

    /// Dump the model state under `label`.
    fn print(&self, _verbose: bool, _label: &str, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Tissue State
// ============================================================================

/// State of the 16 tissue compartments.
#[derive(Debug, Clone)]
struct TissueState {
    /// N2 partial pressure in each compartment (bar).
    p_n2: [f64; NUM_COMPARTMENTS],
    /// He partial pressure in each compartment (bar).
    p_he: [f64; NUM_COMPARTMENTS],
}

impl TissueState {
    /// Initialise tissues at surface equilibrium (breathing air).
    fn surface_equilibrium(surface_pressure: f64) -> Self {
        let p_n2_surface = (surface_pressure - P_WATER_VAPOR) * AIR_FN2;
        TissueState {
            p_n2: [p_n2_surface; NUM_COMPARTMENTS],
            p_he: [0.0; NUM_COMPARTMENTS],
        }
    }

    /// Update all compartments for a time interval at constant pressure.
    fn update(&mut self, minutes: f64, p_inspired_n2: f64, p_inspired_he: f64) {
        if minutes <= 0.0 {
            return;
        }
        for i in 0..NUM_COMPARTMENTS {
            let k_n2 = 2.0_f64.ln() / N2_HALF_TIMES[i];
            self.p_n2[i] = p_inspired_n2 + (self.p_n2[i] - p_inspired_n2) * (-k_n2 * minutes).exp();

            let k_he = 2.0_f64.ln() / HE_HALF_TIMES[i];
            self.p_he[i] = p_inspired_he + (self.p_he[i] - p_inspired_he) * (-k_he * minutes).exp();
        }
    }

    /// Weighted a, b using the Workman/Baker method, falling back to N2-only
    /// for an unloaded compartment.
    fn coefficients(&self, i: usize) -> (f64, f64) {
        let p_total = self.p_n2[i] + self.p_he[i];
        if p_total > 1e-10 {
            let a = (A_N2[i] * self.p_n2[i] + A_HE[i] * self.p_he[i]) / p_total;
            let b = (B_N2[i] * self.p_n2[i] + B_HE[i] * self.p_he[i]) / p_total;
            (a, b)
        } else {
            (A_N2[i], B_N2[i])
        }
    }

    /// Lowest ambient pressure compartment `i` tolerates at gradient factor `gf`.
    fn tolerated_pressure(&self, i: usize, gf: f64) -> f64 {
        let p_total = self.p_n2[i] + self.p_he[i];
        let (a, b) = self.coefficients(i);
        (p_total - a * gf) / (gf / b + 1.0 - gf)
    }

    /// Tolerated ambient pressure across all compartments, with the leading one.
    fn ceiling_pressure(&self, gf: f64) -> (f64, usize) {
        let mut max_p = f64::MIN;
        let mut leading = 0;
        for i in 0..NUM_COMPARTMENTS {
            let p = self.tolerated_pressure(i, gf);
            if p > max_p {
                max_p = p;
                leading = i;
            }
        }
        (max_p, leading)
    }

    /// Compute the Surface Gradient Factor (%) and leading compartment index
    /// in a single pass over all compartments.
    fn surface_gf_and_leading(&self, surface_pressure: f64) -> (f64, usize) {
        let mut max_gf: f64 = 0.0;
        let mut leading: usize = 0;
        for i in 0..NUM_COMPARTMENTS {
            let gf = self.compartment_gf(i, surface_pressure);
            if gf > max_gf {
                max_gf = gf;
                leading = i;
            }
        }
        (max_gf, leading)
    }

    /// Gradient factor for a single compartment at the given ambient pressure.
    fn compartment_gf(&self, i: usize, ambient_pressure: f64) -> f64 {
        let p_total = self.p_n2[i] + self.p_he[i];
        let (a, b) = self.coefficients(i);

        let m_value = a + ambient_pressure / b;
        let denom = m_value - ambient_pressure;

        if denom > 1e-10 {
            ((p_total - ambient_pressure) / denom) * 100.0
        } else {
            0.0
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Bühlmann ZHL-16C with gradient factors.
#[derive(Debug, Clone)]
pub struct Buhlmann {
    tissues: TissueState,
    gf_low: f64,
    gf_high: f64,
    units: DepthUnits,
    surface_pressure: f64,
    /// Deepest GF-low ceiling seen so far (bar); anchors the GF slope.
    first_stop_pressure: f64,
}

impl Buhlmann {
    /// ZHL-16C at surface equilibrium on air. Gradient factors are fractions,
    /// e.g. `zhl16c(0.20, 0.70)` for GF 20/70. Depths default to feet.
    pub fn zhl16c(gf_low: f64, gf_high: f64) -> Self {
        Buhlmann {
            tissues: TissueState::surface_equilibrium(DEFAULT_SURFACE_PRESSURE),
            gf_low,
            gf_high,
            units: DepthUnits::default(),
            surface_pressure: DEFAULT_SURFACE_PRESSURE,
            first_stop_pressure: DEFAULT_SURFACE_PRESSURE,
        }
    }

    pub fn with_units(mut self, units: DepthUnits) -> Self {
        self.units = units;
        self
    }

    /// Surface pressure in bar, e.g. 0.82 at ~1800 m altitude. Resets the
    /// tissues to equilibrium at that pressure.
    pub fn with_surface_pressure(mut self, surface_pressure_bar: f64) -> Self {
        self.surface_pressure = surface_pressure_bar;
        self.tissues = TissueState::surface_equilibrium(surface_pressure_bar);
        self.first_stop_pressure = surface_pressure_bar;
        self
    }

    pub fn units(&self) -> DepthUnits {
        self.units
    }

    /// Gradient factor (%) the tissues would reach if surfaced directly,
    /// with the index (0–15) of the leading compartment.
    pub fn surface_gf(&self) -> (f64, usize) {
        self.tissues.surface_gf_and_leading(self.surface_pressure)
    }

    fn ambient_pressure(&self, depth: f64) -> f64 {
        let hydrostatic = (self.units.to_atm(depth.max(0.0)) - 1.0) * BAR_PER_ATM;
        self.surface_pressure + hydrostatic
    }

    fn depth_at(&self, pressure: f64) -> f64 {
        let atm = (pressure - self.surface_pressure) / BAR_PER_ATM + 1.0;
        self.units.from_atm(atm).max(0.0)
    }

    fn gf_at(&self, pressure: f64) -> f64 {
        let span = self.first_stop_pressure - self.surface_pressure;
        if span <= 1e-10 {
            return self.gf_high;
        }
        let fraction = ((pressure - self.surface_pressure) / span).clamp(0.0, 1.0);
        self.gf_high + (self.gf_low - self.gf_high) * fraction
    }

    fn ceiling_pressure(&self) -> (f64, usize) {
        let (mut pressure, mut leading) = self.tissues.ceiling_pressure(self.gf_high);
        for _ in 0..CEILING_ITERATIONS {
            (pressure, leading) = self.tissues.ceiling_pressure(self.gf_at(pressure));
        }
        (pressure, leading)
    }
}

impl Default for Buhlmann {
    fn default() -> Self {
        Buhlmann::zhl16c(0.20, 0.70)
    }
}

impl DecoModel for Buhlmann {
    fn level_off(&mut self, minutes: f64, depth: f64, mix: GasMix) {
        let ambient_p = self.ambient_pressure(depth);

        // Inspired gas partial pressures (accounting for water vapour)
        let p_inspired_n2 = (ambient_p - P_WATER_VAPOR) * mix.n2();
        let p_inspired_he = (ambient_p - P_WATER_VAPOR) * mix.he;
        self.tissues.update(minutes, p_inspired_n2, p_inspired_he);

        let (first_stop, _) = self.tissues.ceiling_pressure(self.gf_low);
        if first_stop > self.first_stop_pressure {
            self.first_stop_pressure = first_stop;
        }
    }

    fn ceiling(&self) -> f64 {
        let (pressure, _) = self.ceiling_pressure();
        self.depth_at(pressure)
    }

    fn print(&self, verbose: bool, label: &str, out: &mut dyn Write) -> io::Result<()> {
        let (pressure, leading) = self.ceiling_pressure();
        let (surface_gf, _) = self.surface_gf();
        writeln!(
            out,
            "{label}: ceiling {:.1}{} leading {} surfgf {:.0}% gf {:.0}/{:.0}",
            self.depth_at(pressure),
            self.units.label(),
            leading + 1,
            surface_gf,
            self.gf_low * 100.0,
            self.gf_high * 100.0,
        )?;
        if verbose {
            for i in 0..NUM_COMPARTMENTS {
                writeln!(
                    out,
                    "  {:2} n2 {:.4} he {:.4} gf {:.0}%",
                    i + 1,
                    self.tissues.p_n2[i],
                    self.tissues.p_he[i],
                    self.tissues.compartment_gf(i, self.surface_pressure),
                )?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
