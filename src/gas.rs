//! Breathing gas mixtures.

/// A breathing gas as O2 and He fractions; the remainder is nitrogen.
#[derive(Clone, Copy, Debug, PartialEq, uniffi::Record)]
pub struct GasMix {
    /// Fraction of O2 (0.0–1.0)
    pub o2: f64,
    /// Fraction of He (0.0–1.0)
    pub he: f64,
}

impl GasMix {
    /// Trimix from percentages, e.g. `trimix(18, 45)` for 18/45.
    pub fn trimix(o2_percent: u8, he_percent: u8) -> Self {
        GasMix {
            o2: f64::from(o2_percent) / 100.0,
            he: f64::from(he_percent) / 100.0,
        }
    }

    pub fn air() -> Self {
        GasMix { o2: 0.21, he: 0.0 }
    }

    /// Both fractions lie in `0.0..=1.0` and together do not exceed 1.
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.o2) && (0.0..=1.0).contains(&self.he) && self.o2 + self.he <= 1.0
    }

    /// Fraction of N2.
    pub fn n2(&self) -> f64 {
        (1.0 - self.o2 - self.he).max(0.0)
    }

    /// Loop gas of a closed-circuit rebreather holding `ppo2` at
    /// `ambient_atm`, with `diluent` supplying the inert fraction.
    ///
    /// The O2 fraction never drops below the diluent's own and never
    /// exceeds pure oxygen. The inert remainder keeps the diluent's He:N2
    /// ratio.
    pub fn rebreather(diluent: GasMix, ambient_atm: f64, ppo2: f64) -> Self {
        if ambient_atm <= 0.0 {
            return diluent;
        }
        // diluent.o2 may be above 1.0 or NaN, which clamp rejects
        let o2 = (ppo2 / ambient_atm).max(diluent.o2).min(1.0);
        let inert = 1.0 - o2;
        let diluent_inert = diluent.he + diluent.n2();
        let he = if diluent_inert > 0.0 {
            inert * diluent.he / diluent_inert
        } else {
            0.0
        };
        GasMix { o2, he }
    }
}
