/// Per-class lamp parameters: gamut, gamma handling and protocol limits.
///
/// These travel with each fixture instead of living in globals, so lamps of
/// different classes can be driven side by side.

use crate::geometry::{GAMUT_A, GAMUT_B, GAMUT_C, Gamut};

/// Color temperature limits in mireds. The low end is the coolest white.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtRange {
    pub min: u16,
    pub max: u16,
}

impl CtRange {
    pub const HUE: CtRange = CtRange { min: 153, max: 500 };

    /// Map `t` in [0, 1] to mireds. Higher `t` gives a lower mired value,
    /// i.e. a higher color temperature.
    pub fn mireds(&self, t: f64) -> u16 {
        let span = f64::from(self.max - self.min);
        ((1.0 - t) * span + f64::from(self.min)).round() as u16
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixtureProfile {
    pub gamut: Gamut,
    pub gamma_correct: bool,
    pub ct_range: CtRange,
    /// Fade the lamp applies when `transitiontime` is omitted.
    pub implicit_transition_time: u16,
    /// Fade a freshly opened fixture is configured with.
    pub default_transition_time: u16,
}

impl FixtureProfile {
    /// Deciseconds. Matches the bridge default.
    pub const HUE_TRANSITION_TIME: u16 = 4;

    pub const fn hue(gamut: Gamut) -> Self {
        Self {
            gamut,
            gamma_correct: true,
            ct_range: CtRange::HUE,
            implicit_transition_time: Self::HUE_TRANSITION_TIME,
            default_transition_time: Self::HUE_TRANSITION_TIME,
        }
    }

    pub const LIVING_COLORS: FixtureProfile = FixtureProfile::hue(GAMUT_A);
    pub const HUE_BULB: FixtureProfile = FixtureProfile::hue(GAMUT_B);
    pub const HUE_BULB_GEN3: FixtureProfile = FixtureProfile::hue(GAMUT_C);
}

impl Default for FixtureProfile {
    fn default() -> Self {
        Self::HUE_BULB
    }
}
