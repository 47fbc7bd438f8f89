use serde::{Deserialize, Serialize};

/// Metres in one US survey statute mile.
pub const METERS_PER_US_STATUTE_MILE: f64 = 1609.347_218_694_4;

/// Metres in one international statute mile.
pub const METERS_PER_INT_STATUTE_MILE: f64 = 1609.344;

/// Metres in one international nautical mile.
pub const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;

/// A length unit that measured metres can be reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    /// US survey statute mile.
    StatuteMiles,
    /// International statute mile.
    IntStatuteMiles,
    NauticalMiles,
}

impl LengthUnit {
    /// Metres in one of this unit.
    #[must_use]
    pub const fn meters_per_unit(self) -> f64 {
        match self {
            Self::StatuteMiles => METERS_PER_US_STATUTE_MILE,
            Self::IntStatuteMiles => METERS_PER_INT_STATUTE_MILE,
            Self::NauticalMiles => METERS_PER_NAUTICAL_MILE,
        }
    }

    /// Convert a length in metres to this unit.
    #[must_use]
    pub fn from_meters(self, meters: f64) -> f64 {
        meters / self.meters_per_unit()
    }
}

/// Round to `places` decimal places, halves away from zero.
#[must_use]
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10_f64.powi(places as i32);
    (value * factor).round() / factor
}
