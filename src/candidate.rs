//! Candidate exoplanet parameters and the stellar temperature tint.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Parameters of the user-controlled candidate, sent verbatim as the request body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateParameters {
    #[serde(rename = "OrbitalPeriod_days")]
    pub orbital_period_days: f64,
    #[serde(rename = "TransitDuration_hrs")]
    pub transit_duration_hrs: f64,
    #[serde(rename = "PlanetaryRadius_EarthRadii")]
    pub planetary_radius_earth_radii: f64,
    #[serde(rename = "StellarTemp_K")]
    pub stellar_temp_k: f64,
}

impl Default for CandidateParameters {
    fn default() -> Self {
        Self {
            orbital_period_days: 365.0,
            transit_duration_hrs: 2.0,
            planetary_radius_earth_radii: 1.0,
            stellar_temp_k: 5778.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CandidateParam {
    PlanetaryRadius,
    OrbitalPeriod,
    TransitDuration,
    StellarTemp,
}

impl CandidateParam {
    /// Slider order in the side panel.
    pub const ALL: [CandidateParam; 4] = [
        CandidateParam::PlanetaryRadius,
        CandidateParam::OrbitalPeriod,
        CandidateParam::TransitDuration,
        CandidateParam::StellarTemp,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CandidateParam::PlanetaryRadius => "Planetary Radius (Earths)",
            CandidateParam::OrbitalPeriod => "Orbital Period (days)",
            CandidateParam::TransitDuration => "Transit Duration (hours)",
            CandidateParam::StellarTemp => "Stellar Temperature (K)",
        }
    }

    /// Field name on the wire.
    pub fn key(&self) -> &'static str {
        match self {
            CandidateParam::PlanetaryRadius => "PlanetaryRadius_EarthRadii",
            CandidateParam::OrbitalPeriod => "OrbitalPeriod_days",
            CandidateParam::TransitDuration => "TransitDuration_hrs",
            CandidateParam::StellarTemp => "StellarTemp_K",
        }
    }

    pub fn range(&self) -> RangeInclusive<f64> {
        match self {
            CandidateParam::PlanetaryRadius => 0.1..=15.0,
            CandidateParam::OrbitalPeriod => 1.0..=2000.0,
            CandidateParam::TransitDuration => 0.1..=24.0,
            CandidateParam::StellarTemp => 2000.0..=15000.0,
        }
    }

    pub fn step(&self) -> f64 {
        match self {
            CandidateParam::PlanetaryRadius => 0.1,
            CandidateParam::OrbitalPeriod => 1.0,
            CandidateParam::TransitDuration => 0.1,
            CandidateParam::StellarTemp => 100.0,
        }
    }
}

impl CandidateParameters {
    pub fn get(&self, param: CandidateParam) -> f64 {
        match param {
            CandidateParam::PlanetaryRadius => self.planetary_radius_earth_radii,
            CandidateParam::OrbitalPeriod => self.orbital_period_days,
            CandidateParam::TransitDuration => self.transit_duration_hrs,
            CandidateParam::StellarTemp => self.stellar_temp_k,
        }
    }

    fn slot(&mut self, param: CandidateParam) -> &mut f64 {
        match param {
            CandidateParam::PlanetaryRadius => &mut self.planetary_radius_earth_radii,
            CandidateParam::OrbitalPeriod => &mut self.orbital_period_days,
            CandidateParam::TransitDuration => &mut self.transit_duration_hrs,
            CandidateParam::StellarTemp => &mut self.stellar_temp_k,
        }
    }

    /// Update one parameter, leaving the others untouched.
    ///
    /// Returns `true` when the stored value changed.
    pub fn set(&mut self, param: CandidateParam, value: f64) -> bool {
        let slot = self.slot(param);
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }
}

/// Tint applied to the candidate based on its host star.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StellarTint {
    Cool,
    Neutral,
    Warm,
}

pub const COOL_BELOW_K: f64 = 3500.0;
pub const WARM_ABOVE_K: f64 = 7000.0;

pub fn stellar_tint(temp_k: f64) -> StellarTint {
    if temp_k < COOL_BELOW_K {
        StellarTint::Cool
    } else if temp_k > WARM_ABOVE_K {
        StellarTint::Warm
    } else {
        StellarTint::Neutral
    }
}

impl StellarTint {
    /// Multiplicative RGB factor applied to the candidate texture.
    pub fn color(&self) -> [u8; 3] {
        match self {
            StellarTint::Cool => [150, 190, 255],
            StellarTint::Neutral => [255, 255, 255],
            StellarTint::Warm => [255, 180, 120],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StellarTint::Cool => "cool",
            StellarTint::Neutral => "neutral",
            StellarTint::Warm => "warm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tint_follows_the_temperature_bands() {
        assert_eq!(stellar_tint(3000.0), StellarTint::Cool);
        assert_eq!(stellar_tint(5778.0), StellarTint::Neutral);
        assert_eq!(stellar_tint(8000.0), StellarTint::Warm);
    }

    #[test]
    fn tint_band_edges_are_neutral() {
        assert_eq!(stellar_tint(3500.0), StellarTint::Neutral);
        assert_eq!(stellar_tint(7000.0), StellarTint::Neutral);
        assert_eq!(stellar_tint(3499.9), StellarTint::Cool);
        assert_eq!(stellar_tint(7000.1), StellarTint::Warm);
    }

    #[test]
    fn tint_is_total() {
        assert_eq!(stellar_tint(f64::NAN), StellarTint::Neutral);
        assert_eq!(stellar_tint(f64::NEG_INFINITY), StellarTint::Cool);
        assert_eq!(stellar_tint(f64::INFINITY), StellarTint::Warm);
        assert_eq!(stellar_tint(-1.0), StellarTint::Cool);
    }

    #[test]
    fn set_changes_only_the_named_parameter() {
        for param in CandidateParam::ALL {
            let before = CandidateParameters::default();
            let mut after = before;
            assert!(after.set(param, 12.5));
            for other in CandidateParam::ALL {
                if other == param {
                    assert_eq!(after.get(other), 12.5);
                } else {
                    assert_eq!(after.get(other), before.get(other), "{:?} leaked into {:?}", param, other);
                }
            }
        }
    }

    #[test]
    fn set_reports_unchanged_values() {
        let mut params = CandidateParameters::default();
        assert!(!params.set(CandidateParam::StellarTemp, 5778.0));
        assert!(params.set(CandidateParam::StellarTemp, 5800.0));
    }

    #[test]
    fn serializes_with_the_wire_field_names() {
        let value = serde_json::to_value(CandidateParameters::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        for param in CandidateParam::ALL {
            assert_eq!(obj[param.key()].as_f64(), Some(CandidateParameters::default().get(param)));
        }
    }

    #[test]
    fn defaults_sit_inside_slider_ranges() {
        let params = CandidateParameters::default();
        for param in CandidateParam::ALL {
            assert!(param.range().contains(&params.get(param)), "{}", param.label());
            assert!(param.step() > 0.0);
        }
    }
}
