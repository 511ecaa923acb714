use serde::{Deserialize, Serialize};

/// Per-postal-code adjustments to the proximity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOverride {
    pub postal_code: String,
    /// Radius used when the caller gives none
    #[serde(default)]
    pub radius_miles: Option<f64>,
    /// Place name to boost instead of the geocode's own place name
    #[serde(default)]
    pub expected_place: Option<String>,
}

/// Tunables for postal-code proximity search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPolicy {
    pub default_radius_miles: f64,
    pub min_radius_miles: f64,
    pub max_radius_miles: f64,
    /// Characters kept for the approximate geocode fallback
    pub prefix_len: usize,
    /// Sort channels named after the searched place ahead of closer ones
    pub boost_expected_place: bool,
    pub overrides: Vec<PlaceOverride>,
}

pub const DEFAULT_RADIUS_MILES: f64 = 30.0;
pub const MIN_RADIUS_MILES: f64 = 1.0;
pub const MAX_RADIUS_MILES: f64 = 100.0;
pub const DEFAULT_PREFIX_LEN: usize = 3;

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            default_radius_miles: DEFAULT_RADIUS_MILES,
            min_radius_miles: MIN_RADIUS_MILES,
            max_radius_miles: MAX_RADIUS_MILES,
            prefix_len: DEFAULT_PREFIX_LEN,
            boost_expected_place: true,
            overrides: Vec::new(),
        }
    }
}

impl SearchPolicy {
    /// Usable `(min, max)` radius bounds
    ///
    /// Non-finite bounds fall back to [`MIN_RADIUS_MILES`] / [`MAX_RADIUS_MILES`]
    /// and reversed bounds are swapped, so the pair is always safe for `clamp`.
    pub fn radius_bounds(&self) -> (f64, f64) {
        let min = finite_or(self.min_radius_miles, MIN_RADIUS_MILES);
        let max = finite_or(self.max_radius_miles, MAX_RADIUS_MILES);
        if min <= max { (min, max) } else { (max, min) }
    }

    /// Clamp a radius into the allowed range; non-finite values become the default
    pub fn clamp_radius(&self, radius: f64) -> f64 {
        if !radius.is_finite() {
            return self.default_radius();
        }

        let (min, max) = self.radius_bounds();
        radius.clamp(min, max)
    }

    /// The configured default, itself kept inside the allowed range
    pub fn default_radius(&self) -> f64 {
        let (min, max) = self.radius_bounds();
        finite_or(self.default_radius_miles, DEFAULT_RADIUS_MILES).clamp(min, max)
    }

    pub fn override_for(&self, postal_code: &str) -> Option<&PlaceOverride> {
        self.overrides
            .iter()
            .find(|o| o.postal_code.trim() == postal_code)
    }

    /// Radius for a postal code when the caller did not give one
    pub fn implicit_radius(&self, postal_code: &str) -> f64 {
        self.override_for(postal_code)
            .and_then(|o| o.radius_miles)
            .map(|r| self.clamp_radius(r))
            .unwrap_or_else(|| self.default_radius())
    }

    /// Place name to boost, if boosting is enabled
    pub fn expected_place<'a>(&'a self, postal_code: &str, place_name: &'a str) -> Option<&'a str> {
        if !self.boost_expected_place {
            return None;
        }

        let place = self
            .override_for(postal_code)
            .and_then(|o| o.expected_place.as_deref())
            .unwrap_or(place_name)
            .trim();

        (!place.is_empty()).then_some(place)
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}
