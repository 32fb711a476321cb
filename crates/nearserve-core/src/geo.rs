//! Coordinates, great-circle distance and resolved place descriptors.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const EARTH_RADIUS_KM: f64 = 6371.0;

pub const UNKNOWN_CITY: &str = "Unknown City";
pub const UNKNOWN_STATE: &str = "Unknown State";

/// A validated WGS84 point.
///
/// Construction goes through [`Coordinate::new`] (or serde, which uses the
/// same check), so every value in circulation satisfies
/// `latitude ∈ [-90, 90]` and `longitude ∈ [-180, 180]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoreError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when either component is out
    /// of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lng_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        if !lat_ok || !lng_ok {
            return Err(CoreError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometres (haversine formula).
    #[must_use]
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlng = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (dlng / 2.0).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Human-meaningful place a coordinate resolved to.
///
/// When reverse geocoding fails the city and state carry the
/// [`UNKNOWN_CITY`] / [`UNKNOWN_STATE`] sentinels so scope labels remain
/// renderable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceInfo {
    pub city: String,
    pub state: String,
    pub country: String,
}

impl PlaceInfo {
    /// Sentinel place used whenever resolution fails.
    #[must_use]
    pub fn unknown(default_country: &str) -> Self {
        Self {
            city: UNKNOWN_CITY.to_owned(),
            state: UNKNOWN_STATE.to_owned(),
            country: default_country.to_owned(),
        }
    }

    /// Fills blank fields with sentinels so a partially resolved place still
    /// binds every scope rung to a non-empty name.
    #[must_use]
    pub fn with_fallbacks(self, default_country: &str) -> Self {
        let pick = |value: String, fallback: &str| {
            if value.trim().is_empty() {
                fallback.to_owned()
            } else {
                value
            }
        };
        Self {
            city: pick(self.city, UNKNOWN_CITY),
            state: pick(self.state, UNKNOWN_STATE),
            country: pick(self.country, default_country),
        }
    }

    /// `true` unless city and state are both sentinels.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.city != UNKNOWN_CITY || self.state != UNKNOWN_STATE
    }
}

impl std::fmt::Display for PlaceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {}", self.city, self.state, self.country)
    }
}
