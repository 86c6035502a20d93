// Geographic position domain model
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Degrees of latitude/longitude spanned by one kilometre, as the fixed
/// approximation used for the synthetic marker layout.
pub const KM_PER_DEGREE: f64 = 111.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Error, PartialEq)]
pub enum InvalidPosition {
    #[error("latitude {0} outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} outside [-180, 180]")]
    Longitude(f64),
}

/// A WGS84 coordinate pair. Ephemeral: exists as a transient sample or query
/// parameter, never persisted by this pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidPosition> {
        if !(-90.0..=90.0).contains(&latitude) || !latitude.is_finite() {
            return Err(InvalidPosition::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) || !longitude.is_finite() {
            return Err(InvalidPosition::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn validate(&self) -> Result<(), InvalidPosition> {
        Self::new(self.latitude, self.longitude).map(|_| ())
    }
}

/// One observation from the platform position watch. Accuracy and recency are
/// carried opaquely downstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub position: Position,
    pub accuracy_m: Option<f64>,
    pub timestamp_ms: i64,
}

impl PositionFix {
    pub fn new(position: Position, accuracy_m: Option<f64>, timestamp_ms: i64) -> Self {
        Self {
            position,
            accuracy_m,
            timestamp_ms,
        }
    }
}

/// Euclidean distance in degree space. Not geodesically exact: one degree of
/// longitude shrinks with latitude. The movement gate uses this on purpose to
/// stay compatible with the reporting behavior of existing clients.
pub fn degree_distance(a: &Position, b: &Position) -> f64 {
    let dlat = a.latitude - b.latitude;
    let dlon = a.longitude - b.longitude;
    (dlat * dlat + dlon * dlon).sqrt()
}

/// Great-circle distance in kilometres. Used server-side where the radius
/// search needs geodesic accuracy.
pub fn haversine_km(a: &Position, b: &Position) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Convert a radial distance in kilometres to degrees via the fixed km/111
/// approximation used by the marker layout.
pub fn km_to_degrees(km: f64) -> f64 {
    km / KM_PER_DEGREE
}
