// Radius filtering and marker layout for the nearby map view
use crate::domain::candidate::{NearbyCandidate, RadiusSelection};
use crate::domain::position::{Position, km_to_degrees};

/// Keep candidates within the selected radius, preserving input order.
/// Pure function of `(candidates, radius)`.
pub fn filter_by_radius(
    candidates: &[NearbyCandidate],
    radius: RadiusSelection,
) -> Vec<NearbyCandidate> {
    candidates
        .iter()
        .filter(|c| c.distance_km <= radius.km())
        .cloned()
        .collect()
}

/// Display position for one visible candidate.
///
/// True coordinates win when the service shared them. Otherwise candidates are
/// placed at equal angular intervals around the center, at a radial offset of
/// `distance_km / 111` degrees. The ring is a placeholder visualization for
/// users without stored exact positions, deterministic in
/// `(center, candidate, index, total)`.
pub fn marker_position(
    center: &Position,
    candidate: &NearbyCandidate,
    index: usize,
    total: usize,
) -> Position {
    if let (Some(lat), Some(lon)) = (candidate.latitude, candidate.longitude) {
        return Position {
            latitude: lat,
            longitude: lon,
        };
    }

    let angle = if total == 0 {
        0.0
    } else {
        2.0 * std::f64::consts::PI * (index as f64) / (total as f64)
    };
    let radial_deg = km_to_degrees(candidate.distance_km);

    Position {
        latitude: center.latitude + radial_deg * angle.cos(),
        longitude: center.longitude + radial_deg * angle.sin(),
    }
}
