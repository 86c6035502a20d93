// Nearby discovery - query service client and renderer view model
use crate::application::proximity_client::{NearbyQuery, ProximityClient};
use crate::domain::candidate::{NearbyCandidate, RadiusSelection};
use crate::domain::layout::{filter_by_radius, marker_position};
use crate::domain::position::Position;
use std::sync::Arc;

/// Fetches nearby candidates for a center point. Query failures are recovered
/// locally: the caller gets an empty list and the map simply shows no nearby
/// users this cycle.
#[derive(Clone)]
pub struct NearbyDiscoveryService {
    client: Arc<dyn ProximityClient>,
}

impl NearbyDiscoveryService {
    pub fn new(client: Arc<dyn ProximityClient>) -> Self {
        Self { client }
    }

    pub async fn fetch(
        &self,
        center: &Position,
        radius: RadiusSelection,
        limit: usize,
        include_non_public: bool,
    ) -> Vec<NearbyCandidate> {
        let query = NearbyQuery {
            latitude: center.latitude,
            longitude: center.longitude,
            radius_km: radius.km(),
            limit,
            include_non_public,
        };

        match self.client.find_nearby(&query).await {
            Ok(users) => users,
            Err(e) => {
                tracing::warn!("nearby query failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    AwaitingLocation,
    Ready,
}

/// A candidate paired with where to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
    pub candidate: NearbyCandidate,
    pub display: Position,
}

/// Renderer state for the nearby map.
///
/// Starts in `AwaitingLocation`; the first own-position fix moves it to
/// `Ready` and every later center or radius change re-derives the filtered
/// view synchronously. The candidate list is an immutable snapshot between
/// `set_candidates` calls.
#[derive(Debug, Clone)]
pub struct NearbyView {
    center: Option<Position>,
    radius: RadiusSelection,
    candidates: Vec<NearbyCandidate>,
}

impl NearbyView {
    pub fn new() -> Self {
        Self {
            center: None,
            radius: RadiusSelection::default(),
            candidates: Vec::new(),
        }
    }

    pub fn state(&self) -> ViewState {
        match self.center {
            Some(_) => ViewState::Ready,
            None => ViewState::AwaitingLocation,
        }
    }

    /// The map auto-centers here whenever center or radius changes.
    pub fn center(&self) -> Option<&Position> {
        self.center.as_ref()
    }

    pub fn radius(&self) -> RadiusSelection {
        self.radius
    }

    pub fn set_center(&mut self, center: Position) {
        self.center = Some(center);
    }

    pub fn set_radius(&mut self, radius: RadiusSelection) {
        self.radius = radius;
    }

    pub fn set_candidates(&mut self, candidates: Vec<NearbyCandidate>) {
        self.candidates = candidates;
    }

    /// Radius-filtered candidates with display positions. Empty until the own
    /// position is known.
    pub fn markers(&self) -> Vec<MarkerView> {
        let Some(center) = self.center else {
            return Vec::new();
        };

        let visible = filter_by_radius(&self.candidates, self.radius);
        let total = visible.len();
        visible
            .into_iter()
            .enumerate()
            .map(|(index, candidate)| {
                let display = marker_position(&center, &candidate, index, total);
                MarkerView { candidate, display }
            })
            .collect()
    }
}

impl Default for NearbyView {
    fn default() -> Self {
        Self::new()
    }
}
