// Client-side contract of the proximity query service
use crate::domain::candidate::NearbyCandidate;
use crate::domain::position::Position;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProximityError {
    #[error("{endpoint} returned status {status}")]
    Status { endpoint: &'static str, status: u16 },
    #[error("request to {endpoint} failed: {reason}")]
    Transport {
        endpoint: &'static str,
        reason: String,
    },
}

/// Body of `POST /find-nearby-users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub limit: usize,
    pub include_non_public: bool,
}

/// The two operations this pipeline consumes from the proximity service.
///
/// `report_location` is fire-and-forget from the caller's perspective: any
/// error is recovered locally by dropping the report and waiting for the next
/// qualifying movement. `find_nearby` returns candidates in no contractual
/// order; callers must not depend on ordering.
#[async_trait]
pub trait ProximityClient: Send + Sync {
    async fn report_location(&self, position: &Position, token: &str)
    -> Result<(), ProximityError>;

    async fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<NearbyCandidate>, ProximityError>;
}
