// Proximity query service - Ingestion and radius search over the directory
use crate::application::proximity_client::NearbyQuery;
use crate::application::user_directory::{UserDirectory, UserRecord};
use crate::domain::candidate::NearbyCandidate;
use crate::domain::position::{InvalidPosition, Position, haversine_km};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryServiceError {
    #[error("unknown access token")]
    UnknownToken,
    #[error(transparent)]
    InvalidPosition(#[from] InvalidPosition),
}

#[derive(Clone)]
pub struct NearbyQueryService {
    directory: Arc<dyn UserDirectory>,
    max_limit: usize,
}

impl NearbyQueryService {
    pub fn new(directory: Arc<dyn UserDirectory>, max_limit: usize) -> Self {
        Self {
            directory,
            max_limit,
        }
    }

    /// Ingest one location report from an authenticated user.
    pub async fn update_location(
        &self,
        token: &str,
        position: Position,
        time_ms: i64,
    ) -> Result<(), QueryServiceError> {
        position.validate()?;
        let user = self
            .directory
            .find_by_token(token)
            .await
            .ok_or(QueryServiceError::UnknownToken)?;

        self.directory
            .record_position(&user.username, position, time_ms)
            .await;
        tracing::debug!("recorded position for {}", user.username);
        Ok(())
    }

    /// Radius search around the query center. The requester, when known, is
    /// excluded from their own results. Output order is not contractual.
    pub async fn search(
        &self,
        query: &NearbyQuery,
        requester_token: Option<&str>,
    ) -> Result<Vec<NearbyCandidate>, QueryServiceError> {
        let center = Position::new(query.latitude, query.longitude)?;
        let requester = match requester_token {
            Some(token) => self.directory.find_by_token(token).await,
            None => None,
        };

        let limit = query.limit.clamp(1, self.max_limit.max(1));
        let mut users = Vec::new();
        for (record, position) in self.directory.located_users().await {
            if let Some(req) = &requester {
                if record.username == req.username {
                    continue;
                }
            }
            if !record.public && !query.include_non_public {
                continue;
            }

            let distance_km = haversine_km(&center, &position);
            if distance_km > query.radius_km {
                continue;
            }

            users.push(Self::to_candidate(record, position, distance_km));
            if users.len() == limit {
                break;
            }
        }

        Ok(users)
    }

    fn to_candidate(record: UserRecord, position: Position, distance_km: f64) -> NearbyCandidate {
        let (latitude, longitude) = if record.share_exact_position {
            (Some(position.latitude), Some(position.longitude))
        } else {
            (None, None)
        };

        NearbyCandidate {
            username: record.username,
            fullname: record.fullname,
            profile_img: record.profile_img,
            distance_km,
            profession: record.profession,
            latitude,
            longitude,
        }
    }
}
