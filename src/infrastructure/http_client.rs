// HTTP implementation of the proximity client contract
use crate::application::proximity_client::{NearbyQuery, ProximityClient, ProximityError};
use crate::domain::candidate::NearbyCandidate;
use crate::domain::position::Position;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const UPDATE_ENDPOINT: &str = "/update-location";
const QUERY_ENDPOINT: &str = "/find-nearby-users";

#[derive(Debug, Serialize)]
struct LocationUpdateBody {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    users: Vec<NearbyCandidate>,
}

#[derive(Debug, Clone)]
pub struct HttpProximityClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpProximityClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn transport(endpoint: &'static str, e: reqwest::Error) -> ProximityError {
        ProximityError::Transport {
            endpoint,
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl ProximityClient for HttpProximityClient {
    async fn report_location(
        &self,
        position: &Position,
        token: &str,
    ) -> Result<(), ProximityError> {
        let body = LocationUpdateBody {
            latitude: position.latitude,
            longitude: position.longitude,
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, UPDATE_ENDPOINT))
            .header("Authorization", format!("Bearer {}", token))
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::transport(UPDATE_ENDPOINT, e))?;

        // No response body contract; any non-2xx is a generic failure.
        if !response.status().is_success() {
            return Err(ProximityError::Status {
                endpoint: UPDATE_ENDPOINT,
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn find_nearby(
        &self,
        query: &NearbyQuery,
    ) -> Result<Vec<NearbyCandidate>, ProximityError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, QUERY_ENDPOINT))
            .json(query)
            .send()
            .await
            .map_err(|e| Self::transport(QUERY_ENDPOINT, e))?;

        if !response.status().is_success() {
            return Err(ProximityError::Status {
                endpoint: QUERY_ENDPOINT,
                status: response.status().as_u16(),
            });
        }

        let data = response
            .json::<NearbyResponse>()
            .await
            .map_err(|e| Self::transport(QUERY_ENDPOINT, e))?;
        Ok(data.users)
    }
}
