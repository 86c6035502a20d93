// HTTP request handlers
use crate::application::proximity_client::NearbyQuery;
use crate::application::query_service::QueryServiceError;
use crate::domain::candidate::NearbyCandidate;
use crate::domain::position::Position;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct LocationUpdateBody {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct NearbyResponseBody {
    pub users: Vec<NearbyCandidate>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Ingest a location report from an authenticated user
pub async fn update_location(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<LocationUpdateBody>,
) -> impl IntoResponse {
    let Some(token) = bearer_token(&headers) else {
        return StatusCode::UNAUTHORIZED;
    };

    let position = Position {
        latitude: body.latitude,
        longitude: body.longitude,
    };
    let now_ms = chrono::Utc::now().timestamp_millis();

    match state
        .query_service
        .update_location(token, position, now_ms)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(QueryServiceError::UnknownToken) => StatusCode::UNAUTHORIZED,
        Err(QueryServiceError::InvalidPosition(e)) => {
            tracing::debug!("rejected location update: {}", e);
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

/// Radius search for users near a center point
pub async fn find_nearby_users(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(query): Json<NearbyQuery>,
) -> impl IntoResponse {
    let requester = bearer_token(&headers);

    match state.query_service.search(&query, requester).await {
        Ok(users) => Json(NearbyResponseBody { users }).into_response(),
        Err(QueryServiceError::InvalidPosition(e)) => {
            tracing::debug!("rejected nearby query: {}", e);
            StatusCode::UNPROCESSABLE_ENTITY.into_response()
        }
        Err(e) => {
            tracing::error!("nearby query failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
