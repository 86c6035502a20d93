// Application state for HTTP handlers
use crate::application::query_service::NearbyQueryService;

#[derive(Clone)]
pub struct AppState {
    pub query_service: NearbyQueryService,
}
