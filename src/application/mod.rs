// Application layer - Services and trait seams
pub mod discovery_service;
pub mod location_watch;
pub mod proximity_client;
pub mod query_service;
pub mod reporting_service;
pub mod user_directory;
