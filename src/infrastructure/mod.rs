// Infrastructure layer - External dependencies and adapters
pub mod channel_watch;
pub mod config;
pub mod http_client;
pub mod memory_directory;
