// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::application::discovery_service::{NearbyDiscoveryService, NearbyView};
use crate::application::location_watch::WatchOptions;
use crate::application::proximity_client::ProximityClient;
use crate::application::query_service::NearbyQueryService;
use crate::application::reporting_service::DiscoverySession;
use crate::domain::candidate::RadiusSelection;
use crate::domain::position::{Position, PositionFix};
use crate::infrastructure::channel_watch::ChannelPositionWatch;
use crate::infrastructure::config::{
    ProbeSettings, load_probe_config, load_service_config, load_users_config,
};
use crate::infrastructure::http_client::HttpProximityClient;
use crate::infrastructure::memory_directory::InMemoryDirectory;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{find_nearby_users, health_check, update_location};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let service_config = load_service_config()?;
    let users_config = load_users_config()?;
    let probe_config = load_probe_config()?;

    // Directory seeded from config (infrastructure layer)
    let directory = Arc::new(InMemoryDirectory::from_entries(users_config.users));
    tracing::info!("seeded directory with {} users", directory.len());

    // Services (application layer)
    let query_service =
        NearbyQueryService::new(directory, service_config.service.max_query_limit);

    let state = Arc::new(AppState { query_service });

    // Router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/update-location", post(update_location))
        .route("/find-nearby-users", post(find_nearby_users))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Optional demo probe walking a scripted path against this service
    if probe_config.probe.enabled {
        tokio::spawn(run_probe(probe_config.probe));
    }

    let addr: SocketAddr = service_config.service.listen_addr.parse()?;
    tracing::info!("starting nearby-discovery service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

/// Feed a scripted walk through the full client pipeline: channel watch,
/// throttle gate, HTTP reporter against the local endpoints.
async fn run_probe(settings: ProbeSettings) {
    if settings.path.is_empty() {
        tracing::warn!("probe enabled but no path configured");
        return;
    }

    let client: Arc<dyn ProximityClient> =
        Arc::new(HttpProximityClient::new(settings.base_url.clone()));
    let (watch, feed) = ChannelPositionWatch::pair(16);

    let Some(session) = DiscoverySession::start(
        &watch,
        client.clone(),
        &settings.token,
        WatchOptions::default(),
    )
    .await
    else {
        tracing::info!("probe session not activated");
        return;
    };

    let last_waypoint = settings.path.last().copied();
    let interval = Duration::from_millis(settings.step_interval_ms);
    for [lat, lon] in settings.path {
        tokio::time::sleep(interval).await;
        match Position::new(lat, lon) {
            Ok(position) => {
                let fix =
                    PositionFix::new(position, None, chrono::Utc::now().timestamp_millis());
                if feed.send(fix).await.is_err() {
                    break;
                }
            }
            Err(e) => tracing::warn!("skipping probe waypoint: {}", e),
        }
    }
    drop(feed);

    let stats = session.end().await;
    tracing::info!("probe walk finished: {:?}", stats);

    // Render who is nearby from the final waypoint
    let Some(center) = last_waypoint.and_then(|[lat, lon]| Position::new(lat, lon).ok()) else {
        return;
    };
    let radius = RadiusSelection::try_from_km(settings.radius_km).unwrap_or_default();
    let discovery = NearbyDiscoveryService::new(client);

    let mut view = NearbyView::new();
    view.set_center(center);
    view.set_radius(radius);
    view.set_candidates(discovery.fetch(&center, radius, 50, false).await);

    for marker in view.markers() {
        tracing::info!(
            "nearby: {} ({:.1} km) drawn at ({:.4}, {:.4})",
            marker.candidate.username,
            marker.candidate.distance_km,
            marker.display.latitude,
            marker.display.longitude
        );
    }
}
