// Location reporting pipeline - Sampler subscription, gate, reporter
use crate::application::location_watch::{PositionWatch, WatchGuard, WatchOptions};
use crate::application::proximity_client::ProximityClient;
use crate::domain::gate::{GateDecision, LastReportedSample, ReportGate};
use crate::domain::position::PositionFix;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixOutcome {
    Reported,
    Gated,
    Invalid,
    ReportFailed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportStats {
    pub reported: u64,
    pub gated: u64,
    pub invalid: u64,
    pub failed: u64,
}

impl ReportStats {
    fn record(&mut self, outcome: FixOutcome) {
        match outcome {
            FixOutcome::Reported => self.reported += 1,
            FixOutcome::Gated => self.gated += 1,
            FixOutcome::Invalid => self.invalid += 1,
            FixOutcome::ReportFailed => self.failed += 1,
        }
    }
}

/// Runs the gate and the reporter over a single observation stream.
///
/// Fixes are handled serially, so at most one report is in flight per
/// forwarded sample. The gate is evaluated against each fix's own platform
/// timestamp, which keeps the throttle decision a pure function of the sample
/// stream.
pub struct LocationReportingService {
    client: Arc<dyn ProximityClient>,
    token: String,
    gate: ReportGate,
}

impl LocationReportingService {
    pub fn new(client: Arc<dyn ProximityClient>, token: String) -> Self {
        Self {
            client,
            token,
            gate: ReportGate::new(),
        }
    }

    pub async fn handle_fix(&mut self, fix: &PositionFix) -> FixOutcome {
        if let Err(e) = fix.position.validate() {
            tracing::debug!("skipping invalid fix: {}", e);
            return FixOutcome::Invalid;
        }

        match self.gate.evaluate(&fix.position, fix.timestamp_ms) {
            GateDecision::Forward => {}
            decision => {
                tracing::trace!("fix gated: {:?}", decision);
                return FixOutcome::Gated;
            }
        }

        match self
            .client
            .report_location(&fix.position, &self.token)
            .await
        {
            Ok(()) => {
                self.gate.commit(&fix.position, fix.timestamp_ms);
                tracing::debug!(
                    "reported location ({:.4}, {:.4})",
                    fix.position.latitude,
                    fix.position.longitude
                );
                FixOutcome::Reported
            }
            Err(e) => {
                // Recovered locally: the gate baseline stays put, so the next
                // qualifying sample retries against the old baseline.
                tracing::debug!("location report dropped: {}", e);
                FixOutcome::ReportFailed
            }
        }
    }

    pub async fn run(mut self, mut fixes: mpsc::Receiver<PositionFix>) -> ReportStats {
        let mut stats = ReportStats::default();
        while let Some(fix) = fixes.recv().await {
            stats.record(self.handle_fix(&fix).await);
        }
        tracing::debug!("report loop ended: {:?}", stats);
        stats
    }

    pub fn last_reported(&self) -> &LastReportedSample {
        self.gate.last_reported()
    }
}

/// One activated reporting session. `end` cancels the observation and waits
/// for the loop to drain; dropping the handle cancels without waiting.
pub struct SessionHandle {
    _guard: WatchGuard,
    task: JoinHandle<ReportStats>,
}

impl SessionHandle {
    pub async fn end(self) -> ReportStats {
        drop(self._guard);
        self.task.await.unwrap_or_default()
    }
}

pub struct DiscoverySession;

impl DiscoverySession {
    /// Activate the pipeline. Returns `None`, without surfacing an error, when
    /// the credential is absent or the platform capability is unavailable;
    /// the hosting application simply runs without nearby reporting.
    pub async fn start(
        watch: &dyn PositionWatch,
        client: Arc<dyn ProximityClient>,
        token: &str,
        options: WatchOptions,
    ) -> Option<SessionHandle> {
        if token.is_empty() {
            tracing::debug!("no access token; location reporting stays off");
            return None;
        }

        let subscription = match watch.watch(options).await {
            Ok(s) => s,
            Err(e) => {
                tracing::debug!("position watch unavailable: {}", e);
                return None;
            }
        };

        let (fixes, guard) = subscription.split();
        let service = LocationReportingService::new(client, token.to_string());
        let task = tokio::spawn(service.run(fixes));

        Some(SessionHandle {
            _guard: guard,
            task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::proximity_client::{NearbyQuery, ProximityError};
    use crate::domain::candidate::NearbyCandidate;
    use crate::domain::position::Position;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingClient {
        fail: AtomicBool,
        reports: Mutex<Vec<(Position, String)>>,
    }

    #[async_trait::async_trait]
    impl ProximityClient for RecordingClient {
        async fn report_location(
            &self,
            position: &Position,
            token: &str,
        ) -> Result<(), ProximityError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ProximityError::Status {
                    endpoint: "/update-location",
                    status: 500,
                });
            }
            self.reports
                .lock()
                .unwrap()
                .push((*position, token.to_string()));
            Ok(())
        }

        async fn find_nearby(
            &self,
            _query: &NearbyQuery,
        ) -> Result<Vec<NearbyCandidate>, ProximityError> {
            Ok(Vec::new())
        }
    }

    fn fix(lat: f64, lon: f64, timestamp_ms: i64) -> PositionFix {
        PositionFix::new(Position::new(lat, lon).unwrap(), Some(12.0), timestamp_ms)
    }

    #[tokio::test]
    async fn test_first_fix_is_reported() {
        let client = Arc::new(RecordingClient::default());
        let mut service = LocationReportingService::new(client.clone(), "tok".into());

        let outcome = service.handle_fix(&fix(12.9716, 77.5946, 1_000)).await;
        assert_eq!(outcome, FixOutcome::Reported);
        assert_eq!(client.reports.lock().unwrap().len(), 1);
        assert_eq!(service.last_reported().time_ms, 1_000);
    }

    #[tokio::test]
    async fn test_stationary_fix_is_gated_without_network_call() {
        let client = Arc::new(RecordingClient::default());
        let mut service = LocationReportingService::new(client.clone(), "tok".into());

        service.handle_fix(&fix(12.0000, 77.0000, 0)).await;
        let outcome = service.handle_fix(&fix(12.0001, 77.0001, 1_000)).await;

        assert_eq!(outcome, FixOutcome::Gated);
        assert_eq!(client.reports.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_moving_fix_after_interval_reports_once() {
        let client = Arc::new(RecordingClient::default());
        let mut service = LocationReportingService::new(client.clone(), "tok".into());

        service.handle_fix(&fix(12.0000, 77.0000, 0)).await;
        let outcome = service.handle_fix(&fix(12.0100, 77.0000, 31_000)).await;

        assert_eq!(outcome, FixOutcome::Reported);
        assert_eq!(client.reports.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_report_leaves_gate_unchanged() {
        let client = Arc::new(RecordingClient::default());
        let mut service = LocationReportingService::new(client.clone(), "tok".into());

        service.handle_fix(&fix(12.0000, 77.0000, 0)).await;
        let before = *service.last_reported();

        client.fail.store(true, Ordering::SeqCst);
        let outcome = service.handle_fix(&fix(12.0100, 77.0000, 31_000)).await;
        assert_eq!(outcome, FixOutcome::ReportFailed);
        assert_eq!(service.last_reported(), &before);

        // Next qualifying fix retries against the old baseline and succeeds.
        client.fail.store(false, Ordering::SeqCst);
        let outcome = service.handle_fix(&fix(12.0100, 77.0000, 32_000)).await;
        assert_eq!(outcome, FixOutcome::Reported);
    }

    #[tokio::test]
    async fn test_invalid_fix_is_skipped() {
        let client = Arc::new(RecordingClient::default());
        let mut service = LocationReportingService::new(client.clone(), "tok".into());

        let bad = PositionFix::new(
            Position {
                latitude: 95.0,
                longitude: 0.0,
            },
            None,
            0,
        );
        assert_eq!(service.handle_fix(&bad).await, FixOutcome::Invalid);
        assert!(client.reports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_token_never_activates() {
        use crate::infrastructure::channel_watch::ChannelPositionWatch;

        let (watch, _feed) = ChannelPositionWatch::pair(8);
        let client: Arc<dyn ProximityClient> = Arc::new(RecordingClient::default());
        let session =
            DiscoverySession::start(&watch, client, "", WatchOptions::default()).await;
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_session_reports_and_drains_on_end() {
        use crate::infrastructure::channel_watch::ChannelPositionWatch;

        let (watch, feed) = ChannelPositionWatch::pair(8);
        let client = Arc::new(RecordingClient::default());
        let session = DiscoverySession::start(
            &watch,
            client.clone() as Arc<dyn ProximityClient>,
            "tok",
            WatchOptions::default(),
        )
        .await
        .expect("session should activate");

        let now = chrono::Utc::now().timestamp_millis();
        feed.send(fix(12.0000, 77.0000, now)).await.unwrap();
        feed.send(fix(12.0001, 77.0001, now + 1_000)).await.unwrap();
        drop(feed);

        let stats = session.end().await;
        assert_eq!(stats.reported, 1);
        assert_eq!(stats.gated, 1);
    }
}
