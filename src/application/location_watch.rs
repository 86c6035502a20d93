// Platform position-watch capability behind a trait seam
use crate::domain::position::PositionFix;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

/// Configuration surface of the platform watch capability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchOptions {
    pub enable_high_accuracy: bool,
    /// Accept cached fixes up to this old.
    pub maximum_age_ms: u64,
    /// Give up on an individual fix attempt after this long; the attempt is
    /// skipped and observation continues.
    pub timeout_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            maximum_age_ms: 15_000,
            timeout_ms: 10_000,
        }
    }
}

/// Continuous position observation with start/stop semantics.
///
/// Implementations bridge whatever the hosting platform offers (a geolocation
/// API, a GPS daemon, a scripted feed in tests) into a stream of fixes.
#[async_trait]
pub trait PositionWatch: Send + Sync {
    async fn watch(&self, options: WatchOptions) -> anyhow::Result<PositionSubscription>;
}

/// An active observation. Dropping the guard (or the whole subscription)
/// cancels it; in-flight work downstream is allowed to finish.
pub struct PositionSubscription {
    receiver: mpsc::Receiver<PositionFix>,
    guard: WatchGuard,
}

impl PositionSubscription {
    pub fn new(receiver: mpsc::Receiver<PositionFix>, stop: oneshot::Sender<()>) -> Self {
        Self {
            receiver,
            guard: WatchGuard { stop: Some(stop) },
        }
    }

    pub async fn next_fix(&mut self) -> Option<PositionFix> {
        self.receiver.recv().await
    }

    /// Split into the fix stream and the cancellation guard, so a spawned
    /// consumer can own the stream while the session keeps the guard.
    pub fn split(self) -> (mpsc::Receiver<PositionFix>, WatchGuard) {
        (self.receiver, self.guard)
    }
}

/// Cancels the observation when dropped.
pub struct WatchGuard {
    stop: Option<oneshot::Sender<()>>,
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}
