// Channel-backed position watch adapter
use crate::application::location_watch::{PositionSubscription, PositionWatch, WatchOptions};
use crate::domain::position::PositionFix;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, oneshot};

/// Bridges an external fix feed into the `PositionWatch` contract.
///
/// Whatever produces fixes (a platform geolocation callback, a GPS daemon,
/// the demo probe's scripted walk, a test) pushes into the feed sender; the
/// adapter enforces the watch options on the way through: stale fixes are
/// dropped per `maximum_age_ms`, and a fix attempt that exceeds `timeout_ms`
/// is skipped silently while observation continues.
pub struct ChannelPositionWatch {
    feed: Mutex<Option<mpsc::Receiver<PositionFix>>>,
}

impl ChannelPositionWatch {
    pub fn pair(capacity: usize) -> (Self, mpsc::Sender<PositionFix>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                feed: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait]
impl PositionWatch for ChannelPositionWatch {
    async fn watch(&self, options: WatchOptions) -> anyhow::Result<PositionSubscription> {
        let mut feed = self
            .feed
            .lock()
            .await
            .take()
            .ok_or_else(|| anyhow::anyhow!("position watch already active"))?;

        if options.enable_high_accuracy {
            tracing::debug!("high-accuracy fixes requested from feed");
        }

        let (tx, rx) = mpsc::channel(16);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let timeout = Duration::from_millis(options.timeout_ms);
        let maximum_age_ms = options.maximum_age_ms as i64;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    attempt = tokio::time::timeout(timeout, feed.recv()) => {
                        match attempt {
                            Err(_) => {
                                tracing::trace!("fix attempt timed out; skipping");
                                continue;
                            }
                            Ok(None) => break,
                            Ok(Some(fix)) => {
                                let age_ms =
                                    chrono::Utc::now().timestamp_millis() - fix.timestamp_ms;
                                if age_ms > maximum_age_ms {
                                    tracing::trace!("dropping stale fix ({} ms old)", age_ms);
                                    continue;
                                }
                                if tx.send(fix).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    _ = &mut stop_rx => break,
                }
            }
        });

        Ok(PositionSubscription::new(rx, stop_tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::Position;

    fn fix_at(timestamp_ms: i64) -> PositionFix {
        PositionFix::new(Position::new(12.0, 77.0).unwrap(), None, timestamp_ms)
    }

    #[tokio::test]
    async fn test_fresh_fixes_pass_through() {
        let (watch, feed) = ChannelPositionWatch::pair(4);
        let mut sub = watch.watch(WatchOptions::default()).await.unwrap();

        let now = chrono::Utc::now().timestamp_millis();
        feed.send(fix_at(now)).await.unwrap();
        let got = sub.next_fix().await.unwrap();
        assert_eq!(got.timestamp_ms, now);
    }

    #[tokio::test]
    async fn test_stale_fixes_dropped() {
        let (watch, feed) = ChannelPositionWatch::pair(4);
        let mut sub = watch.watch(WatchOptions::default()).await.unwrap();

        let now = chrono::Utc::now().timestamp_millis();
        feed.send(fix_at(now - 60_000)).await.unwrap();
        feed.send(fix_at(now)).await.unwrap();
        drop(feed);

        // Only the fresh fix survives.
        assert_eq!(sub.next_fix().await.unwrap().timestamp_ms, now);
        assert!(sub.next_fix().await.is_none());
    }

    #[tokio::test]
    async fn test_second_watch_rejected() {
        let (watch, _feed) = ChannelPositionWatch::pair(4);
        let _sub = watch.watch(WatchOptions::default()).await.unwrap();
        assert!(watch.watch(WatchOptions::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_stop_cancels_observation() {
        let (watch, feed) = ChannelPositionWatch::pair(4);
        let sub = watch.watch(WatchOptions::default()).await.unwrap();

        let (mut rx, guard) = sub.split();
        drop(guard);
        // The forwarding task exits; the stream ends even with the feed open.
        assert!(rx.recv().await.is_none());
        drop(feed);
    }
}
