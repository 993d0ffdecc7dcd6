use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::BusTracking;
use crate::services::Store;

/// Live view of one booking's tracking row.
///
/// A background task polls the store and publishes every change. The task
/// is aborted when the feed is dropped, so whoever owns the feed owns the
/// subscription.
#[derive(Debug)]
pub struct TrackingFeed {
    booking_id: Uuid,
    rx: watch::Receiver<BusTracking>,
    task: JoinHandle<()>,
}

impl TrackingFeed {
    pub async fn open(store: Arc<dyn Store>, booking_id: Uuid, poll_interval: Duration) -> AppResult<Self> {
        let initial = store
            .tracking_for(booking_id)
            .await?
            .unwrap_or_else(|| BusTracking::placeholder(Utc::now()));
        let (tx, rx) = watch::channel(initial);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                match store.tracking_for(booking_id).await {
                    Ok(Some(row)) => {
                        tx.send_if_modified(|current| {
                            if *current == row {
                                false
                            } else {
                                *current = row;
                                true
                            }
                        });
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!(%booking_id, error = %e, "Tracking poll failed"),
                }
            }
        });

        tracing::debug!(%booking_id, "Tracking feed opened");
        Ok(Self { booking_id, rx, task })
    }

    pub fn booking_id(&self) -> Uuid {
        self.booking_id
    }

    pub fn latest(&self) -> BusTracking {
        self.rx.borrow().clone()
    }

    /// Waits for the next published change. False once the poller is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    pub fn is_live(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for TrackingFeed {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!(booking_id = %self.booking_id, "Tracking feed released");
    }
}
