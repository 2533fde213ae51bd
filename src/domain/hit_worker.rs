//! Buffered hit recording.
//!
//! [`QueuedHitRepository`] accepts hit records into a bounded channel without
//! touching the database; [`run_hit_worker`] drains that channel in the
//! background and writes each record through a durable [`HitRepository`].

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, mpsc};
use tokio::sync::mpsc::error::TrySendError;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::entities::HitRecord;
use crate::domain::repositories::HitRepository;
use crate::error::AppError;

/// Hit sink backed by a bounded in-memory queue.
///
/// Appending never waits: a full or closed queue is reported as
/// [`AppError::Unavailable`] and the record is discarded by the caller.
/// Once queued, a record is written by the worker regardless of what
/// happens to the request that produced it.
#[derive(Debug, Clone)]
pub struct QueuedHitRepository {
    sender: mpsc::Sender<HitRecord>,
}

impl QueuedHitRepository {
    /// Creates a queue of the given capacity along with its receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<HitRecord>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    /// Returns true once the worker has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots currently available in the queue.
    pub fn capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Total size of the queue.
    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

#[async_trait]
impl HitRepository for QueuedHitRepository {
    async fn append(&self, hit: HitRecord) -> Result<(), AppError> {
        self.sender.try_send(hit).map_err(|e| match e {
            TrySendError::Full(hit) => AppError::unavailable(
                "Hit queue is full",
                json!({ "link_id": hit.link_id, "capacity": self.sender.max_capacity() }),
            ),
            TrySendError::Closed(hit) => {
                AppError::unavailable("Hit queue is closed", json!({ "link_id": hit.link_id }))
            }
        })
    }
}

/// Drains queued hit records into `repository`.
///
/// At most `concurrency` writes are in flight at once. A failed write is
/// retried with exponential backoff up to `retry_attempts` more times and
/// then dropped. Returns after the channel is closed and every in-flight
/// write has finished.
pub async fn run_hit_worker(
    mut rx: mpsc::Receiver<HitRecord>,
    repository: Arc<dyn HitRepository>,
    concurrency: usize,
    retry_attempts: usize,
) {
    let concurrency = concurrency.max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));

    while let Some(hit) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        tokio::spawn(async move {
            let _permit = permit;
            write_with_retry(repository.as_ref(), hit, retry_attempts).await;
        });
    }

    // Every permit back means every spawned write has completed.
    let _ = semaphore.acquire_many(concurrency as u32).await;
    info!("Hit worker stopped");
}

async fn write_with_retry(
    repository: &dyn HitRepository,
    hit: HitRecord,
    retry_attempts: usize,
) {
    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(retry_attempts);
    let link_id = hit.link_id;

    match Retry::spawn(strategy, || repository.append(hit.clone())).await {
        Ok(()) => debug!(link_id, "Hit recorded"),
        Err(e) => {
            warn!(link_id, error = %e, "Dropping hit record after retries");
            metrics::counter!("hit_records_dropped_total").increment(1);
        }
    }
}
