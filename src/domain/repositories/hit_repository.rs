//! Repository trait for hit recording.

use crate::domain::entities::HitRecord;
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only sink for hit records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgHitRepository`] - PostgreSQL implementation
/// - [`crate::domain::hit_worker::QueuedHitRepository`] - Bounded buffer drained by a background worker
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HitRepository: Send + Sync {
    /// Appends a hit record.
    ///
    /// A record that was accepted is never withdrawn, even if the caller
    /// stops waiting afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if the record could not be accepted.
    /// Returns [`AppError::Internal`] on other storage errors.
    async fn append(&self, hit: HitRecord) -> Result<(), AppError>;
}
