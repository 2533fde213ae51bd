//! Repository trait for short link lookups.

use crate::domain::entities::Link;
use crate::error::AppError;
use async_trait::async_trait;

/// Read-only access to stored links.
///
/// Implementations must tolerate heavy concurrent reads; the redirect path
/// calls [`LinkRepository::find_by_id`] once per request.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::cache::CachedLinkRepository`] - Read-through cache decorator
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a link by its identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if no link has this identifier
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if the store cannot be reached.
    /// Returns [`AppError::Internal`] on other database errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Checks that the backing store answers queries.
    ///
    /// Used by the health endpoint.
    async fn ping(&self) -> bool;
}
