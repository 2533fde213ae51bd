//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching link destinations by identifier.
///
/// Implementations must be thread-safe. Cache failures must never break a
/// redirect: callers treat errors as misses and fall back to the link store.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the destination cached for a link identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on cache hit
    /// - `Ok(None)` on cache miss
    async fn get_destination(&self, link_id: i64) -> CacheResult<Option<String>>;

    /// Stores a destination with optional TTL.
    ///
    /// `ttl_seconds = None` applies the implementation default.
    async fn set_destination(
        &self,
        link_id: i64,
        destination: &str,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_display() {
        let error = CacheError::ConnectionError("refused".to_string());
        assert_eq!(error.to_string(), "Cache connection error: refused");
    }
}
