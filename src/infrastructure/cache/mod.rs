//! Caching layer for fast redirect lookups.
//!
//! Provides a [`CacheService`] trait with two implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`NullCache`] - No-op implementation for disabled caching
//!
//! [`CachedLinkRepository`] puts either of them in front of a link repository.

mod cached_link_repository;
mod null_cache;
mod redis_cache;
mod service;

pub use cached_link_repository::CachedLinkRepository;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
