//! Read-through cache in front of a link repository.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error};

use super::service::CacheService;
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Link repository decorator that consults a [`CacheService`] first.
///
/// # Cache Strategy
///
/// - **Cache hit**: return the cached destination without querying the store
/// - **Cache miss**: query the store, then write the link back in a spawned task
/// - **Cache error**: log and fall back to the store
///
/// Lookups for unknown identifiers are never cached.
pub struct CachedLinkRepository<L: LinkRepository + ?Sized> {
    inner: Arc<L>,
    cache: Arc<dyn CacheService>,
}

impl<L: LinkRepository + ?Sized> CachedLinkRepository<L> {
    /// Wraps `inner` with `cache`.
    pub fn new(inner: Arc<L>, cache: Arc<dyn CacheService>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<L: LinkRepository + ?Sized + 'static> LinkRepository for CachedLinkRepository<L> {
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        match self.cache.get_destination(id).await {
            Ok(Some(destination)) => {
                debug!("Cache HIT for link {}", id);
                return Ok(Some(Link::new(id, destination)));
            }
            Ok(None) => debug!("Cache MISS for link {}", id),
            Err(e) => error!("Cache error: {}", e),
        }

        let link = self.inner.find_by_id(id).await?;

        if let Some(link) = &link {
            let cache = self.cache.clone();
            let destination = link.destination.clone();
            tokio::spawn(async move {
                if let Err(e) = cache.set_destination(id, &destination, None).await {
                    error!("Failed to cache link {}: {}", id, e);
                }
            });
        }

        Ok(link)
    }

    async fn ping(&self) -> bool {
        self.inner.ping().await
    }
}
