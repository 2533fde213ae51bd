//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::RedirectService;
use crate::domain::hit_worker::QueuedHitRepository;
use crate::domain::repositories::{HitRepository, LinkRepository};
use crate::infrastructure::cache::CacheService;

/// Redirect service over type-erased repositories.
pub type SharedRedirectService = RedirectService<dyn LinkRepository, dyn HitRepository>;

#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<SharedRedirectService>,
    pub cache: Arc<dyn CacheService>,
    /// Present when hits are buffered through the background worker.
    pub hit_queue: Option<QueuedHitRepository>,
    /// When true, client IPs are read from `X-Forwarded-For` / `X-Real-IP`.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        hit_repository: Arc<dyn HitRepository>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            redirect_service: Arc::new(RedirectService::new(link_repository, hit_repository)),
            cache,
            hit_queue: None,
            behind_proxy: false,
        }
    }

    /// Attaches the hit queue so the health endpoint can report on it.
    pub fn with_hit_queue(mut self, queue: QueuedHitRepository) -> Self {
        self.hit_queue = Some(queue);
        self
    }

    pub fn with_behind_proxy(mut self, behind_proxy: bool) -> Self {
        self.behind_proxy = behind_proxy;
        self
    }
}
