//! Short key resolution and hit recording.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::entities::{HitRecord, RequestMeta};
use crate::domain::key_codec;
use crate::domain::repositories::{HitRepository, LinkRepository};

/// The decision reached for one short key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// The key resolved; send the client to `destination`.
    Redirect {
        destination: String,
        permanent: bool,
        cacheable: bool,
    },
    /// The key is malformed or names no link.
    NotFound,
    /// The link store could not answer.
    Unavailable,
}

impl RedirectOutcome {
    /// A permanent, non-cacheable redirect to `destination`.
    pub fn redirect(destination: impl Into<String>) -> Self {
        Self::Redirect {
            destination: destination.into(),
            permanent: true,
            cacheable: false,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Redirect { .. } => "redirect",
            Self::NotFound => "not_found",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Resolves short keys to destinations and records a hit for each success.
///
/// Holds no per-request state, so a single instance serves any number of
/// concurrent requests. Both repositories may be trait objects.
pub struct RedirectService<L: LinkRepository + ?Sized, H: HitRepository + ?Sized> {
    link_repository: Arc<L>,
    hit_repository: Arc<H>,
}

impl<L: LinkRepository + ?Sized, H: HitRepository + ?Sized> RedirectService<L, H> {
    /// Creates a new redirect service.
    pub fn new(link_repository: Arc<L>, hit_repository: Arc<H>) -> Self {
        Self {
            link_repository,
            hit_repository,
        }
    }

    /// Resolves `raw_key` and records the hit.
    ///
    /// # Flow
    ///
    /// 1. Decode the key; a malformed or out-of-range key is [`RedirectOutcome::NotFound`]
    /// 2. Look up the link; an unknown identifier is [`RedirectOutcome::NotFound`],
    ///    a store failure is [`RedirectOutcome::Unavailable`]
    /// 3. Append a [`HitRecord`] built from `meta`
    /// 4. Return a permanent, non-cacheable redirect
    ///
    /// A failed append is logged and otherwise ignored: the redirect never
    /// depends on hit recording. Nothing is retried here.
    pub async fn resolve(&self, raw_key: &str, meta: RequestMeta) -> RedirectOutcome {
        let outcome = self.resolve_and_record(raw_key, meta).await;
        metrics::counter!("redirect_resolutions_total", "outcome" => outcome.label()).increment(1);
        outcome
    }

    /// Reports whether the link store is reachable.
    pub async fn is_store_healthy(&self) -> bool {
        self.link_repository.ping().await
    }

    async fn resolve_and_record(&self, raw_key: &str, meta: RequestMeta) -> RedirectOutcome {
        let id = match key_codec::decode(raw_key) {
            Ok(id) => id,
            Err(e) => {
                debug!(key = raw_key, error = %e, "Rejecting short key");
                return RedirectOutcome::NotFound;
            }
        };

        let link = match self.link_repository.find_by_id(id).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                debug!(key = raw_key, id, "Short link not found");
                return RedirectOutcome::NotFound;
            }
            Err(e) => {
                error!(key = raw_key, id, error = %e, "Link lookup failed");
                return RedirectOutcome::Unavailable;
            }
        };

        let hit = HitRecord::new(link.id, meta);
        if let Err(e) = self.hit_repository.append(hit).await {
            warn!(link_id = link.id, error = %e, "Failed to record hit");
            metrics::counter!("hit_records_failed_total").increment(1);
        }

        debug!(key = raw_key, link_id = link.id, destination = %link.destination, "Resolved short key");
        RedirectOutcome::redirect(link.destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Link;
    use crate::domain::repositories::{MockHitRepository, MockLinkRepository};
    use crate::error::AppError;
    use serde_json::json;

    fn service(
        link_repo: MockLinkRepository,
        hit_repo: MockHitRepository,
    ) -> RedirectService<MockLinkRepository, MockHitRepository> {
        RedirectService::new(Arc::new(link_repo), Arc::new(hit_repo))
    }

    fn expect_link(mock: &mut MockLinkRepository, id: i64, destination: &'static str) {
        mock.expect_find_by_id()
            .withf(move |requested| *requested == id)
            .times(1)
            .returning(move |id| Ok(Some(Link::new(id, destination))));
    }

    #[tokio::test]
    async fn test_resolve_existing_key_records_hit() {
        let mut link_repo = MockLinkRepository::new();
        let mut hit_repo = MockHitRepository::new();

        expect_link(&mut link_repo, 125, "https://example.com/a");
        hit_repo
            .expect_append()
            .withf(|hit| hit.link_id == 125 && hit.client_ip.as_deref() == Some("1.2.3.4"))
            .times(1)
            .returning(|_| Ok(()));

        let outcome = service(link_repo, hit_repo)
            .resolve("21", RequestMeta::default().with_ip("1.2.3.4"))
            .await;

        assert_eq!(
            outcome,
            RedirectOutcome::Redirect {
                destination: "https://example.com/a".to_string(),
                permanent: true,
                cacheable: false,
            }
        );
    }

    #[tokio::test]
    async fn test_resolve_keeps_missing_metadata_absent() {
        let mut link_repo = MockLinkRepository::new();
        let mut hit_repo = MockHitRepository::new();

        expect_link(&mut link_repo, 125, "https://example.com/a");
        hit_repo
            .expect_append()
            .withf(|hit| {
                hit.client_ip.is_none()
                    && hit.user_agent.as_deref() == Some("Mozilla/5.0")
                    && hit.referer.is_none()
            })
            .times(1)
            .returning(|_| Ok(()));

        let meta = RequestMeta::new(None, Some("Mozilla/5.0"), None);
        let outcome = service(link_repo, hit_repo).resolve("21", meta).await;

        assert!(matches!(outcome, RedirectOutcome::Redirect { .. }));
    }

    #[tokio::test]
    async fn test_resolve_invalid_alphabet_skips_stores() {
        let mut link_repo = MockLinkRepository::new();
        let mut hit_repo = MockHitRepository::new();

        link_repo.expect_find_by_id().times(0);
        hit_repo.expect_append().times(0);

        let outcome = service(link_repo, hit_repo)
            .resolve("@@@", RequestMeta::default())
            .await;

        assert_eq!(outcome, RedirectOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_empty_key() {
        let mut link_repo = MockLinkRepository::new();
        let mut hit_repo = MockHitRepository::new();

        link_repo.expect_find_by_id().times(0);
        hit_repo.expect_append().times(0);

        let outcome = service(link_repo, hit_repo)
            .resolve("", RequestMeta::default())
            .await;

        assert_eq!(outcome, RedirectOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_overflowing_key() {
        let mut link_repo = MockLinkRepository::new();
        let mut hit_repo = MockHitRepository::new();

        link_repo.expect_find_by_id().times(0);
        hit_repo.expect_append().times(0);

        let outcome = service(link_repo, hit_repo)
            .resolve("AzL8n0Y58m8", RequestMeta::default())
            .await;

        assert_eq!(outcome, RedirectOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_unknown_identifier_records_nothing() {
        let mut link_repo = MockLinkRepository::new();
        let mut hit_repo = MockHitRepository::new();

        link_repo
            .expect_find_by_id()
            .withf(|id| *id == 3843)
            .times(1)
            .returning(|_| Ok(None));
        hit_repo.expect_append().times(0);

        let outcome = service(link_repo, hit_repo)
            .resolve("zz", RequestMeta::default().with_ip("1.2.3.4"))
            .await;

        assert_eq!(outcome, RedirectOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_lookup_failure_is_unavailable() {
        let mut link_repo = MockLinkRepository::new();
        let mut hit_repo = MockHitRepository::new();

        link_repo
            .expect_find_by_id()
            .times(1)
            .returning(|_| Err(AppError::unavailable("Database pool unavailable", json!({}))));
        hit_repo.expect_append().times(0);

        let outcome = service(link_repo, hit_repo)
            .resolve("21", RequestMeta::default())
            .await;

        assert_eq!(outcome, RedirectOutcome::Unavailable);
    }

    #[tokio::test]
    async fn test_resolve_redirects_when_hit_append_fails() {
        let mut link_repo = MockLinkRepository::new();
        let mut hit_repo = MockHitRepository::new();

        expect_link(&mut link_repo, 125, "https://example.com/a");
        hit_repo
            .expect_append()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let outcome = service(link_repo, hit_repo)
            .resolve("21", RequestMeta::default())
            .await;

        assert_eq!(outcome, RedirectOutcome::redirect("https://example.com/a"));
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_agree() {
        let mut link_repo = MockLinkRepository::new();
        let mut hit_repo = MockHitRepository::new();

        link_repo
            .expect_find_by_id()
            .times(2)
            .returning(|id| Ok(Some(Link::new(id, "https://example.com/a"))));
        hit_repo
            .expect_append()
            .withf(|hit| hit.link_id == 125)
            .times(2)
            .returning(|_| Ok(()));

        let service = Arc::new(service(link_repo, hit_repo));
        let first = tokio::spawn({
            let service = service.clone();
            async move { service.resolve("21", RequestMeta::default()).await }
        });
        let second = tokio::spawn({
            let service = service.clone();
            async move { service.resolve("21", RequestMeta::default()).await }
        });

        let first = first.await.unwrap();
        let second = second.await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, RedirectOutcome::redirect("https://example.com/a"));
    }

    #[tokio::test]
    async fn test_store_health_delegates_to_link_repository() {
        let mut link_repo = MockLinkRepository::new();
        link_repo.expect_ping().times(1).returning(|| true);

        let service = service(link_repo, MockHitRepository::new());

        assert!(service.is_store_healthy().await);
    }
}
