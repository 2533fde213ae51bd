#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::Layer;

use quicklink_redirect::domain::entities::{HitRecord, Link};
use quicklink_redirect::domain::repositories::{HitRepository, LinkRepository};
use quicklink_redirect::error::AppError;
use quicklink_redirect::infrastructure::cache::NullCache;
use quicklink_redirect::state::AppState;

pub const PEER_ADDR: &str = "127.0.0.1:12345";

/// Link store held in memory.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<HashMap<i64, String>>,
}

impl InMemoryLinkRepository {
    pub fn with_links(links: &[(i64, &str)]) -> Self {
        let repo = Self::default();
        for (id, destination) in links {
            repo.insert(*id, destination);
        }
        repo
    }

    pub fn insert(&self, id: i64, destination: &str) {
        self.links
            .lock()
            .unwrap()
            .insert(id, destination.to_string());
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .get(&id)
            .map(|destination| Link::new(id, destination.clone())))
    }

    async fn ping(&self) -> bool {
        true
    }
}

/// Link store that cannot be reached.
pub struct UnreachableLinkRepository;

#[async_trait]
impl LinkRepository for UnreachableLinkRepository {
    async fn find_by_id(&self, _id: i64) -> Result<Option<Link>, AppError> {
        Err(AppError::unavailable("Database pool unavailable", json!({})))
    }

    async fn ping(&self) -> bool {
        false
    }
}

/// Hit store that keeps every appended record, or rejects them all when
/// `failing` is set.
#[derive(Default)]
pub struct RecordingHitRepository {
    hits: Mutex<Vec<HitRecord>>,
    failing: AtomicBool,
}

impl RecordingHitRepository {
    pub fn failing() -> Self {
        let repo = Self::default();
        repo.failing.store(true, Ordering::SeqCst);
        repo
    }

    pub fn hits(&self) -> Vec<HitRecord> {
        self.hits.lock().unwrap().clone()
    }
}

#[async_trait]
impl HitRepository for RecordingHitRepository {
    async fn append(&self, hit: HitRecord) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::internal("Database error", json!({})));
        }
        self.hits.lock().unwrap().push(hit);
        Ok(())
    }
}

pub fn create_test_state(
    links: Arc<dyn LinkRepository>,
    hits: Arc<RecordingHitRepository>,
) -> AppState {
    AppState::new(links, hits, Arc::new(NullCache::new()))
}

/// Injects a fixed peer address, standing in for
/// `into_make_service_with_connect_info`.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = PEER_ADDR.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
