//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, hit recording wiring, and the
//! Axum server lifecycle.

use crate::config::Config;
use crate::domain::hit_worker::{QueuedHitRepository, run_hit_worker};
use crate::domain::repositories::{HitRepository, LinkRepository};
use crate::infrastructure::cache::{CacheService, CachedLinkRepository, NullCache, RedisCache};
use crate::infrastructure::persistence::{PgHitRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Hit recording, direct or through the background worker
/// - Axum HTTP server with graceful shutdown
///
/// On shutdown the hit queue is closed and the worker is given the chance to
/// finish writing what was already accepted.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let pool = Arc::new(pool);

    let cache = connect_cache(&config).await;
    let pg_links: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let link_repository: Arc<dyn LinkRepository> = if config.is_cache_enabled() {
        Arc::new(CachedLinkRepository::new(pg_links, cache.clone()))
    } else {
        pg_links
    };

    let pg_hits: Arc<dyn HitRepository> = Arc::new(PgHitRepository::new(pool.clone()));

    let (state, worker) = if config.is_hit_queue_enabled() {
        let hits = config.hits;
        let (queue, hit_rx) = QueuedHitRepository::channel(hits.queue_capacity);
        let worker = tokio::spawn(run_hit_worker(
            hit_rx,
            pg_hits,
            hits.worker_concurrency,
            hits.retry_attempts,
        ));
        tracing::info!(
            capacity = hits.queue_capacity,
            concurrency = hits.worker_concurrency,
            "Hit worker started"
        );

        let state = AppState::new(link_repository, Arc::new(queue.clone()), cache)
            .with_hit_queue(queue);
        (state, Some(worker))
    } else {
        (AppState::new(link_repository, pg_hits, cache), None)
    };

    let app = app_router(state.with_behind_proxy(config.behind_proxy));

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router (and every sender it held) is gone, so the worker sees a
    // closed channel once the backlog is drained.
    if let Some(worker) = worker
        && let Err(e) = worker.await
    {
        tracing::error!("Hit worker terminated abnormally: {}", e);
    }

    pool.close().await;
    tracing::info!("Server shut down gracefully");

    Ok(())
}

async fn connect_pool(config: &Config) -> Result<PgPool> {
    config
        .pool
        .options()
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, starting graceful shutdown"),
        _ = terminate => tracing::info!("Received SIGTERM, starting graceful shutdown"),
    }
}
