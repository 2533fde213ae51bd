//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup by [`load_from_env`] and validated before the
//! server starts. Variables may come from a `.env` file (see `main.rs`).
//!
//! ## Connection strings
//!
//! `DATABASE_URL` wins when set. Otherwise the URL is assembled from
//! `DB_HOST` (default `localhost`), `DB_PORT` (default `5432`), `DB_USER`,
//! `DB_PASSWORD` and `DB_NAME`, the last three being required.
//!
//! Redis is optional: `REDIS_URL`, or `REDIS_HOST` with `REDIS_PORT`
//! (default `6379`), `REDIS_PASSWORD` and `REDIS_DB` (default `0`). Without
//! either, caching is disabled.
//!
//! ## Service
//!
//! | Variable | Default | |
//! |---|---|---|
//! | `LISTEN` | `0.0.0.0:3000` | bind address |
//! | `RUST_LOG` | `info` | log filter |
//! | `LOG_FORMAT` | `text` | `text` or `json` |
//! | `BEHIND_PROXY` | `false` | trust `X-Forwarded-For` / `X-Real-IP` |
//! | `CACHE_TTL_SECONDS` | `3600` | Redis TTL for destinations |
//!
//! ## Hit recording ([`HitSettings`])
//!
//! | Variable | Default | |
//! |---|---|---|
//! | `HIT_QUEUE_CAPACITY` | `0` | `0` writes in the request, else `100..=1000000` |
//! | `HIT_WORKER_CONCURRENCY` | `4` | `1..=256` concurrent worker writes |
//! | `HIT_RETRY_ATTEMPTS` | `2` | at most `10` retries per record |
//!
//! ## Connection pool ([`PoolSettings`])
//!
//! `DB_MAX_CONNECTIONS` (10), `DB_CONNECT_TIMEOUT` (30s), `DB_IDLE_TIMEOUT`
//! (600s), `DB_MAX_LIFETIME` (1800s).

use anyhow::{Context, Result, ensure};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub listen_addr: String,
    pub log_level: String,
    pub log_format: String,
    /// Read client IPs from forwarding headers. Only safe behind a trusted proxy.
    pub behind_proxy: bool,
    pub cache_ttl_seconds: u64,
    pub hits: HitSettings,
    pub pool: PoolSettings,
}

/// How hit records reach the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitSettings {
    /// Buffer size; zero means every hit is written by its request.
    pub queue_capacity: usize,
    pub worker_concurrency: usize,
    pub retry_attempts: usize,
}

/// PostgreSQL pool tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

/// Reads `name` and parses it, falling back to `default` when unset or unparsable.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn env_secs(name: &str, default: u64) -> Duration {
    Duration::from_secs(env_or(name, default))
}

impl HitSettings {
    const MIN_QUEUE: usize = 100;
    const MAX_QUEUE: usize = 1_000_000;

    fn from_env() -> Self {
        Self {
            queue_capacity: env_or("HIT_QUEUE_CAPACITY", 0),
            worker_concurrency: env_or("HIT_WORKER_CONCURRENCY", 4),
            retry_attempts: env_or("HIT_RETRY_ATTEMPTS", 2),
        }
    }

    /// Returns whether hits go through the background worker.
    pub fn is_buffered(&self) -> bool {
        self.queue_capacity > 0
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            !self.is_buffered()
                || (Self::MIN_QUEUE..=Self::MAX_QUEUE).contains(&self.queue_capacity),
            "HIT_QUEUE_CAPACITY must be 0 or between {} and {}, got {}",
            Self::MIN_QUEUE,
            Self::MAX_QUEUE,
            self.queue_capacity
        );
        ensure!(
            (1..=256).contains(&self.worker_concurrency),
            "HIT_WORKER_CONCURRENCY must be between 1 and 256, got {}",
            self.worker_concurrency
        );
        ensure!(
            self.retry_attempts <= 10,
            "HIT_RETRY_ATTEMPTS must be at most 10, got {}",
            self.retry_attempts
        );
        Ok(())
    }
}

impl PoolSettings {
    fn from_env() -> Self {
        Self {
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            acquire_timeout: env_secs("DB_CONNECT_TIMEOUT", 30),
            idle_timeout: env_secs("DB_IDLE_TIMEOUT", 600),
            max_lifetime: env_secs("DB_MAX_LIFETIME", 1800),
        }
    }

    /// Pool options carrying these settings.
    pub fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.max_connections > 0, "DB_MAX_CONNECTIONS must be at least 1");
        ensure!(
            !self.acquire_timeout.is_zero(),
            "DB_CONNECT_TIMEOUT must be greater than 0"
        );
        Ok(())
    }
}

impl Config {
    /// Loads configuration from environment variables without validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if no database configuration is present.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: Self::load_database_url()
                .context("Failed to load database configuration")?,
            redis_url: Self::load_redis_url(),
            listen_addr: env_or("LISTEN", "0.0.0.0:3000".to_string()),
            log_level: env_or("RUST_LOG", "info".to_string()),
            log_format: env_or("LOG_FORMAT", "text".to_string()),
            behind_proxy: env_flag("BEHIND_PROXY"),
            cache_ttl_seconds: env_or("CACHE_TTL_SECONDS", 3600),
            hits: HitSettings::from_env(),
            pool: PoolSettings::from_env(),
        })
    }

    /// Resolves the PostgreSQL URL from `DATABASE_URL` or the `DB_*` parts.
    ///
    /// Also used by the admin CLI, which needs nothing else from the config.
    pub fn load_database_url() -> Result<String> {
        if let Ok(url) = env::var("DATABASE_URL") {
            return Ok(url);
        }

        let required = |name: &str| {
            env::var(name).with_context(|| format!("{name} must be set when DATABASE_URL is not"))
        };
        let credentials = format!("{}:{}", required("DB_USER")?, required("DB_PASSWORD")?);
        let name = required("DB_NAME")?;

        Ok(connection_url(
            "postgres",
            Some(&credentials),
            &env_or("DB_HOST", "localhost".to_string()),
            &env_or("DB_PORT", "5432".to_string()),
            &name,
        ))
    }

    /// Resolves the Redis URL, or `None` when Redis is not configured.
    fn load_redis_url() -> Option<String> {
        if let Ok(url) = env::var("REDIS_URL") {
            return Some(url);
        }

        let host = env::var("REDIS_HOST").ok()?;
        let credentials = env::var("REDIS_PASSWORD")
            .ok()
            .filter(|p| !p.is_empty())
            .map(|p| format!(":{p}"));

        Some(connection_url(
            "redis",
            credentials.as_deref(),
            &host,
            &env_or("REDIS_PORT", "6379".to_string()),
            &env_or("REDIS_DB", "0".to_string()),
        ))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            matches!(self.log_format.as_str(), "text" | "json"),
            "LOG_FORMAT must be 'text' or 'json', got '{}'",
            self.log_format
        );
        ensure!(
            self.listen_addr.contains(':'),
            "LISTEN must be in format 'host:port', got '{}'",
            self.listen_addr
        );
        ensure!(
            has_scheme(&self.database_url, &["postgres", "postgresql"]),
            "DATABASE_URL must use the postgres:// or postgresql:// scheme, got '{}'",
            mask_connection_string(&self.database_url)
        );
        if let Some(redis_url) = &self.redis_url {
            ensure!(
                has_scheme(redis_url, &["redis", "rediss"]),
                "REDIS_URL must use the redis:// or rediss:// scheme, got '{}'",
                mask_connection_string(redis_url)
            );
        }
        ensure!(
            self.cache_ttl_seconds > 0,
            "CACHE_TTL_SECONDS must be greater than 0"
        );

        self.hits.validate()?;
        self.pool.validate()
    }

    /// Returns whether Redis caching is enabled.
    pub fn is_cache_enabled(&self) -> bool {
        self.redis_url.is_some()
    }

    /// Returns whether hits go through the background worker.
    pub fn is_hit_queue_enabled(&self) -> bool {
        self.hits.is_buffered()
    }

    /// Logs the configuration with credentials masked.
    pub fn print_summary(&self) {
        let redis = self
            .redis_url
            .as_deref()
            .map_or_else(|| "disabled".to_string(), mask_connection_string);

        tracing::info!(
            listen = %self.listen_addr,
            database = %mask_connection_string(&self.database_url),
            redis = %redis,
            log_level = %self.log_level,
            log_format = %self.log_format,
            behind_proxy = self.behind_proxy,
            "Configuration loaded"
        );

        if self.hits.is_buffered() {
            tracing::info!(
                capacity = self.hits.queue_capacity,
                workers = self.hits.worker_concurrency,
                retries = self.hits.retry_attempts,
                "Hit recording: buffered"
            );
        } else {
            tracing::info!("Hit recording: direct");
        }
    }
}

fn connection_url(
    scheme: &str,
    credentials: Option<&str>,
    host: &str,
    port: &str,
    path: &str,
) -> String {
    match credentials {
        Some(credentials) => format!("{scheme}://{credentials}@{host}:{port}/{path}"),
        None => format!("{scheme}://{host}:{port}/{path}"),
    }
}

fn has_scheme(url: &str, schemes: &[&str]) -> bool {
    url.split_once("://")
        .is_some_and(|(scheme, _)| schemes.contains(&scheme))
}

/// Replaces the password of a connection URL with `***`.
fn mask_connection_string(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };
    match credentials.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
        None => url.to_string(),
    }
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
