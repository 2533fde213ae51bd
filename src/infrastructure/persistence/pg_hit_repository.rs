//! PostgreSQL implementation of hit repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::HitRecord;
use crate::domain::repositories::HitRepository;
use crate::error::AppError;

/// PostgreSQL repository appending to the `hit_records` table.
pub struct PgHitRepository {
    pool: Arc<PgPool>,
}

impl PgHitRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HitRepository for PgHitRepository {
    async fn append(&self, hit: HitRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO hit_records (url_record_id, ip, user_agent, referer, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(hit.link_id)
        .bind(hit.client_ip)
        .bind(hit.user_agent)
        .bind(hit.referer)
        .bind(hit.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
