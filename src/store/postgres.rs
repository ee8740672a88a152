//! PostgreSQL record store for production use.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 10)
//! - `DB_MIN_CONNECTIONS`: Minimum idle connections (default: 2)
//! - `DB_CONNECT_TIMEOUT_SECS`: Connection timeout (default: 10)
//! - `DB_IDLE_TIMEOUT_SECS`: Idle connection timeout (default: 300)
//! - `DB_MAX_LIFETIME_SECS`: Max connection lifetime (default: 1800)

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;
use uuid::Uuid;

use crate::types::{LoveTestRecord, NewLoveTest, NewReview, RecordId, ReviewRecord};
use super::RecordStore;

/// Table definitions, applied by [`PostgresRecordStore::ensure_schema`].
///
/// `seq` breaks ties between rows sharing a `created_at`.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS love_tests (
        seq          BIGSERIAL PRIMARY KEY,
        id           UUID NOT NULL UNIQUE,
        user_name    TEXT NOT NULL,
        user_branch  TEXT,
        crush_name   TEXT NOT NULL,
        crush_branch TEXT,
        year         TEXT,
        lab          TEXT,
        score        DOUBLE PRECISION NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS love_tests_created_at_idx
        ON love_tests (created_at DESC, seq DESC)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reviews (
        seq             BIGSERIAL PRIMARY KEY,
        id              UUID NOT NULL UNIQUE,
        reviewer_name   TEXT NOT NULL,
        reviewer_branch TEXT,
        rating          SMALLINT NOT NULL,
        review_text     TEXT,
        created_at      TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS reviews_created_at_idx
        ON reviews (created_at DESC, seq DESC)
    "#,
];

/// Configuration for PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum connections in pool (default: 10).
    pub max_connections: u32,
    /// Minimum idle connections to keep warm (default: 2).
    pub min_connections: u32,
    /// Connection acquire timeout in seconds (default: 10).
    pub connect_timeout_secs: u64,
    /// Idle connection timeout in seconds (default: 300 = 5 min).
    pub idle_timeout_secs: u64,
    /// Maximum connection lifetime in seconds (default: 1800 = 30 min).
    pub max_lifetime_secs: u64,
}

impl PostgresConfig {
    /// Load configuration from environment variables with production defaults.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/love_test".to_string()),
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            min_connections: env_or("DB_MIN_CONNECTIONS", 2),
            connect_timeout_secs: env_or("DB_CONNECT_TIMEOUT_SECS", 10),
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT_SECS", 300),
            max_lifetime_secs: env_or("DB_MAX_LIFETIME_SECS", 1800),
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Error type for PostgreSQL store.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored row does not decode into a record.
    #[error("Invalid row in {table}: {reason}")]
    InvalidRow {
        table: &'static str,
        reason: String,
    },
}

/// Pool statistics for monitoring.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PoolStats {
    /// Current pool size.
    pub size: u32,
    /// Number of idle connections.
    pub idle: usize,
    /// Maximum pool size.
    pub max: u32,
}

/// PostgreSQL record store.
///
/// One table per record kind. Uses connection pooling.
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    /// Create a new store with the given configuration.
    pub async fn new(config: PostgresConfig) -> Result<Self, sqlx::Error> {
        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            connect_timeout_secs = config.connect_timeout_secs,
            idle_timeout_secs = config.idle_timeout_secs,
            max_lifetime_secs = config.max_lifetime_secs,
            "Initializing PostgreSQL connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .test_before_acquire(true)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a store from environment variables.
    pub async fn from_env() -> Result<Self, sqlx::Error> {
        Self::new(PostgresConfig::from_env()).await
    }

    /// Create both tables and their indexes if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!("Record tables ready");
        Ok(())
    }

    /// Get pool statistics for monitoring.
    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max: self.pool.options().get_max_connections(),
        }
    }

    fn parse_love_test_row(row: &PgRow) -> Result<LoveTestRecord, sqlx::Error> {
        let id: Uuid = row.try_get("id")?;
        Ok(LoveTestRecord {
            id: RecordId::new(id),
            user_name: row.try_get("user_name")?,
            user_branch: row.try_get("user_branch")?,
            crush_name: row.try_get("crush_name")?,
            crush_branch: row.try_get("crush_branch")?,
            year: row.try_get("year")?,
            lab: row.try_get("lab")?,
            score: row.try_get("score")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn parse_review_row(row: &PgRow) -> Result<ReviewRecord, PostgresError> {
        let id: Uuid = row.try_get("id")?;
        let rating: i16 = row.try_get("rating")?;
        let rating = u8::try_from(rating).map_err(|_| PostgresError::InvalidRow {
            table: "reviews",
            reason: format!("rating {} out of range", rating),
        })?;

        Ok(ReviewRecord {
            id: RecordId::new(id),
            reviewer_name: row.try_get("reviewer_name")?,
            reviewer_branch: row.try_get("reviewer_branch")?,
            rating,
            review_text: row.try_get("review_text")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Server time at the precision Postgres stores (microseconds), so the
/// returned record equals what a later read produces.
fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    type Error = PostgresError;

    async fn create_love_test(&self, record: NewLoveTest) -> Result<LoveTestRecord, Self::Error> {
        let stored = record.into_record(RecordId::generate(), now_micros());
        sqlx::query(
            r#"
            INSERT INTO love_tests
                (id, user_name, user_branch, crush_name, crush_branch, year, lab, score, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#
        )
        .bind(stored.id.as_uuid())
        .bind(&stored.user_name)
        .bind(&stored.user_branch)
        .bind(&stored.crush_name)
        .bind(&stored.crush_branch)
        .bind(&stored.year)
        .bind(&stored.lab)
        .bind(stored.score)
        .bind(stored.created_at)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn create_review(&self, record: NewReview) -> Result<ReviewRecord, Self::Error> {
        let stored = record.into_record(RecordId::generate(), now_micros());
        sqlx::query(
            r#"
            INSERT INTO reviews
                (id, reviewer_name, reviewer_branch, rating, review_text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#
        )
        .bind(stored.id.as_uuid())
        .bind(&stored.reviewer_name)
        .bind(&stored.reviewer_branch)
        .bind(i16::from(stored.rating))
        .bind(&stored.review_text)
        .bind(stored.created_at)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn list_love_tests(&self) -> Result<Vec<LoveTestRecord>, Self::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_name, user_branch, crush_name, crush_branch, year, lab,
                   score, created_at
            FROM love_tests
            ORDER BY created_at DESC, seq DESC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(Self::parse_love_test_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(PostgresError::from)
    }

    async fn list_reviews(&self, limit: Option<usize>) -> Result<Vec<ReviewRecord>, Self::Error> {
        // LIMIT NULL means no limit.
        let rows = sqlx::query(
            r#"
            SELECT id, reviewer_name, reviewer_branch, rating, review_text, created_at
            FROM reviews
            ORDER BY created_at DESC, seq DESC
            LIMIT $1
            "#
        )
        .bind(limit.map(|l| l as i64))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::parse_review_row).collect()
    }

    async fn count_love_tests(&self) -> Result<u64, Self::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM love_tests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn count_reviews(&self) -> Result<u64, Self::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn delete_all_love_tests(&self) -> Result<u64, Self::Error> {
        let result = sqlx::query("DELETE FROM love_tests")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_all_reviews(&self) -> Result<u64, Self::Error> {
        let result = sqlx::query("DELETE FROM reviews")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), Self::Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
