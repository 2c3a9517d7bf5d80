//! PostgreSQL settings store implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row, postgres::PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

use crate::domain::{AppError, DatabaseError, Setting, SettingsStore};

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// PostgreSQL-backed settings store with connection pooling
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client with custom configuration
    pub async fn new(database_url: &str, config: PostgresConfig) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client with default configuration
    pub async fn with_defaults(database_url: &str) -> Result<Self, AppError> {
        Self::new(database_url, PostgresConfig::default()).await
    }

    /// Run database migrations using sqlx migrate
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying connection pool (for testing)
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_setting(row: &sqlx::postgres::PgRow) -> Result<Setting, AppError> {
        let read = |e: sqlx::Error| AppError::Database(DatabaseError::Query(e.to_string()));
        Ok(Setting {
            id: row.try_get("id").map_err(read)?,
            key: row.try_get("key").map_err(read)?,
            value: row.try_get("value").map_err(read)?,
            created_at: row.try_get("created_at").map_err(read)?,
            updated_at: row.try_get("updated_at").map_err(read)?,
        })
    }
}

#[async_trait]
impl SettingsStore for PostgresClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(DatabaseError::Connection(e.to_string())))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, AppError> {
        let row = sqlx::query(
            r#"
            SELECT id, key, value, created_at, updated_at
            FROM settings
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::from(e)))?;

        row.as_ref().map(Self::row_to_setting).transpose()
    }

    #[instrument(skip(self, value))]
    async fn upsert_setting(&self, key: &str, value: &str) -> Result<Setting, AppError> {
        let now = Utc::now();

        let row = sqlx::query(
            r#"
            INSERT INTO settings (key, value, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value,
                updated_at = EXCLUDED.updated_at
            RETURNING id, key, value, created_at, updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::from(e)))?;

        Self::row_to_setting(&row)
    }

    #[instrument(skip(self))]
    async fn list_settings(&self) -> Result<Vec<Setting>, AppError> {
        let rows = sqlx::query(
            r#"
            SELECT id, key, value, created_at, updated_at
            FROM settings
            ORDER BY key ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::from(e)))?;

        rows.iter().map(Self::row_to_setting).collect()
    }
}
