use async_trait::async_trait;
use snip_core::repository::{ReadRepository, Repository, Result, UrlMapping};
use snip_core::{ShortCode, StorageError};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySqlPool, Row};
use tracing::info;

const URL_MAP_DDL: &str = include_str!("../ddl/mysql/url_map.sql");

/// MySQL implementation of the repository contract.
///
/// Mappings live in the `url_map` table. Uniqueness of `short_code` is
/// enforced by a unique key with a binary collation, so codes differing only
/// in case are distinct rows.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with(MySqlPoolOptions::new(), database_url).await
    }

    /// Creates a repository with custom pool options.
    pub async fn connect_with(options: MySqlPoolOptions, database_url: &str) -> Result<Self> {
        let pool = options
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `url_map` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(URL_MAP_DDL)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        info!("url_map schema is in place");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT long_url
            FROM url_map
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let long_url: String = row.try_get("long_url").map_err(map_sqlx_error)?;
        Ok(Some(long_url))
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM url_map
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, mapping: &UrlMapping) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO url_map (short_code, long_url)
            VALUES (?, ?)
            "#,
        )
        .bind(mapping.short_code.as_str())
        .bind(mapping.long_url.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(mapping.short_code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}
