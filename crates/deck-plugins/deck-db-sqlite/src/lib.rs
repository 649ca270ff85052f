//! # deck-db-sqlite
//!
//! Maps the SQLite relational model onto the `deck-core` domain models.
//! Ids are stored as 16-byte BLOBs, timestamps as RFC 3339 text and nested
//! values (slides, settings, social links) as JSON text.

mod clients;
mod presentations;
mod users;

use std::str::FromStr;

use deck_core::error::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

pub use clients::SqliteClientRepo;
pub use presentations::SqlitePresentationRepo;
pub use users::SqliteUserRepo;

/// Opens (creating if needed) the database at `url` and applies migrations.
///
/// In-memory databases live as long as their connection, so the pool is
/// pinned to a single connection that is never recycled.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(db_err)?
        .create_if_missing(true);

    let mut pool = SqlitePoolOptions::new();
    if url.contains(":memory:") {
        pool = pool
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    let pool = pool.connect_with(options).await.map_err(db_err)?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::internal(format!("migration failed: {e}")))?;
    info!(url, "database ready");
    Ok(pool)
}

// Helper for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Result<Uuid> {
    Uuid::from_slice(blob).map_err(|e| AppError::internal(format!("corrupt id column: {e}")))
}

fn uuid_column(row: &SqliteRow, column: &str) -> Result<Uuid> {
    let blob: Vec<u8> = row.try_get(column).map_err(db_err)?;
    blob_to_uuid(&blob)
}

fn json_column<T: serde::de::DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<T> {
    let text: String = row.try_get(column).map_err(db_err)?;
    serde_json::from_str(&text)
        .map_err(|e| AppError::internal(format!("corrupt {column} column: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(AppError::internal)
}

fn count_column(row: &SqliteRow) -> Result<u64> {
    let n: i64 = row.try_get(0).map_err(db_err)?;
    Ok(u64::try_from(n).unwrap_or_default())
}

/// Unique violations surface as `Conflict`; everything else is internal.
fn db_err(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(db.message().to_string())
        }
        _ => AppError::internal(e),
    }
}

#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    connect("sqlite::memory:").await.unwrap()
}
