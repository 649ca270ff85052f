use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deck_core::error::Result;
use deck_core::models::Presentation;
use deck_core::traits::PresentationRepo;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::{db_err, json_column, to_json, uuid_column, uuid_to_blob};

const COLUMNS: &str = "id, share_id, title, description, slides, owner_id, owner_display_name, \
     is_public, password_hash, expires_at, view_count, last_viewed_at, client_id, client_name, \
     settings, created_at, updated_at";

pub struct SqlitePresentationRepo {
    pool: SqlitePool,
}

impl SqlitePresentationRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn from_row(row: &SqliteRow) -> Result<Presentation> {
    Ok(Presentation {
        id: uuid_column(row, "id")?,
        share_id: row.try_get("share_id").map_err(db_err)?,
        title: row.try_get("title").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        slides: json_column(row, "slides")?,
        owner_id: uuid_column(row, "owner_id")?,
        owner_display_name: row.try_get("owner_display_name").map_err(db_err)?,
        is_public: row.try_get("is_public").map_err(db_err)?,
        password_hash: row.try_get("password_hash").map_err(db_err)?,
        expires_at: row.try_get("expires_at").map_err(db_err)?,
        view_count: row.try_get("view_count").map_err(db_err)?,
        last_viewed_at: row.try_get("last_viewed_at").map_err(db_err)?,
        client_id: row.try_get("client_id").map_err(db_err)?,
        client_name: row.try_get("client_name").map_err(db_err)?,
        settings: json_column(row, "settings")?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

#[async_trait]
impl PresentationRepo for SqlitePresentationRepo {
    async fn insert(&self, p: &Presentation) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO presentations ({COLUMNS}) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(uuid_to_blob(p.id))
        .bind(&p.share_id)
        .bind(&p.title)
        .bind(&p.description)
        .bind(to_json(&p.slides)?)
        .bind(uuid_to_blob(p.owner_id))
        .bind(&p.owner_display_name)
        .bind(p.is_public)
        .bind(&p.password_hash)
        .bind(p.expires_at)
        .bind(p.view_count)
        .bind(p.last_viewed_at)
        .bind(&p.client_id)
        .bind(&p.client_name)
        .bind(to_json(&p.settings)?)
        .bind(p.created_at)
        .bind(p.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Presentation>> {
        sqlx::query(&format!("SELECT {COLUMNS} FROM presentations WHERE id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(from_row)
            .transpose()
    }

    async fn find_by_share_id(&self, share_id: &str) -> Result<Option<Presentation>> {
        sqlx::query(&format!("SELECT {COLUMNS} FROM presentations WHERE share_id = ?"))
            .bind(share_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(from_row)
            .transpose()
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Presentation>> {
        sqlx::query(&format!(
            "SELECT {COLUMNS} FROM presentations WHERE owner_id = ? ORDER BY created_at DESC"
        ))
        .bind(uuid_to_blob(owner_id))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(from_row)
        .collect()
    }

    /// `view_count` and `last_viewed_at` are owned by `record_view` and are
    /// left untouched so a concurrent view is never lost.
    async fn update(&self, p: &Presentation) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE presentations SET share_id = ?, title = ?, description = ?, slides = ?, \
             is_public = ?, password_hash = ?, expires_at = ?, client_id = ?, client_name = ?, \
             settings = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&p.share_id)
        .bind(&p.title)
        .bind(&p.description)
        .bind(to_json(&p.slides)?)
        .bind(p.is_public)
        .bind(&p.password_hash)
        .bind(p.expires_at)
        .bind(&p.client_id)
        .bind(&p.client_name)
        .bind(to_json(&p.settings)?)
        .bind(p.updated_at)
        .bind(uuid_to_blob(p.id))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_view(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<i64>> {
        let row = sqlx::query(
            "UPDATE presentations SET view_count = view_count + 1, last_viewed_at = ? \
             WHERE id = ? RETURNING view_count",
        )
        .bind(at)
        .bind(uuid_to_blob(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| r.try_get::<i64, _>("view_count").map_err(db_err))
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM presentations WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<Presentation>> {
        // Compared in Rust: stored timestamps may carry differing fraction widths.
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM presentations WHERE expires_at IS NOT NULL"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let mut expired = Vec::new();
        for row in &rows {
            let p = from_row(row)?;
            if p.is_expired(now) {
                expired.push(p);
            }
        }
        Ok(expired)
    }
}
