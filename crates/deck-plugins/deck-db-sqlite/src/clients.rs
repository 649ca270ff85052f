use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deck_core::error::Result;
use deck_core::models::{Client, ClientFilter, ClientSortField, SortOrder};
use deck_core::traits::ClientRepo;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::{count_column, db_err, json_column, to_json, uuid_column, uuid_to_blob};

const COLUMNS: &str = "id, name, position, election_date, campaign_start, image_url, \
     political_party, party_logo_url, color, social_media, is_active, created_at, updated_at";

/// Case-insensitive substring match over name, position and party.
const SEARCH_CLAUSE: &str = "(?1 IS NULL OR name LIKE ?1 ESCAPE '\\' \
     OR position LIKE ?1 ESCAPE '\\' OR political_party LIKE ?1 ESCAPE '\\')";

pub struct SqliteClientRepo {
    pool: SqlitePool,
}

impl SqliteClientRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn from_row(row: &SqliteRow) -> Result<Client> {
    Ok(Client {
        id: uuid_column(row, "id")?,
        name: row.try_get("name").map_err(db_err)?,
        position: row.try_get("position").map_err(db_err)?,
        election_date: row.try_get("election_date").map_err(db_err)?,
        campaign_start: row.try_get("campaign_start").map_err(db_err)?,
        image_url: row.try_get("image_url").map_err(db_err)?,
        political_party: row.try_get("political_party").map_err(db_err)?,
        party_logo_url: row.try_get("party_logo_url").map_err(db_err)?,
        color: row.try_get("color").map_err(db_err)?,
        social_media: json_column(row, "social_media")?,
        is_active: row.try_get("is_active").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
    })
}

fn sort_column(field: ClientSortField) -> &'static str {
    match field {
        ClientSortField::Name => "name",
        ClientSortField::Position => "position",
        ClientSortField::ElectionDate => "election_date",
        ClientSortField::CreatedAt => "created_at",
    }
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl ClientRepo for SqliteClientRepo {
    async fn list(&self, filter: &ClientFilter) -> Result<(Vec<Client>, u64)> {
        let pattern = filter.search.as_deref().map(like_pattern);
        let direction = match filter.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        let total = sqlx::query(&format!("SELECT COUNT(*) FROM clients WHERE {SEARCH_CLAUSE}"))
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM clients WHERE {SEARCH_CLAUSE} \
             ORDER BY {} {direction}, id {direction} LIMIT ?2 OFFSET ?3",
            sort_column(filter.sort_by)
        ))
        .bind(&pattern)
        .bind(i64::from(filter.limit))
        .bind(i64::from(filter.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let clients = rows.iter().map(from_row).collect::<Result<Vec<_>>>()?;
        Ok((clients, count_column(&total)?))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>> {
        sqlx::query(&format!("SELECT {COLUMNS} FROM clients WHERE id = ?"))
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(from_row)
            .transpose()
    }

    async fn insert(&self, c: &Client) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO clients ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(uuid_to_blob(c.id))
        .bind(&c.name)
        .bind(&c.position)
        .bind(&c.election_date)
        .bind(&c.campaign_start)
        .bind(&c.image_url)
        .bind(&c.political_party)
        .bind(&c.party_logo_url)
        .bind(&c.color)
        .bind(to_json(&c.social_media)?)
        .bind(c.is_active)
        .bind(c.created_at)
        .bind(c.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update(&self, c: &Client) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE clients SET name = ?, position = ?, election_date = ?, campaign_start = ?, \
             image_url = ?, political_party = ?, party_logo_url = ?, color = ?, social_media = ?, \
             is_active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&c.name)
        .bind(&c.position)
        .bind(&c.election_date)
        .bind(&c.campaign_start)
        .bind(&c.image_url)
        .bind(&c.political_party)
        .bind(&c.party_logo_url)
        .bind(&c.color)
        .bind(to_json(&c.social_media)?)
        .bind(c.is_active)
        .bind(c.updated_at)
        .bind(uuid_to_blob(c.id))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, is_active: Option<bool>) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) FROM clients WHERE ?1 IS NULL OR is_active = ?1")
            .bind(is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        count_column(&row)
    }

    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64> {
        let rows = sqlx::query("SELECT created_at FROM clients")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let mut n = 0;
        for row in &rows {
            let created: DateTime<Utc> = row.try_get("created_at").map_err(db_err)?;
            if created >= since {
                n += 1;
            }
        }
        Ok(n)
    }
}
