//! Client directory: plain CRUD plus paginated search and counters.

use std::sync::Arc;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::input::{ClientPatch, ClientQuery, NewClient};
use crate::models::{Client, ClientFilter, ClientSortField, ClientStats, Page, Pagination, SortOrder};
use crate::traits::ClientRepo;

pub const SEARCH_LIMIT: u32 = 20;

pub struct ClientDirectory {
    repo: Arc<dyn ClientRepo>,
}

impl ClientDirectory {
    pub fn new(repo: Arc<dyn ClientRepo>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, query: &ClientQuery) -> Result<Page<Client>> {
        let (page, limit) = query.page_and_limit();
        let (data, total) = self.repo.list(&query.to_filter()).await?;
        Ok(Page {
            data,
            pagination: Pagination::new(page, limit, total),
        })
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Client>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::ValidationError("search term is required".into()));
        }
        let filter = ClientFilter {
            search: Some(term.to_string()),
            sort_by: ClientSortField::Name,
            sort_order: SortOrder::Asc,
            offset: 0,
            limit: SEARCH_LIMIT,
        };
        Ok(self.repo.list(&filter).await?.0)
    }

    pub async fn stats(&self, now: DateTime<Utc>) -> Result<ClientStats> {
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .ok_or_else(|| AppError::internal("invalid month start"))?;
        Ok(ClientStats {
            total: self.repo.count(None).await?,
            active: self.repo.count(Some(true)).await?,
            inactive: self.repo.count(Some(false)).await?,
            this_month: self.repo.count_created_since(month_start).await?,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Client> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Client", id))
    }

    pub async fn create(&self, input: NewClient) -> Result<Client> {
        input.validate()?;
        let now = Utc::now();
        let client = Client {
            id: Uuid::now_v7(),
            name: input.name,
            position: input.position,
            election_date: input.election_date,
            campaign_start: input.campaign_start,
            image_url: input.image_url,
            political_party: input.political_party,
            party_logo_url: input.party_logo_url,
            color: input.color,
            social_media: input.social_media.unwrap_or_default(),
            is_active: input.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&client).await?;
        info!(client_id = %client.id, "client created");
        Ok(client)
    }

    pub async fn update(&self, id: Uuid, patch: ClientPatch) -> Result<Client> {
        patch.validate()?;
        let mut client = self.get(id).await?;

        macro_rules! assign {
            ($($field:ident),*) => {
                $(if let Some(value) = patch.$field { client.$field = value; })*
            };
        }
        macro_rules! assign_optional {
            ($($field:ident),*) => {
                $(if let Some(value) = patch.$field { client.$field = Some(value); })*
            };
        }
        assign!(name, position, election_date, campaign_start, social_media, is_active);
        assign_optional!(image_url, political_party, party_logo_url, color);
        client.updated_at = Utc::now();

        if !self.repo.update(&client).await? {
            return Err(AppError::not_found("Client", id));
        }
        Ok(client)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("Client", id));
        }
        info!(client_id = %id, "client deleted");
        Ok(())
    }
}
