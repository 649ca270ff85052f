//! # Domain Models
//!
//! These structs represent the core entities of deckshare.
//! We use UUID v7 for time-ordered, globally unique identification.
//!
//! `owner_display_name` and `client_name` are snapshots taken at write time
//! and are never recomputed, so they may go stale when the source record
//! changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form per-slide metadata bucket.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Client-facing path of a shared presentation.
pub fn share_url(share_id: &str) -> String {
    format!("/p/{share_id}")
}

/// One ordered image entry within a presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Explicit position; slides are kept sorted ascending by this value.
    pub order: i32,
    pub title: String,
    pub image_url: String,
    pub thumbnail_url: String,
    /// Image Store handle used to delete the image/thumbnail pair later.
    pub asset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Sorts slides ascending by `order`. Stable, so equal orders keep their relative position.
pub fn sort_slides(slides: &mut [Slide]) {
    slides.sort_by_key(|s| s.order);
}

/// Viewer options, passed through to clients untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationSettings {
    pub allow_download: bool,
    pub show_watermark: bool,
    pub auto_play: bool,
    /// Seconds between slides when `auto_play` is on.
    pub auto_play_interval: u32,
}

impl Default for PresentationSettings {
    fn default() -> Self {
        Self {
            allow_download: false,
            show_watermark: true,
            auto_play: false,
            auto_play_interval: 5,
        }
    }
}

/// The central shared entity: an ordered deck of uploaded images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub id: Uuid,
    /// Short public token used in lieu of `id` for anonymous access.
    pub share_id: String,
    pub title: String,
    pub description: Option<String>,
    pub slides: Vec<Slide>,
    pub owner_id: Uuid,
    pub owner_display_name: String,
    /// Stored and returned, but access is gated only by password and expiry.
    pub is_public: bool,
    /// Argon2 PHC string. Never leaves the process.
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub settings: PresentationSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Presentation {
    pub fn requires_password(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn asset_ids(&self) -> Vec<String> {
        self.slides.iter().map(|s| s.asset_id.clone()).collect()
    }
}

/// Result of an Image Store upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub url: String,
    pub thumbnail_url: String,
    pub asset_id: String,
    pub width: u32,
    pub height: u32,
}

// ---------------------------------------------------------------------------
// Presentation projections
// ---------------------------------------------------------------------------

/// Answer to "may I open this link?" without leaking anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessInfo {
    pub requires_password: bool,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSlide {
    pub order: i32,
    pub title: String,
    pub image_url: String,
    pub thumbnail_url: String,
}

/// What an anonymous viewer receives. Carries no owner id, asset ids,
/// slide metadata or password material.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPresentation {
    pub share_id: String,
    pub title: String,
    pub description: Option<String>,
    pub slides: Vec<PublicSlide>,
    pub owner_display_name: String,
    pub client_name: Option<String>,
    pub settings: PresentationSettings,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Presentation> for PublicPresentation {
    fn from(p: &Presentation) -> Self {
        Self {
            share_id: p.share_id.clone(),
            title: p.title.clone(),
            description: p.description.clone(),
            slides: p
                .slides
                .iter()
                .map(|s| PublicSlide {
                    order: s.order,
                    title: s.title.clone(),
                    image_url: s.image_url.clone(),
                    thumbnail_url: s.thumbnail_url.clone(),
                })
                .collect(),
            owner_display_name: p.owner_display_name.clone(),
            client_name: p.client_name.clone(),
            settings: p.settings,
            view_count: p.view_count,
            created_at: p.created_at,
        }
    }
}

/// Owner listing row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationSummary {
    pub id: Uuid,
    pub share_id: String,
    pub title: String,
    pub description: Option<String>,
    pub slide_count: usize,
    pub thumbnail: Option<String>,
    pub is_public: bool,
    pub has_password: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub client_name: Option<String>,
    pub share_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Presentation> for PresentationSummary {
    fn from(p: &Presentation) -> Self {
        Self {
            id: p.id,
            share_id: p.share_id.clone(),
            title: p.title.clone(),
            description: p.description.clone(),
            slide_count: p.slides.len(),
            thumbnail: p.slides.first().map(|s| s.thumbnail_url.clone()),
            is_public: p.is_public,
            has_password: p.requires_password(),
            expires_at: p.expires_at,
            view_count: p.view_count,
            last_viewed_at: p.last_viewed_at,
            client_name: p.client_name.clone(),
            share_url: share_url(&p.share_id),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPresentation {
    pub id: Uuid,
    pub share_id: String,
    pub title: String,
    pub share_url: String,
    pub slide_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Presentation> for CreatedPresentation {
    fn from(p: &Presentation) -> Self {
        Self {
            id: p.id,
            share_id: p.share_id.clone(),
            title: p.title.clone(),
            share_url: share_url(&p.share_id),
            slide_count: p.slides.len(),
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedPresentation {
    pub id: Uuid,
    pub share_id: String,
    pub title: String,
    pub share_url: String,
}

impl From<&Presentation> for UpdatedPresentation {
    fn from(p: &Presentation) -> Self {
        Self {
            id: p.id,
            share_id: p.share_id.clone(),
            title: p.title.clone(),
            share_url: share_url(&p.share_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidesAppended {
    pub id: Uuid,
    pub slide_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub share_id: String,
    pub share_url: String,
}

impl From<&Presentation> for ShareLink {
    fn from(p: &Presentation) -> Self {
        Self {
            share_id: p.share_id.clone(),
            share_url: share_url(&p.share_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// A registered account that can own presentations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Always stored lower-cased.
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The authenticated caller as vouched for by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    pub access_token: String,
}

// ---------------------------------------------------------------------------
// Client directory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub election_date: String,
    pub campaign_start: String,
    pub image_url: Option<String>,
    pub political_party: Option<String>,
    pub party_logo_url: Option<String>,
    pub color: Option<String>,
    pub social_media: SocialMedia,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientSortField {
    Name,
    Position,
    ElectionDate,
    #[default]
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Normalized listing request handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFilter {
    pub search: Option<String>,
    pub sort_by: ClientSortField,
    pub sort_order: SortOrder,
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(limit.max(1)));
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: u64::from(page) < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub this_month: u64,
}
