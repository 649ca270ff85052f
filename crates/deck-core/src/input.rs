//! Validated command payloads accepted by the services.
//!
//! Every service entry point calls `validate()` before touching a port, so a
//! malformed request never reaches storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::Result;
use crate::models::{
    ClientFilter, ClientSortField, Metadata, PresentationSettings, SocialMedia, SortOrder,
};

/// One slide to upload: ordering key, caption and encoded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SlideInput {
    pub order: i32,
    #[validate(length(min = 1, message = "slide title is required"))]
    pub title: String,
    /// `data:image/<fmt>;base64,...` or bare base64.
    #[validate(length(min = 1, message = "slide image data is required"))]
    pub image_data: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

/// Partial viewer options; unset fields fall back to the base they are applied to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub allow_download: Option<bool>,
    pub show_watermark: Option<bool>,
    pub auto_play: Option<bool>,
    pub auto_play_interval: Option<u32>,
}

impl SettingsPatch {
    pub fn apply(&self, base: PresentationSettings) -> PresentationSettings {
        PresentationSettings {
            allow_download: self.allow_download.unwrap_or(base.allow_download),
            show_watermark: self.show_watermark.unwrap_or(base.show_watermark),
            auto_play: self.auto_play.unwrap_or(base.auto_play),
            auto_play_interval: self.auto_play_interval.unwrap_or(base.auto_play_interval),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPresentation {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "at least one slide is required"))]
    pub slides: Vec<SlideInput>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub settings: Option<SettingsPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresentationPatch {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub settings: Option<SettingsPatch>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct NewSlides {
    #[validate(length(min = 1, message = "at least one slide is required"))]
    pub slides: Vec<SlideInput>,
}

/// Validates every slide in turn.
pub fn validate_slides(slides: &[SlideInput]) -> Result<()> {
    for slide in slides {
        slide.validate()?;
    }
    Ok(())
}

impl NewPresentation {
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        validate_slides(&self.slides)
    }
}

impl NewSlides {
    pub fn check(&self) -> Result<()> {
        self.validate()?;
        validate_slides(&self.slides)
    }
}

/// Treats an empty password the same as no password.
pub(crate) fn non_empty(password: Option<&str>) -> Option<&str> {
    password.filter(|p| !p.is_empty())
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct Registration {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

// ---------------------------------------------------------------------------
// Client directory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "position is required"))]
    pub position: String,
    #[validate(length(min = 1, message = "electionDate is required"))]
    pub election_date: String,
    #[validate(length(min = 1, message = "campaignStart is required"))]
    pub campaign_start: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub political_party: Option<String>,
    #[serde(default)]
    pub party_logo_url: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub social_media: Option<SocialMedia>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientPatch {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "position must not be empty"))]
    pub position: Option<String>,
    pub election_date: Option<String>,
    pub campaign_start: Option<String>,
    pub image_url: Option<String>,
    pub political_party: Option<String>,
    pub party_logo_url: Option<String>,
    pub color: Option<String>,
    pub social_media: Option<SocialMedia>,
    pub is_active: Option<bool>,
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw listing parameters as they arrive from a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<ClientSortField>,
    pub sort_order: Option<SortOrder>,
    pub search: Option<String>,
}

impl ClientQuery {
    /// Returns the effective `(page, limit)` after clamping.
    pub fn page_and_limit(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        (page, limit)
    }

    pub fn to_filter(&self) -> ClientFilter {
        let (page, limit) = self.page_and_limit();
        ClientFilter {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
            offset: (page - 1).saturating_mul(limit),
            limit,
        }
    }
}
