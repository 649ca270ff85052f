//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Client, ClientFilter, Identity, Presentation, StoredImage, User};

/// Data persistence contract for presentations.
///
/// `share_id` carries a uniqueness constraint: `insert` and `update` return
/// [`AppError::Conflict`](crate::AppError::Conflict) when it is violated.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PresentationRepo: Send + Sync {
    async fn insert(&self, presentation: &Presentation) -> Result<()>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Presentation>>;
    async fn find_by_share_id(&self, share_id: &str) -> Result<Option<Presentation>>;
    /// Newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Presentation>>;
    /// Replaces every mutable column of the row with `presentation.id`.
    /// Returns `false` if the row no longer exists.
    async fn update(&self, presentation: &Presentation) -> Result<bool>;
    /// Atomically bumps `view_count` by one and sets `last_viewed_at`.
    /// Returns the new count, or `None` if the row no longer exists.
    async fn record_view(&self, id: Uuid, at: DateTime<Utc>) -> Result<Option<i64>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    /// Presentations whose `expires_at` lies before `now`.
    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<Presentation>>;
}

/// Binary image storage with derived thumbnails.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores an encoded image under `namespace`.
    /// Malformed payloads fail with `ValidationError`.
    async fn store(&self, encoded: &str, namespace: &str) -> Result<StoredImage>;
    /// Stores raw image bytes under `namespace`, written as png.
    async fn store_bytes(&self, bytes: Vec<u8>, namespace: &str) -> Result<StoredImage>;
    /// Best-effort removal of an image and its thumbnail. Never fails.
    async fn delete(&self, asset_id: &str);
    /// Sequential best-effort removal.
    async fn delete_many(&self, asset_ids: &[String]);
}

/// One-way password hashing for presentation and account passwords.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<String>;
    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool>;
}

/// Produces short public identifiers. Collisions are possible and must be
/// handled by the caller.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ShareIdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Issues and checks bearer tokens.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    fn issue(&self, user: &User) -> Result<String>;
    /// Fails with `Unauthorized` for malformed, forged or expired tokens.
    fn verify(&self, token: &str) -> Result<Identity>;
}

/// Account persistence. `email` is unique.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> Result<()>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn touch_last_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<()>;
}

/// Client directory persistence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ClientRepo: Send + Sync {
    /// Returns the requested page and the total number of matches.
    async fn list(&self, filter: &ClientFilter) -> Result<(Vec<Client>, u64)>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>>;
    async fn insert(&self, client: &Client) -> Result<()>;
    async fn update(&self, client: &Client) -> Result<bool>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn count(&self, is_active: Option<bool>) -> Result<u64>;
    async fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64>;
}
