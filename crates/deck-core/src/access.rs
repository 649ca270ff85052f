//! # Presentation Access Controller
//!
//! Arbitrates anonymous access to a presentation through its share id.
//! Expiry is checked before the password, so an expired protected link
//! always reports "expired".

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::input::non_empty;
use crate::models::{AccessInfo, Presentation, PublicPresentation};
use crate::traits::{CredentialHasher, PresentationRepo};

pub const EXPIRED: &str = "presentation has expired";
pub const PASSWORD_REQUIRED: &str = "presentation requires a password";
pub const INCORRECT_PASSWORD: &str = "incorrect password";

pub struct AccessController {
    repo: Arc<dyn PresentationRepo>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AccessController {
    pub fn new(repo: Arc<dyn PresentationRepo>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { repo, hasher }
    }

    /// Reports whether a password is needed, without recording a view.
    pub async fn check_access(&self, share_id: &str) -> Result<AccessInfo> {
        let presentation = self.find_live(share_id, Utc::now()).await?;
        Ok(AccessInfo {
            requires_password: presentation.requires_password(),
            title: presentation.title,
        })
    }

    /// Grants access, records exactly one view and returns the sanitized deck.
    pub async fn view(&self, share_id: &str, password: Option<&str>) -> Result<PublicPresentation> {
        let now = Utc::now();
        let mut presentation = self.find_live(share_id, now).await?;

        if let Some(hash) = presentation.password_hash.as_deref() {
            let password = non_empty(password)
                .ok_or_else(|| AppError::Forbidden(PASSWORD_REQUIRED.into()))?;
            if !self.hasher.verify(password, hash).await? {
                debug!(share_id, "rejected view with incorrect password");
                return Err(AppError::Forbidden(INCORRECT_PASSWORD.into()));
            }
        }

        let view_count = self
            .repo
            .record_view(presentation.id, now)
            .await?
            .ok_or_else(|| AppError::not_found("Presentation", share_id))?;
        presentation.view_count = view_count;
        presentation.last_viewed_at = Some(now);

        info!(share_id, presentation_id = %presentation.id, view_count, "presentation viewed");
        Ok(PublicPresentation::from(&presentation))
    }

    async fn find_live(&self, share_id: &str, now: DateTime<Utc>) -> Result<Presentation> {
        let presentation = self
            .repo
            .find_by_share_id(share_id)
            .await?
            .ok_or_else(|| AppError::not_found("Presentation", share_id))?;
        if presentation.is_expired(now) {
            return Err(AppError::Forbidden(EXPIRED.into()));
        }
        Ok(presentation)
    }
}
