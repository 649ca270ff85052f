//! # Presentation Mutation Service
//!
//! Owner-authenticated lifecycle operations. Every operation on an existing
//! presentation loads it, compares `owner_id` with the requester and fails
//! with `Forbidden` on mismatch.
//!
//! Slide uploads within one call run concurrently; the resulting list is
//! re-sorted by `order` before it is persisted, so completion order never
//! leaks into storage.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::input::{non_empty, NewPresentation, NewSlides, PresentationPatch, SlideInput};
use crate::models::{
    sort_slides, Identity, Presentation, PresentationSettings, PresentationSummary, Slide,
};
use crate::traits::{CredentialHasher, ImageStore, PresentationRepo, ShareIdGenerator};

/// Attempts at finding an unused share id before giving up.
pub const MAX_SHARE_ID_ATTEMPTS: usize = 5;

pub const NOT_OWNER: &str = "you do not own this presentation";

/// Image Store namespace for one owner's slides.
pub fn upload_namespace(owner_id: Uuid) -> String {
    format!("presentations/{owner_id}")
}

pub struct MutationService {
    repo: Arc<dyn PresentationRepo>,
    images: Arc<dyn ImageStore>,
    hasher: Arc<dyn CredentialHasher>,
    share_ids: Arc<dyn ShareIdGenerator>,
}

impl MutationService {
    pub fn new(
        repo: Arc<dyn PresentationRepo>,
        images: Arc<dyn ImageStore>,
        hasher: Arc<dyn CredentialHasher>,
        share_ids: Arc<dyn ShareIdGenerator>,
    ) -> Self {
        Self {
            repo,
            images,
            hasher,
            share_ids,
        }
    }

    pub async fn create(&self, input: NewPresentation, owner: &Identity) -> Result<Presentation> {
        input.check()?;

        // Hash first so a hashing failure cannot orphan uploads.
        let password_hash = self.hash_optional(input.password.as_deref()).await?;
        let slides = self
            .upload_slides(&input.slides, &upload_namespace(owner.user_id))
            .await?;

        let now = Utc::now();
        let mut presentation = Presentation {
            id: Uuid::now_v7(),
            share_id: String::new(),
            title: input.title,
            description: input.description,
            slides,
            owner_id: owner.user_id,
            owner_display_name: owner.display_name.clone(),
            is_public: input.is_public.unwrap_or(true),
            password_hash,
            expires_at: input.expires_at,
            view_count: 0,
            last_viewed_at: None,
            client_id: input.client_id,
            client_name: input.client_name,
            settings: input
                .settings
                .unwrap_or_default()
                .apply(PresentationSettings::default()),
            created_at: now,
            updated_at: now,
        };

        if let Err(err) = self.insert_with_fresh_share_id(&mut presentation).await {
            self.images.delete_many(&presentation.asset_ids()).await;
            return Err(err);
        }

        info!(
            presentation_id = %presentation.id,
            share_id = %presentation.share_id,
            owner_id = %owner.user_id,
            slides = presentation.slides.len(),
            "presentation created"
        );
        Ok(presentation)
    }

    /// Summaries of the requester's presentations, newest first.
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<PresentationSummary>> {
        let presentations = self.repo.list_by_owner(owner_id).await?;
        Ok(presentations.iter().map(PresentationSummary::from).collect())
    }

    /// Full document for its owner. The password hash is never serialized.
    pub async fn get_owned(&self, id: Uuid, requester: Uuid) -> Result<Presentation> {
        self.owned(id, requester).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: PresentationPatch,
        requester: Uuid,
    ) -> Result<Presentation> {
        patch.validate()?;
        let mut presentation = self.owned(id, requester).await?;

        if let Some(hash) = self.hash_optional(patch.password.as_deref()).await? {
            presentation.password_hash = Some(hash);
        }
        if let Some(title) = patch.title {
            presentation.title = title;
        }
        if let Some(description) = patch.description {
            presentation.description = Some(description);
        }
        if let Some(is_public) = patch.is_public {
            presentation.is_public = is_public;
        }
        if let Some(expires_at) = patch.expires_at {
            presentation.expires_at = Some(expires_at);
        }
        if let Some(settings) = patch.settings {
            presentation.settings = settings.apply(presentation.settings);
        }
        presentation.updated_at = Utc::now();

        self.persist(&presentation).await?;
        info!(presentation_id = %id, "presentation updated");
        Ok(presentation)
    }

    pub async fn add_slides(&self, id: Uuid, input: NewSlides, requester: Uuid) -> Result<Presentation> {
        input.check()?;
        let mut presentation = self.owned(id, requester).await?;

        let uploaded = self
            .upload_slides(&input.slides, &upload_namespace(presentation.owner_id))
            .await?;
        let new_assets: Vec<String> = uploaded.iter().map(|s| s.asset_id.clone()).collect();

        presentation.slides.extend(uploaded);
        sort_slides(&mut presentation.slides);
        presentation.updated_at = Utc::now();

        if let Err(err) = self.persist(&presentation).await {
            self.images.delete_many(&new_assets).await;
            return Err(err);
        }
        info!(
            presentation_id = %id,
            added = new_assets.len(),
            total = presentation.slides.len(),
            "slides appended"
        );
        Ok(presentation)
    }

    pub async fn regenerate_share_link(&self, id: Uuid, requester: Uuid) -> Result<Presentation> {
        let mut presentation = self.owned(id, requester).await?;
        let previous = presentation.share_id.clone();
        presentation.updated_at = Utc::now();

        self.update_with_fresh_share_id(&mut presentation).await?;
        info!(
            presentation_id = %id,
            old_share_id = %previous,
            share_id = %presentation.share_id,
            "share link regenerated"
        );
        Ok(presentation)
    }

    /// Removes every slide asset (best-effort) and then the document.
    pub async fn delete(&self, id: Uuid, requester: Uuid) -> Result<()> {
        let presentation = self.owned(id, requester).await?;
        self.remove(&presentation).await?;
        info!(presentation_id = %id, "presentation deleted");
        Ok(())
    }

    /// Deletes every presentation whose expiry has passed, assets included.
    /// Returns how many documents were removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let expired = self.repo.list_expired(now).await?;
        let mut purged = 0;
        for presentation in &expired {
            match self.remove(presentation).await {
                Ok(()) => purged += 1,
                Err(err) => warn!(
                    presentation_id = %presentation.id,
                    error = %err,
                    "failed to purge expired presentation"
                ),
            }
        }
        if purged > 0 {
            info!(purged, "expired presentations purged");
        }
        Ok(purged)
    }

    async fn remove(&self, presentation: &Presentation) -> Result<()> {
        let assets = presentation.asset_ids();
        if !assets.is_empty() {
            self.images.delete_many(&assets).await;
        }
        self.repo.delete(presentation.id).await?;
        Ok(())
    }

    async fn owned(&self, id: Uuid, requester: Uuid) -> Result<Presentation> {
        let presentation = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Presentation", id))?;
        if !presentation.is_owned_by(requester) {
            warn!(presentation_id = %id, requester = %requester, "ownership check failed");
            return Err(AppError::Forbidden(NOT_OWNER.into()));
        }
        Ok(presentation)
    }

    async fn persist(&self, presentation: &Presentation) -> Result<()> {
        if self.repo.update(presentation).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Presentation", presentation.id))
        }
    }

    async fn hash_optional(&self, password: Option<&str>) -> Result<Option<String>> {
        match non_empty(password) {
            Some(password) => Ok(Some(self.hasher.hash(password).await?)),
            None => Ok(None),
        }
    }

    /// Uploads every slide concurrently. On any failure the uploads that did
    /// succeed are removed again and the first error is returned.
    async fn upload_slides(&self, inputs: &[SlideInput], namespace: &str) -> Result<Vec<Slide>> {
        let results = join_all(inputs.iter().map(|input| async move {
            let stored = self.images.store(&input.image_data, namespace).await?;
            Ok::<_, AppError>(Slide {
                order: input.order,
                title: input.title.clone(),
                image_url: stored.url,
                thumbnail_url: stored.thumbnail_url,
                asset_id: stored.asset_id,
                metadata: input.metadata.clone(),
            })
        }))
        .await;

        let mut slides = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(slide) => slides.push(slide),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        if let Some(err) = first_error {
            let uploaded: Vec<String> = slides.iter().map(|s| s.asset_id.clone()).collect();
            self.images.delete_many(&uploaded).await;
            return Err(err);
        }

        sort_slides(&mut slides);
        Ok(slides)
    }

    async fn insert_with_fresh_share_id(&self, presentation: &mut Presentation) -> Result<()> {
        for attempt in 1..=MAX_SHARE_ID_ATTEMPTS {
            presentation.share_id = self.share_ids.generate();
            match self.repo.insert(presentation).await {
                Err(AppError::Conflict(_)) => {
                    warn!(attempt, share_id = %presentation.share_id, "share id collision");
                }
                other => return other,
            }
        }
        Err(AppError::Conflict("could not allocate a unique share id".into()))
    }

    async fn update_with_fresh_share_id(&self, presentation: &mut Presentation) -> Result<()> {
        let previous = presentation.share_id.clone();
        for attempt in 1..=MAX_SHARE_ID_ATTEMPTS {
            let candidate = self.share_ids.generate();
            if candidate == previous {
                continue;
            }
            presentation.share_id = candidate;
            match self.repo.update(presentation).await {
                Ok(true) => return Ok(()),
                Ok(false) => return Err(AppError::not_found("Presentation", presentation.id)),
                Err(AppError::Conflict(_)) => {
                    warn!(attempt, share_id = %presentation.share_id, "share id collision");
                }
                Err(err) => return Err(err),
            }
        }
        presentation.share_id = previous;
        Err(AppError::Conflict("could not allocate a unique share id".into()))
    }
}
