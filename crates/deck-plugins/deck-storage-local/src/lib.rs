//! # deck-storage-local
//! deckshare/crates/deck-plugins/deck-storage-local/src/lib.rs
//! Local filesystem implementation of `ImageStore`.
//! Features: namespaced originals, cover-fit thumbnails, best-effort deletes.
//!
//! Layout under the root directory:
//!
//! ```text
//! <namespace>/<uuid>.<ext>                     original
//! thumbnails/<namespace>/<uuid>_thumb.<ext>    300x169 thumbnail
//! ```
//!
//! The asset id is `<namespace>/<uuid>`, which is all `delete` needs to find
//! both files again.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use deck_core::error::{AppError, Result};
use deck_core::models::StoredImage;
use deck_core::traits::ImageStore;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

/// Every extension an original may have been written with.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

pub const THUMBNAIL_WIDTH: u32 = 300;
pub const THUMBNAIL_HEIGHT: u32 = 169;

const THUMBNAIL_DIR: &str = "thumbnails";
/// Reported when the payload cannot be decoded as an image.
const FALLBACK_DIMENSIONS: (u32, u32) = (1920, 1080);

pub struct LocalImageStore {
    /// Root directory for all uploads (e.g., "./uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "http://localhost:3001/uploads")
    url_prefix: String,
}

impl LocalImageStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    fn original_rel(key: &str, ext: &str) -> String {
        format!("{key}.{ext}")
    }

    fn thumbnail_rel(key: &str, ext: &str) -> String {
        format!("{THUMBNAIL_DIR}/{key}_thumb.{ext}")
    }

    fn url(&self, rel: &str) -> String {
        format!("{}/{}", self.url_prefix, rel)
    }

    async fn write(&self, rel: &str, data: &[u8]) -> std::io::Result<()> {
        let path = self.root_path.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await
    }

    /// Removes `rel` if it exists. Failures are logged, never returned.
    async fn remove_if_exists(&self, rel: &str) {
        let path = self.root_path.join(rel);
        match fs::try_exists(&path).await {
            Ok(true) => {
                if let Err(err) = fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %err, "failed to delete stored file");
                }
            }
            Ok(false) => {}
            Err(err) => warn!(path = %path.display(), error = %err, "failed to stat stored file"),
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, encoded: &str, namespace: &str) -> Result<StoredImage> {
        let namespace = valid_namespace(namespace)?;
        let payload = decode_payload(encoded)?;
        self.persist(payload.bytes, payload.extension, &namespace).await
    }

    async fn store_bytes(&self, bytes: Vec<u8>, namespace: &str) -> Result<StoredImage> {
        let namespace = valid_namespace(namespace)?;
        if bytes.is_empty() {
            return Err(AppError::ValidationError("image data is empty".into()));
        }
        self.persist(bytes, "png", &namespace).await
    }

    async fn delete(&self, asset_id: &str) {
        let Some(key) = sanitize_key(asset_id) else {
            warn!(asset_id, "refusing to delete malformed asset id");
            return;
        };
        for ext in SUPPORTED_EXTENSIONS {
            self.remove_if_exists(&Self::original_rel(&key, ext)).await;
            self.remove_if_exists(&Self::thumbnail_rel(&key, ext)).await;
        }
        debug!(asset_id = %key, "asset deleted");
    }

    async fn delete_many(&self, asset_ids: &[String]) {
        for asset_id in asset_ids {
            self.delete(asset_id).await;
        }
    }
}

impl LocalImageStore {
    /// Writes the original, then its thumbnail. Once the original is on disk
    /// the call succeeds; a thumbnail that cannot be derived is replaced by
    /// the original bytes.
    async fn persist(
        &self,
        bytes: Vec<u8>,
        ext: &'static str,
        namespace: &str,
    ) -> Result<StoredImage> {
        let key = format!("{namespace}/{}", Uuid::new_v4());
        let original_rel = Self::original_rel(&key, ext);
        let thumbnail_rel = Self::thumbnail_rel(&key, ext);

        let bytes: Arc<[u8]> = bytes.into();
        self.write(&original_rel, &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("failed to write image: {e}")))?;

        let data = Arc::clone(&bytes);
        let rendered = render_off_thread(&key, move || render_thumbnail(&data, ext)).await;

        let thumbnail_written = match rendered.thumbnail {
            Some(thumb) => match self.write(&thumbnail_rel, &thumb).await {
                Ok(()) => true,
                Err(err) => {
                    warn!(asset_id = %key, error = %err, "failed to write thumbnail, storing original");
                    false
                }
            },
            None => false,
        };
        if !thumbnail_written {
            self.write_fallback_thumbnail(&key, &thumbnail_rel, &bytes).await;
        }

        let (width, height) = rendered.dimensions.unwrap_or(FALLBACK_DIMENSIONS);
        debug!(asset_id = %key, width, height, "image stored");
        Ok(StoredImage {
            url: self.url(&original_rel),
            thumbnail_url: self.url(&thumbnail_rel),
            asset_id: key,
            width,
            height,
        })
    }

    async fn write_fallback_thumbnail(&self, key: &str, rel: &str, original: &[u8]) {
        if let Err(err) = self.write(rel, original).await {
            warn!(asset_id = %key, error = %err, "failed to write fallback thumbnail");
        }
    }
}

fn valid_namespace(namespace: &str) -> Result<String> {
    sanitize_key(namespace)
        .ok_or_else(|| AppError::ValidationError(format!("invalid folder: {namespace}")))
}

struct DecodedPayload {
    bytes: Vec<u8>,
    extension: &'static str,
}

/// Accepts `data:image/<fmt>;base64,<data>` or bare base64 (stored as png).
fn decode_payload(encoded: &str) -> Result<DecodedPayload> {
    let encoded = encoded.trim();
    let (extension, data) = match encoded.strip_prefix("data:") {
        Some(rest) => {
            let (format, data) = rest
                .strip_prefix("image/")
                .and_then(|r| r.split_once(";base64,"))
                .ok_or_else(|| AppError::ValidationError("invalid image format".into()))?;
            (extension_for(format)?, data)
        }
        None => ("png", encoded),
    };

    let bytes = STANDARD
        .decode(data)
        .map_err(|e| AppError::ValidationError(format!("invalid base64 image data: {e}")))?;
    if bytes.is_empty() {
        return Err(AppError::ValidationError("image data is empty".into()));
    }
    Ok(DecodedPayload { bytes, extension })
}

fn extension_for(format: &str) -> Result<&'static str> {
    match format.to_ascii_lowercase().as_str() {
        "png" => Ok("png"),
        "jpeg" | "jpg" => Ok("jpg"),
        "webp" => Ok("webp"),
        "gif" => Ok("gif"),
        other => Err(AppError::ValidationError(format!(
            "unsupported image format: {other}"
        ))),
    }
}

/// Normalizes a slash-separated key. Every segment must be non-empty and made
/// of `[A-Za-z0-9_-]`, which rules out `..` and absolute paths.
pub fn sanitize_key(key: &str) -> Option<String> {
    let segments: Vec<&str> = key.trim_matches('/').split('/').collect();
    let valid = segments.iter().all(|segment| {
        !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    });
    valid.then(|| segments.join("/"))
}

/// Outcome of the blocking decode and resize step.
#[derive(Default)]
struct Rendered {
    /// Natural size of the original, when it decodes.
    dimensions: Option<(u32, u32)>,
    /// Encoded thumbnail, when resizing and encoding succeeded.
    thumbnail: Option<Vec<u8>>,
}

/// Decoding and resizing are CPU-bound. A task that dies (e.g. a decoder
/// panic on a hostile payload) counts as a failed render.
async fn render_off_thread<F>(key: &str, render: F) -> Rendered
where
    F: FnOnce() -> Rendered + Send + 'static,
{
    match tokio::task::spawn_blocking(render).await {
        Ok(rendered) => rendered,
        Err(err) => {
            warn!(asset_id = %key, error = %err, "thumbnail task failed, storing original");
            Rendered::default()
        }
    }
}

fn render_thumbnail(data: &[u8], ext: &str) -> Rendered {
    let img = match image::load_from_memory(data) {
        Ok(img) => img,
        Err(err) => {
            warn!(error = %err, "image could not be decoded, storing original as thumbnail");
            return Rendered::default();
        }
    };
    let dimensions = Some((img.width(), img.height()));

    let format = ImageFormat::from_extension(ext).unwrap_or(ImageFormat::Png);
    let mut thumb = img.resize_to_fill(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, FilterType::Triangle);
    if format == ImageFormat::Jpeg {
        // JPEG has no alpha channel.
        thumb = DynamicImage::ImageRgb8(thumb.to_rgb8());
    }

    let mut bytes = Vec::new();
    let thumbnail = match thumb.write_to(&mut Cursor::new(&mut bytes), format) {
        Ok(()) => Some(bytes),
        Err(err) => {
            warn!(error = %err, "thumbnail encoding failed, storing original");
            None
        }
    };
    Rendered {
        dimensions,
        thumbnail,
    }
}
