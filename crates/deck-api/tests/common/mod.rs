#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::Engine;
use chrono::Duration;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use deck_api::{build_router, AppState, RouterConfig};
use deck_auth_simple::{Argon2Hasher, JwtIdentityProvider, RandomShareIdGenerator};
use deck_core::{
    AccessController, AccountService, ClientDirectory, CredentialHasher, IdentityProvider,
    ImageStore, MutationService, PresentationRepo,
};
use deck_db_sqlite::{SqliteClientRepo, SqlitePresentationRepo, SqliteUserRepo};
use deck_storage_local::LocalImageStore;

pub const BASE_URL: &str = "http://test.local";

/// A fully wired application over in-memory SQLite and a temp upload dir.
pub struct TestApp {
    pub router: Router,
    pub uploads: TempDir,
}

pub async fn spawn_app() -> TestApp {
    let uploads = TempDir::new().unwrap();
    let pool = deck_db_sqlite::connect("sqlite::memory:").await.unwrap();

    let repo: Arc<dyn PresentationRepo> = Arc::new(SqlitePresentationRepo::new(pool.clone()));
    let images: Arc<dyn ImageStore> = Arc::new(LocalImageStore::new(
        uploads.path().to_path_buf(),
        format!("{BASE_URL}/uploads"),
    ));
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher::new());
    let identity: Arc<dyn IdentityProvider> = Arc::new(JwtIdentityProvider::new(
        b"integration-secret",
        Duration::hours(1),
    ));

    let state = AppState {
        access: Arc::new(AccessController::new(repo.clone(), hasher.clone())),
        presentations: Arc::new(MutationService::new(
            repo,
            images.clone(),
            hasher.clone(),
            Arc::new(RandomShareIdGenerator::new()),
        )),
        accounts: Arc::new(AccountService::new(
            Arc::new(SqliteUserRepo::new(pool.clone())),
            hasher,
            identity.clone(),
        )),
        clients: Arc::new(ClientDirectory::new(Arc::new(SqliteClientRepo::new(pool)))),
        images,
        identity,
    };
    let config = RouterConfig {
        cors_origin: "http://localhost:5173".parse().unwrap(),
        max_body_bytes: 10 * 1024 * 1024,
        upload_dir: uploads.path().to_path_buf(),
    };

    TestApp {
        router: build_router(state, &config),
        uploads,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        match body {
            Some(body) => {
                self.request_raw(method, uri, token, "application/json", body.to_string().into_bytes())
                    .await
            }
            None => self.send(self.builder(method, uri, token).body(Body::empty()).unwrap()).await,
        }
    }

    /// Sends `body` verbatim with the given content type.
    pub async fn request_raw(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        content_type: &str,
        body: Vec<u8>,
    ) -> (StatusCode, Value) {
        let request = self
            .builder(method, uri, token)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    fn builder(&self, method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Registers a fresh account and returns its bearer token.
    pub async fn register(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": "secret123" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["accessToken"].as_str().unwrap().to_string()
    }

    /// Number of regular files below the upload root.
    pub fn stored_file_count(&self) -> usize {
        fn walk(dir: &std::path::Path) -> usize {
            std::fs::read_dir(dir)
                .map(|entries| {
                    entries
                        .flatten()
                        .map(|e| {
                            let path = e.path();
                            if path.is_dir() {
                                walk(&path)
                            } else {
                                1
                            }
                        })
                        .sum()
                })
                .unwrap_or(0)
        }
        walk(self.uploads.path())
    }
}

/// Encoded bytes of a small solid PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// A small PNG as a `data:` URL.
pub fn png_data_url(width: u32, height: u32) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes(width, height))
    )
}

pub const MULTIPART_BOUNDARY: &str = "deckshare-test-boundary";

/// Builds a `multipart/form-data` body. A field with a file name is sent as
/// a file part.
pub fn multipart_body(fields: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, file_name, data) in fields {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
}

pub fn slide(order: i32, title: &str) -> Value {
    json!({ "order": order, "title": title, "imageData": png_data_url(8, 6) })
}
