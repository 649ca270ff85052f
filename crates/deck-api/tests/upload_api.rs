mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{
    multipart_body, multipart_content_type, png_bytes, png_data_url, spawn_app, BASE_URL,
};

#[tokio::test]
async fn single_upload_reports_dimensions() {
    let app = spawn_app().await;
    let token = app.register("Up", "up@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/upload/base64",
            Some(&token),
            Some(json!({ "image": png_data_url(40, 20) })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["width"], 40);
    assert_eq!(body["data"]["height"], 20);
    assert!(body["data"]["assetId"].as_str().unwrap().starts_with("uploads/"));
    assert!(body["data"]["url"]
        .as_str()
        .unwrap()
        .starts_with(&format!("{BASE_URL}/uploads/uploads/")));
    assert_eq!(app.stored_file_count(), 2);
}

#[tokio::test]
async fn multiple_uploads_come_back_in_order() {
    let app = spawn_app().await;
    let token = app.register("Up", "up@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/upload/base64/multiple",
            Some(&token),
            Some(json!({
                "folder": "campaign/banners",
                "images": [
                    { "base64": png_data_url(4, 4), "order": 9 },
                    { "base64": png_data_url(4, 4), "order": 2 },
                    { "base64": png_data_url(4, 4), "order": 5 },
                ],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let orders: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["order"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![2, 5, 9]);
    assert!(body["data"][0]["assetId"]
        .as_str()
        .unwrap()
        .starts_with("campaign/banners/"));
}

#[tokio::test]
async fn bad_uploads_are_rejected() {
    let app = spawn_app().await;
    let token = app.register("Up", "up@example.com").await;

    let (status, _) = app
        .request(
            "POST",
            "/api/upload/base64",
            Some(&token),
            Some(json!({ "image": png_data_url(4, 4), "folder": "../escape" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            "/api/upload/base64/multiple",
            Some(&token),
            Some(json!({ "images": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            "/api/upload/base64/multiple",
            Some(&token),
            Some(json!({ "images": [
                { "base64": png_data_url(4, 4), "order": 1 },
                { "base64": "data:image/tiff;base64,AAAA", "order": 2 },
            ] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn stored_files_are_served_statically() {
    let app = spawn_app().await;
    let token = app.register("Up", "up@example.com").await;
    let (_, body) = app
        .request(
            "POST",
            "/api/upload/base64",
            Some(&token),
            Some(json!({ "image": png_data_url(4, 4) })),
        )
        .await;
    let url = body["data"]["url"].as_str().unwrap();
    let path = url.strip_prefix(BASE_URL).unwrap();

    let (status, _) = app.request("GET", path, None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn file_upload_stores_raw_bytes_as_png() {
    let app = spawn_app().await;
    let token = app.register("Up", "up@example.com").await;

    let png = png_bytes(30, 12);
    let body = multipart_body(&[
        ("folder", None, &b"decks/files"[..]),
        ("file", Some("slide.jpeg"), &png[..]),
    ]);
    let (status, body) = app
        .request_raw("POST", "/api/upload/file", Some(&token), &multipart_content_type(), body)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["width"], 30);
    assert_eq!(body["data"]["height"], 12);
    assert!(body["data"]["assetId"].as_str().unwrap().starts_with("decks/files/"));
    assert!(body["data"]["url"].as_str().unwrap().ends_with(".png"));
    assert_eq!(app.stored_file_count(), 2);
}

#[tokio::test]
async fn file_upload_requires_a_file_and_a_token() {
    let app = spawn_app().await;
    let token = app.register("Up", "up@example.com").await;

    let body = multipart_body(&[("folder", None, &b"decks"[..])]);
    let (status, body) = app
        .request_raw("POST", "/api/upload/file", Some(&token), &multipart_content_type(), body)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .request_raw("POST", "/api/upload/file", Some(&token), "text/plain", b"nope".to_vec())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let body = multipart_body(&[("file", Some("a.png"), &png_bytes(4, 4)[..])]);
    let (status, _) = app
        .request_raw("POST", "/api/upload/file", None, &multipart_content_type(), body)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.stored_file_count(), 0);
}
