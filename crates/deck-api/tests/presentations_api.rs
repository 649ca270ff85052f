mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{slide, spawn_app, BASE_URL};

#[tokio::test]
async fn owner_endpoints_require_a_token() {
    let app = spawn_app().await;
    let (status, body) = app.request("GET", "/api/presentations/my", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app
        .request("GET", "/api/presentations/my", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_sorts_slides_and_view_counts() {
    let app = spawn_app().await;
    let token = app.register("Alice", "alice@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/presentations",
            Some(&token),
            Some(json!({
                "title": "Pitch",
                "slides": [slide(3, "C"), slide(1, "A"), slide(2, "B")],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let share_id = body["data"]["shareId"].as_str().unwrap().to_string();
    assert_eq!(share_id.len(), 10);
    assert_eq!(body["data"]["shareUrl"], format!("/p/{share_id}"));
    assert_eq!(body["data"]["slideCount"], 3);

    let (status, body) = app
        .request("GET", &format!("/api/presentations/access/{share_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "requiresPassword": false, "title": "Pitch" }));

    let (status, body) = app
        .request("POST", &format!("/api/presentations/view/{share_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let data = &body["data"];
    let titles: Vec<_> = data["slides"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
    assert_eq!(data["viewCount"], 1);
    assert_eq!(data["ownerDisplayName"], "Alice");
    assert!(data.get("ownerId").is_none());
    assert!(data["slides"][0].get("assetId").is_none());
    assert!(data["slides"][0]["imageUrl"]
        .as_str()
        .unwrap()
        .starts_with(&format!("{BASE_URL}/uploads/presentations/")));

    let (_, body) = app
        .request("POST", &format!("/api/presentations/view/{share_id}"), None, None)
        .await;
    assert_eq!(body["data"]["viewCount"], 2);
}

#[tokio::test]
async fn password_protected_viewing() {
    let app = spawn_app().await;
    let token = app.register("Alice", "alice@example.com").await;
    let (_, body) = app
        .request(
            "POST",
            "/api/presentations",
            Some(&token),
            Some(json!({
                "title": "Secret",
                "password": "hunter2",
                "slides": [slide(1, "Only")],
            })),
        )
        .await;
    let share_id = body["data"]["shareId"].as_str().unwrap().to_string();
    let view = format!("/api/presentations/view/{share_id}");

    let (_, body) = app
        .request("GET", &format!("/api/presentations/access/{share_id}"), None, None)
        .await;
    assert_eq!(body["data"]["requiresPassword"], true);

    let (status, body) = app.request("POST", &view, None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "presentation requires a password");

    let (status, body) = app
        .request("POST", &view, None, Some(json!({ "password": "wrong" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "incorrect password");

    let (status, body) = app
        .request("POST", &view, None, Some(json!({ "password": "hunter2" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["viewCount"], 1);
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn expired_presentation_reports_expiry_before_password() {
    let app = spawn_app().await;
    let token = app.register("Alice", "alice@example.com").await;
    let (status, body) = app
        .request(
            "POST",
            "/api/presentations",
            Some(&token),
            Some(json!({
                "title": "Old",
                "password": "hunter2",
                "expiresAt": "2001-01-01T00:00:00Z",
                "slides": [slide(1, "Only")],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let share_id = body["data"]["shareId"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/presentations/view/{share_id}"),
            None,
            Some(json!({ "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "presentation has expired");
}

#[tokio::test]
async fn unknown_share_id_is_not_found() {
    let app = spawn_app().await;
    let (status, body) = app
        .request("GET", "/api/presentations/access/nope123456", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn other_users_cannot_mutate() {
    let app = spawn_app().await;
    let alice = app.register("Alice", "alice@example.com").await;
    let mallory = app.register("Mallory", "mallory@example.com").await;

    let (_, body) = app
        .request(
            "POST",
            "/api/presentations",
            Some(&alice),
            Some(json!({ "title": "Mine", "slides": [slide(1, "One")] })),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    for (method, uri, payload) in [
        ("GET", format!("/api/presentations/{id}"), None),
        ("PUT", format!("/api/presentations/{id}"), Some(json!({ "title": "Stolen" }))),
        ("POST", format!("/api/presentations/{id}/regenerate-link"), None),
        ("DELETE", format!("/api/presentations/{id}"), None),
    ] {
        let (status, body) = app.request(method, &uri, Some(&mallory), payload).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
        assert_eq!(body["error"], "you do not own this presentation");
    }

    let (_, body) = app
        .request("GET", &format!("/api/presentations/{id}"), Some(&alice), None)
        .await;
    assert_eq!(body["data"]["title"], "Mine");
}

#[tokio::test]
async fn append_update_regenerate_and_delete() {
    let app = spawn_app().await;
    let token = app.register("Alice", "alice@example.com").await;
    let (_, body) = app
        .request(
            "POST",
            "/api/presentations",
            Some(&token),
            Some(json!({ "title": "Deck", "slides": [slide(1, "first"), slide(5, "last")] })),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let old_share = body["data"]["shareId"].as_str().unwrap().to_string();
    assert_eq!(app.stored_file_count(), 4);

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/presentations/{id}/slides"),
            Some(&token),
            Some(json!({ "slides": [slide(3, "middle")] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["slideCount"], 3);

    let (_, body) = app
        .request("GET", &format!("/api/presentations/{id}"), Some(&token), None)
        .await;
    let orders: Vec<_> = body["data"]["slides"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["order"].as_i64().unwrap())
        .collect();
    assert_eq!(orders, vec![1, 3, 5]);

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/presentations/{id}"),
            Some(&token),
            Some(json!({ "title": "Renamed", "settings": { "autoPlay": true } })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Renamed");

    let (_, body) = app
        .request("GET", &format!("/api/presentations/{id}"), Some(&token), None)
        .await;
    assert_eq!(body["data"]["settings"]["autoPlay"], true);
    assert_eq!(body["data"]["settings"]["showWatermark"], true);

    let (status, body) = app
        .request(
            "POST",
            &format!("/api/presentations/{id}/regenerate-link"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let new_share = body["data"]["shareId"].as_str().unwrap().to_string();
    assert_ne!(new_share, old_share);
    let (status, _) = app
        .request("GET", &format!("/api/presentations/access/{old_share}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.request("GET", "/api/presentations/my", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["slideCount"], 3);

    let (status, _) = app
        .request("DELETE", &format!("/api/presentations/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.stored_file_count(), 0);

    let (status, _) = app
        .request("GET", &format!("/api/presentations/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_input_is_rejected_without_storing_files() {
    let app = spawn_app().await;
    let token = app.register("Alice", "alice@example.com").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/presentations",
            Some(&token),
            Some(json!({ "title": "Empty", "slides": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .request(
            "POST",
            "/api/presentations",
            Some(&token),
            Some(json!({
                "title": "Broken",
                "slides": [slide(1, "ok"), { "order": 2, "title": "bad", "imageData": "data:image/png;base64,@@@" }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.stored_file_count(), 0);
}

#[tokio::test]
async fn malformed_requests_get_the_error_envelope() {
    let app = spawn_app().await;
    let token = app.register("Ann", "ann@example.com").await;

    let (status, body) = app
        .request("GET", "/api/presentations/not-a-uuid", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .request_raw(
            "POST",
            "/api/presentations",
            Some(&token),
            "application/json",
            b"{\"title\": ".to_vec(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .request(
            "PUT",
            "/api/presentations/0190a8f2-3c4d-7e5f-8a9b-0c1d2e3f4a5b",
            Some(&token),
            Some(json!({ "title": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().starts_with("invalid request body"));
}
