mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::spawn_app;

fn client(name: &str, party: &str) -> serde_json::Value {
    json!({
        "name": name,
        "position": "Mayor",
        "electionDate": "2027-06-01",
        "campaignStart": "2027-01-01",
        "politicalParty": party,
        "socialMedia": { "twitter": "@someone" },
    })
}

#[tokio::test]
async fn client_crud_and_listing() {
    let app = spawn_app().await;
    let token = app.register("Staff", "staff@example.com").await;

    let (status, _) = app.request("GET", "/api/clients", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut ids = Vec::new();
    for (name, party) in [("Carla", "Blue"), ("Anna", "Green"), ("Bea", "Green")] {
        let (status, body) = app
            .request("POST", "/api/clients", Some(&token), Some(client(name, party)))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["data"]["isActive"], true);
        ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let (status, body) = app
        .request("GET", "/api/clients?sortBy=name&sortOrder=asc&limit=2", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["name"], "Anna");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNext"], true);

    let (_, body) = app
        .request("GET", "/api/clients/search?q=green", Some(&token), None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = app.request("GET", "/api/clients/search", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/clients/{}", ids[0]),
            Some(&token),
            Some(json!({ "isActive": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);
    assert_eq!(body["data"]["name"], "Carla");

    let (_, body) = app.request("GET", "/api/clients/stats", Some(&token), None).await;
    assert_eq!(body["data"], json!({ "total": 3, "active": 2, "inactive": 1, "thisMonth": 3 }));

    let (status, _) = app
        .request("DELETE", &format!("/api/clients/{}", ids[1]), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .request("GET", &format!("/api/clients/{}", ids[1]), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn bad_query_and_path_are_validation_errors() {
    let app = spawn_app().await;
    let token = app.register("Cam", "cam@example.com").await;

    let (status, body) = app
        .request("GET", "/api/clients?page=first", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .request("DELETE", "/api/clients/42", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
