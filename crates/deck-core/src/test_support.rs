use chrono::Utc;
use uuid::Uuid;

use crate::models::{Identity, Presentation, PresentationSettings, Slide, StoredImage};

pub fn owner() -> Identity {
    Identity {
        user_id: Uuid::from_u128(0xA11CE),
        display_name: "Alice".into(),
        email: "alice@example.com".into(),
        role: "user".into(),
    }
}

pub fn slide(order: i32) -> Slide {
    let mut metadata = serde_json::Map::new();
    metadata.insert("source".into(), serde_json::json!("scanner"));
    Slide {
        order,
        title: format!("Slide {order}"),
        image_url: format!("http://localhost/uploads/s{order}.png"),
        thumbnail_url: format!("http://localhost/uploads/thumbnails/s{order}_thumb.png"),
        asset_id: format!("presentations/owner/asset-{order}"),
        metadata: Some(metadata),
    }
}

pub fn presentation() -> Presentation {
    let now = Utc::now();
    Presentation {
        id: Uuid::now_v7(),
        share_id: "share12345".into(),
        title: "Quarterly review".into(),
        description: Some("Numbers".into()),
        slides: vec![slide(1), slide(2)],
        owner_id: owner().user_id,
        owner_display_name: "Alice".into(),
        is_public: true,
        password_hash: None,
        expires_at: None,
        view_count: 0,
        last_viewed_at: None,
        client_id: None,
        client_name: Some("ACME".into()),
        settings: PresentationSettings::default(),
        created_at: now,
        updated_at: now,
    }
}

/// Fake upload result whose ids derive from the payload, so tests can map
/// uploads back to inputs.
pub fn stored(payload: &str) -> StoredImage {
    StoredImage {
        url: format!("http://localhost/uploads/{payload}.png"),
        thumbnail_url: format!("http://localhost/uploads/thumbnails/{payload}_thumb.png"),
        asset_id: format!("ns/{payload}"),
        width: 640,
        height: 480,
    }
}
