//! Image API integration tests.
//!
//! Run with: `cargo test -p lumina-api --test images_test`
//! The app is wired to in-memory store doubles; no external services needed.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use helpers::{
    body_bytes, body_json, fixtures, send, send_upload, setup_test_app, upload_test_image, Part,
    TEST_USER,
};
use lumina_storage::ObjectStore;

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-user-id", TEST_USER)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_upload_image_returns_urls_not_keys() {
    let app = setup_test_app();

    let body = upload_test_image(&app, &["g1"]).await;

    let original_url = body["original_url"].as_str().unwrap();
    assert!(original_url.starts_with("https://cdn.test/media/"));
    assert!(body["thumbnail_url"].as_str().unwrap().starts_with("https://cdn.test/media/"));
    assert_eq!(body["group_ids"], serde_json::json!(["g1"]));
    assert_eq!(body["version"], serde_json::json!(1));

    // Raw keys never leave the server.
    assert!(body.get("original_key").is_none());
    assert!(body.get("thumbnail_key").is_none());
}

#[tokio::test]
async fn test_upload_png_derives_jpeg_thumbnail() {
    let app = setup_test_app();

    let response = send_upload(
        &app,
        Some(TEST_USER),
        &[
            Part::File {
                name: "file",
                filename: "shot.png",
                content_type: "image/png",
                data: fixtures::png_bytes(512, 256),
            },
            Part::Text("group_ids", "g1"),
            Part::Text("tags", "t1"),
            Part::Text("title", "Screenshot"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Screenshot");
    assert_eq!(body["tag_ids"], serde_json::json!(["t1"]));

    let thumbnail_key = body["thumbnail_url"]
        .as_str()
        .unwrap()
        .strip_prefix("https://cdn.test/")
        .unwrap()
        .to_string();
    let stored = app
        .objects
        .object(&lumina_storage::MediaKey::parse(&thumbnail_key).unwrap())
        .unwrap();
    assert_eq!(stored.content_type, "image/jpeg");
}

#[tokio::test]
async fn test_upload_requires_user_identity() {
    let app = setup_test_app();

    let response = send_upload(
        &app,
        None,
        &[Part::File {
            name: "file",
            filename: "photo.jpg",
            content_type: "image/jpeg",
            data: fixtures::jpeg_bytes(64, 64),
        }],
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_without_groups_is_rejected_before_any_storage_call() {
    let app = setup_test_app();

    let response = send_upload(
        &app,
        Some(TEST_USER),
        &[Part::File {
            name: "file",
            filename: "photo.jpg",
            content_type: "image/jpeg",
            data: fixtures::jpeg_bytes(64, 64),
        }],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "GROUPS_REQUIRED");
    assert_eq!(app.objects.call_count(), 0);
}

#[tokio::test]
async fn test_upload_oversized_png_is_rejected() {
    let app = setup_test_app();

    let response = send_upload(
        &app,
        Some(TEST_USER),
        &[
            Part::File {
                name: "file",
                filename: "big.png",
                content_type: "image/png",
                data: vec![0u8; 11 * 1024 * 1024],
            },
            Part::Text("group_ids", "g1"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "TOO_LARGE");
}

#[tokio::test]
async fn test_upload_disallowed_content_type_is_rejected() {
    let app = setup_test_app();

    let response = send_upload(
        &app,
        Some(TEST_USER),
        &[
            Part::File {
                name: "file",
                filename: "doc.pdf",
                content_type: "application/pdf",
                data: b"%PDF-1.4".to_vec(),
            },
            Part::Text("group_ids", "g1"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_TYPE");
}

#[tokio::test]
async fn test_upload_with_unknown_field_is_rejected() {
    let app = setup_test_app();

    let response = send_upload(
        &app,
        Some(TEST_USER),
        &[
            Part::Text("surprise", "value"),
            Part::Text("group_ids", "g1"),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = setup_test_app();

    let response = send_upload(&app, Some(TEST_USER), &[Part::Text("group_ids", "g1")]).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_get_image_roundtrip() {
    let app = setup_test_app();
    let uploaded = upload_test_image(&app, &["g1"]).await;
    let id = uploaded["id"].as_str().unwrap();

    let response = send(&app, get_request(&format!("/api/v0/images/{}", id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["id"], uploaded["id"]);
    assert_eq!(body["filename"], "photo.jpg");
}

#[tokio::test]
async fn test_get_missing_image_is_404() {
    let app = setup_test_app();

    let response = send(
        &app,
        get_request(&format!("/api/v0/images/{}", uuid::Uuid::new_v4())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_update_image_title_and_groups() {
    let app = setup_test_app();
    let uploaded = upload_test_image(&app, &["g1"]).await;
    let id = uploaded["id"].as_str().unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/v0/images/{}", id))
        .header("x-user-id", TEST_USER)
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({
                "title": "Renamed",
                "group_ids": ["g1", "g2"],
                "version": 1
            })
            .to_string(),
        ))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Renamed");
    assert_eq!(body["group_ids"], serde_json::json!(["g1", "g2"]));
    assert_eq!(body["version"], serde_json::json!(2));
    // Keys are preserved across updates: URLs are unchanged.
    assert_eq!(body["original_url"], uploaded["original_url"]);
}

#[tokio::test]
async fn test_update_with_stale_version_conflicts() {
    let app = setup_test_app();
    let uploaded = upload_test_image(&app, &["g1"]).await;
    let id = uploaded["id"].as_str().unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/v0/images/{}", id))
        .header("x-user-id", TEST_USER)
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "title": "Late edit", "version": 7 }).to_string(),
        ))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_update_cannot_empty_the_group_set() {
    let app = setup_test_app();
    let uploaded = upload_test_image(&app, &["g1"]).await;
    let id = uploaded["id"].as_str().unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/v0/images/{}", id))
        .header("x-user-id", TEST_USER)
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "group_ids": [], "version": 1 }).to_string(),
        ))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "GROUPS_REQUIRED");
}

#[tokio::test]
async fn test_update_with_malformed_body_is_rejected() {
    let app = setup_test_app();
    let uploaded = upload_test_image(&app, &["g1"]).await;
    let id = uploaded["id"].as_str().unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/v0/images/{}", id))
        .header("x-user-id", TEST_USER)
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_delete_image() {
    let app = setup_test_app();
    let uploaded = upload_test_image(&app, &["g1"]).await;
    let id = uploaded["id"].as_str().unwrap().to_string();

    let delete_request = |id: &str| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/v0/images/{}", id))
            .header("x-user-id", TEST_USER)
            .body(Body::empty())
            .unwrap()
    };

    let response = send(&app, delete_request(&id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.objects.is_empty());
    assert!(app.records.is_empty());

    // Deleting again is a 404, not an error.
    let response = send(&app, delete_request(&id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_image_sets_attachment_disposition() {
    let app = setup_test_app();
    let uploaded = upload_test_image(&app, &["g1"]).await;
    let id = uploaded["id"].as_str().unwrap();

    let response = send(
        &app,
        get_request(&format!("/api/v0/images/{}/download", id)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok()),
        Some("attachment; filename=\"photo.jpg\"")
    );
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("image/jpeg")
    );
    let data = body_bytes(response).await;
    assert_eq!(data, fixtures::jpeg_bytes(640, 480));
}

#[tokio::test]
async fn test_download_missing_image_is_404() {
    let app = setup_test_app();

    let response = send(
        &app,
        get_request(&format!(
            "/api/v0/images/{}/download",
            uuid::Uuid::new_v4()
        )),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_images_by_group() {
    let app = setup_test_app();
    upload_test_image(&app, &["g1"]).await;
    upload_test_image(&app, &["g2"]).await;

    let response = send(&app, get_request("/api/v0/images?group_id=g1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let images = body.as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["group_ids"], serde_json::json!(["g1"]));
}

#[tokio::test]
async fn test_list_images_for_user_paginates() {
    let app = setup_test_app();
    for _ in 0..3 {
        upload_test_image(&app, &["g1"]).await;
    }

    let response = send(&app, get_request("/api/v0/images?limit=2&offset=0")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let response = send(&app, get_request("/api/v0/images?limit=2&offset=2")).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_signed_url_issuance() {
    let app = setup_test_app();
    let uploaded = upload_test_image(&app, &["g1"]).await;
    let id = uploaded["id"].as_str().unwrap();

    let response = send(
        &app,
        get_request(&format!("/api/v0/images/{}/signed-url?ttl_secs=600", id)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["url"].as_str().unwrap().contains("sig="));
    assert_eq!(body["expires_in_secs"], serde_json::json!(600));
}

#[tokio::test]
async fn test_download_with_missing_artifact_is_404() {
    let app = setup_test_app();
    let uploaded = upload_test_image(&app, &["g1"]).await;
    let id = uploaded["id"].as_str().unwrap();

    // Strip the artifact out from under the record (an orphaned record).
    let key = uploaded["original_url"]
        .as_str()
        .unwrap()
        .strip_prefix("https://cdn.test/")
        .unwrap()
        .to_string();
    app.objects
        .delete(&lumina_storage::MediaKey::parse(&key).unwrap())
        .await
        .unwrap();

    let response = send(
        &app,
        get_request(&format!("/api/v0/images/{}/download", id)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_record_with_empty_group_set_is_an_invariant_violation() {
    let app = setup_test_app();
    let id = uuid::Uuid::new_v4();
    app.records.seed(lumina_core::models::ImageRecord {
        id,
        user_id: TEST_USER.to_string(),
        title: None,
        filename: "photo.jpg".to_string(),
        tag_ids: vec![],
        group_ids: vec![],
        original_key: "media/orphan/photo.jpg".to_string(),
        thumbnail_key: None,
        version: 1,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    });

    let response = send(&app, get_request(&format!("/api/v0/images/{}", id))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["code"], "INVARIANT_VIOLATION");
    // The corrupt row is surfaced, never silently repaired or echoed.
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}
