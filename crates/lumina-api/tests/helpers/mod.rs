//! Test app setup over in-memory store doubles.

pub mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use lumina_api::setup::routes::build_router;
use lumina_api::state::AppState;
use lumina_core::{Config, StorageBackendKind};
use lumina_db::RecordStore;
use lumina_services::test_helpers::{MockObjectStore, MockRecordStore};
use lumina_storage::ObjectStore;
use tower::ServiceExt;

pub const TEST_USER: &str = "user-1";
pub const BOUNDARY: &str = "lumina-test-boundary";

fn test_config() -> Config {
    Config {
        server_port: 0,
        database_url: "postgres://unused".to_string(),
        environment: "test".to_string(),
        storage_backend: StorageBackendKind::Local,
        s3: None,
        local_storage_path: None,
        local_storage_base_url: None,
        storage_timeout: Duration::from_secs(30),
        media_namespace: "media".to_string(),
        max_upload_bytes: 10 * 1024 * 1024,
        signed_url_ttl: Duration::from_secs(3600),
    }
}

pub struct TestApp {
    pub router: Router,
    pub objects: Arc<MockObjectStore>,
    pub records: Arc<MockRecordStore>,
}

pub fn setup_test_app() -> TestApp {
    let objects = Arc::new(MockObjectStore::new());
    let records = Arc::new(MockRecordStore::new());
    let state = Arc::new(AppState::new(
        test_config(),
        objects.clone() as Arc<dyn ObjectStore>,
        records.clone() as Arc<dyn RecordStore>,
    ));
    TestApp {
        router: build_router(state),
        objects,
        records,
    }
}

/// One part of a multipart form body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: Vec<u8>,
    },
}

/// Render a multipart/form-data body with the test boundary.
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        name, value
                    )
                    .as_bytes(),
                );
            }
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router
        .clone()
        .oneshot(request)
        .await
        .expect("request failed")
}

pub async fn send_upload(app: &TestApp, user: Option<&str>, parts: &[Part<'_>]) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v0/images")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let request = builder
        .body(Body::from(multipart_body(parts)))
        .expect("request build failed");
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed");
    serde_json::from_slice(&bytes).expect("body was not JSON")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read failed")
        .to_vec()
}

/// Upload a valid JPEG and return its parsed response body.
pub async fn upload_test_image(app: &TestApp, groups: &[&str]) -> serde_json::Value {
    let mut parts = vec![Part::File {
        name: "file",
        filename: "photo.jpg",
        content_type: "image/jpeg",
        data: fixtures::jpeg_bytes(640, 480),
    }];
    let group_values: Vec<String> = groups.iter().map(|g| g.to_string()).collect();
    for group in &group_values {
        parts.push(Part::Text("group_ids", group));
    }

    let response = send_upload(app, Some(TEST_USER), &parts).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}
