//! Router-level tests
//!
//! Everything here must be answerable without a cluster: validation failures
//! short-circuit before packgate builds a cluster client or touches the pack
//! artifact.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use packgate_server::{AppState, ServerConfig, StorageKind, router};
use tower::ServiceExt;

fn test_state() -> AppState {
    AppState::new(ServerConfig {
        port: 0,
        pack_path: "/nonexistent/challenge.tgz".into(),
        driver: StorageKind::Secrets,
    })
}

fn post_challenge(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn message_of(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    json["message"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_health() {
    let response = router(test_state())
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_deploy_without_name_is_rejected() {
    let body = r#"{"global":{"baseDomain":"x.test","tlsCert":"cert"},"containers":[{"image":"nginx"}]}"#;
    let response = router(test_state())
        .oneshot(post_challenge("/api/challenge", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(message_of(response).await.contains("name"));
}

#[tokio::test]
async fn test_deploy_with_malformed_body_is_rejected() {
    let response = router(test_state())
        .oneshot(post_challenge("/api/challenge?name=demo", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(message_of(response).await.contains("invalid request body"));
}

#[tokio::test]
async fn test_deploy_with_empty_containers_is_rejected() {
    let body = r#"{"global":{"baseDomain":"x.test","tlsCert":"cert"},"containers":[]}"#;
    let response = router(test_state())
        .oneshot(post_challenge("/api/challenge?name=demo", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(message_of(response).await.contains("containers"));
}

#[tokio::test]
async fn test_deploy_with_retired_schema_is_rejected() {
    let body = r#"{"globals":{"base_domain":"x.test","tls_cert":"cert"},"containers":[{"image":"nginx"}]}"#;
    let response = router(test_state())
        .oneshot(post_challenge("/api/challenge?name=demo", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_destroy_without_name_is_rejected() {
    let response = router(test_state())
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/challenge")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
