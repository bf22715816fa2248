//! HTTP trigger surface tests, driven in-process through the router.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use tonic::Code;
use tower::ServiceExt;

use common::{write_crypto_material, MockConnector, MockGateway};
use ledger_gateway::assets::AssetService;
use ledger_gateway::gateway::TxValidationCode;
use ledger_gateway::http::router;

fn app(gateway: MockGateway) -> (tempfile::TempDir, axum::Router, MockConnector) {
    let dir = tempfile::tempdir().unwrap();
    let config = write_crypto_material(dir.path());
    let connector = MockConnector::new(gateway);
    let http = config.http.clone();
    let service = AssetService::with_connector(Arc::new(config), connector.clone());
    (dir, router(Arc::new(service), &http), connector)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn init_returns_no_content() {
    let (_dir, app, connector) = app(MockGateway::default());

    let response = app
        .oneshot(Request::get("/test/init").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(connector.gateway.commit_status_calls(), 1);
}

#[tokio::test]
async fn get_returns_pretty_json() {
    let (_dir, app, _connector) = app(MockGateway::default());

    let response = app
        .oneshot(Request::get("/test/get").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("\n  {"));
    let records: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(records[0]["ID"], "asset1");
    assert_eq!(records[1]["Owner"], "Brad");
}

#[tokio::test]
async fn non_json_result_is_bad_gateway() {
    let (_dir, app, _connector) = app(MockGateway {
        evaluate_payload: b"asset1 asset2".to_vec(),
        ..MockGateway::default()
    });

    let response = app
        .oneshot(Request::get("/test/get").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"], "decode");
}

#[tokio::test]
async fn create_returns_created_asset() {
    let (_dir, app, connector) = app(MockGateway::default());
    let body = r#"{"ID":"asset20","Color":"green","Size":3,"Owner":"Max","AppraisedValue":90}"#;

    let response = app
        .oneshot(
            Request::post("/test/assets")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["ID"], "asset20");
    assert_eq!(connector.gateway.submit_calls(), 1);
}

#[tokio::test]
async fn submit_rejection_is_bad_gateway() {
    let (_dir, app, connector) = app(MockGateway {
        submit_failure: Some((Code::AlreadyExists, "duplicate transaction ID".to_string())),
        ..MockGateway::default()
    });

    let response = app
        .oneshot(Request::get("/test/init").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["error"], "submit");
    assert!(json["message"].as_str().unwrap().contains("duplicate"));
    assert_eq!(connector.stats.closed(), 1);
}

#[tokio::test]
async fn invalid_commit_is_conflict() {
    let (_dir, app, _connector) = app(MockGateway {
        commit_code: TxValidationCode::MvccReadConflict,
        ..MockGateway::default()
    });

    let response = app
        .oneshot(Request::get("/test/init").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "commit");
}

#[tokio::test]
async fn missing_credentials_are_server_error() {
    let (dir, app, connector) = app(MockGateway::default());
    std::fs::remove_dir_all(dir.path().join("users")).unwrap();

    let response = app
        .oneshot(Request::get("/test/get").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "credential");
    assert_eq!(connector.stats.opened(), 0);
}
