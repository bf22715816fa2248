//! End-to-end asset service flows: credentials, connection scope, protocol.

mod common;

use std::fs;
use std::sync::Arc;

use tonic::Code;

use common::{write_crypto_material, MockConnector, MockGateway};
use ledger_gateway::assets::{parse_assets, Asset, AssetService};
use ledger_gateway::GatewayError;

fn service(
    gateway: MockGateway,
) -> (tempfile::TempDir, AssetService<MockConnector>, MockConnector) {
    let dir = tempfile::tempdir().unwrap();
    let config = write_crypto_material(dir.path());
    let connector = MockConnector::new(gateway);
    let service = AssetService::with_connector(Arc::new(config), connector.clone());
    (dir, service, connector)
}

#[tokio::test]
async fn init_ledger_commits_and_closes() {
    let (_dir, service, connector) = service(MockGateway::default());

    service.init_ledger().await.unwrap();

    let rpc = &connector.gateway;
    assert_eq!(rpc.endorse_calls(), 1);
    assert_eq!(rpc.submit_calls(), 1);
    assert_eq!(rpc.commit_status_calls(), 1);
    assert_eq!(connector.stats.opened(), 1);
    assert_eq!(connector.stats.closed(), 1);
}

#[tokio::test]
async fn get_all_assets_returns_ledger_records_in_order() {
    let (_dir, service, connector) = service(MockGateway::default());

    let payload = service.get_all_assets().await.unwrap();
    let assets = parse_assets(&payload).unwrap();

    let ids: Vec<_> = assets.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["asset1", "asset2"]);
    assert_eq!(connector.gateway.endorse_calls(), 0);
    assert_eq!(connector.stats.closed(), 1);
}

#[tokio::test]
async fn missing_key_fails_before_connecting() {
    let (dir, service, connector) = service(MockGateway::default());
    let key_dir = service.config().identity.key_dir_path();
    fs::remove_file(key_dir.join("priv_sk")).unwrap();

    let err = service.init_ledger().await.unwrap_err();

    assert!(matches!(err, GatewayError::Credential(_)), "got {err:?}");
    assert_eq!(connector.stats.opened(), 0);
    drop(dir);
}

#[tokio::test]
async fn missing_tls_root_fails_before_connecting() {
    let (_dir, service, connector) = service(MockGateway::default());
    fs::remove_file(service.config().identity.tls_cert_path()).unwrap();

    let err = service.get_all_assets().await.unwrap_err();

    assert_eq!(err.kind(), "credential");
    assert_eq!(connector.stats.opened(), 0);
}

#[tokio::test]
async fn rejected_submission_still_closes_connection() {
    let (_dir, service, connector) = service(MockGateway {
        submit_failure: Some((Code::AlreadyExists, "duplicate transaction ID".to_string())),
        ..MockGateway::default()
    });

    let err = service.init_ledger().await.unwrap_err();

    assert!(matches!(err, GatewayError::Submit { .. }), "got {err:?}");
    assert_eq!(connector.stats.opened(), 1);
    assert_eq!(connector.stats.closed(), 1);
    assert_eq!(connector.gateway.commit_status_calls(), 0);
}

#[tokio::test]
async fn create_asset_passes_record_fields() {
    let (_dir, service, connector) = service(MockGateway::default());
    let asset = Asset {
        id: "asset13".into(),
        color: "yellow".into(),
        size: 5,
        owner: "Tom".into(),
        appraised_value: 1300,
    };

    service.create_asset(&asset).await.unwrap();

    assert_eq!(connector.gateway.commit_status_calls(), 1);
    assert_eq!(connector.stats.closed(), 1);
}

#[tokio::test]
async fn every_call_opens_its_own_connection() {
    let (_dir, service, connector) = service(MockGateway::default());

    let (a, b) = tokio::join!(service.get_all_assets(), service.get_all_assets());
    a.unwrap();
    b.unwrap();
    service.init_ledger().await.unwrap();

    assert_eq!(connector.stats.opened(), 3);
    assert_eq!(connector.stats.closed(), 3);
}
