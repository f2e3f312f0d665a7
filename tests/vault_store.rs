//! Integration tests for the Vault KV v2 secret store, against a mock server.

#![cfg(feature = "vault")]

mod common;

use std::sync::Arc;

use common::{base_request, NAMESPACE};
use ecosystem_config::errors::ErrorKind;
use ecosystem_config::secrets::{SecretStore, SecretsError, VaultSecretStore, VaultStoreConfig};
use ecosystem_config::ConfigurationResolver;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn kv2_response(data: serde_json::Value) -> serde_json::Value {
    json!({
        "request_id": "a1b2c3d4-0000-0000-0000-000000000000",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": {
            "data": data,
            "metadata": {
                "created_time": "2024-01-01T00:00:00.000000Z",
                "custom_metadata": null,
                "deletion_time": "",
                "destroyed": false,
                "version": 1
            }
        },
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

fn store_for(server: &MockServer) -> VaultSecretStore {
    VaultSecretStore::new(VaultStoreConfig {
        address: server.uri(),
        token: Some("test-token".into()),
        namespace: None,
        mount_path: "secret".to_string(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_reads_secret_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/quay-enterprise/redis-creds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kv2_response(json!({
            "password": "redis-pass",
            "port": 6379
        }))))
        .mount(&server)
        .await;

    let store = store_for(&server);
    let payload = store.get(NAMESPACE, "redis-creds").await.unwrap();
    assert_eq!(payload.get("password"), Some(&b"redis-pass"[..]));
    assert_eq!(payload.get("port"), Some(&b"6379"[..]));
    assert_eq!(store.store_type(), "vault");
}

#[tokio::test]
async fn test_404_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/quay-enterprise/absent"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errors": [] })))
        .mount(&server)
        .await;

    let err = store_for(&server).get(NAMESPACE, "absent").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_403_is_authentication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/quay-enterprise/locked"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "errors": ["permission denied"] })),
        )
        .mount(&server)
        .await;

    let err = store_for(&server).get(NAMESPACE, "locked").await.unwrap_err();
    assert!(matches!(err, SecretsError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn test_resolver_separates_store_failure_from_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/quay-enterprise/quay-config"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "errors": ["internal error"] })),
        )
        .mount(&server)
        .await;

    let resolver = ConfigurationResolver::new(Arc::new(store_for(&server)));
    let mut request = base_request();
    request.registry.config_secret_name = Some("quay-config".to_string());

    let err = resolver.resolve(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SecretStore);
    assert_eq!(err.entity(), Some("quay-config"));
}
