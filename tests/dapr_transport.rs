//! Integration tests for the Dapr sidecar transport
//!
//! A wiremock server stands in for the sidecar's HTTP API.

use std::sync::Arc;
use std::time::Duration;

use secrets_router::secrets::{
    AttemptStatus, BackendChain, BackendId, BackendOutcome, BackendSpec, BackendTransport,
    DaprTransport, DecodeRule, SecretRequest, SecretResolver,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chain() -> BackendChain {
    BackendChain::new(vec![
        BackendSpec::new("aws-secrets-manager", DecodeRule::Plain, false),
        BackendSpec::new("kubernetes", DecodeRule::Base64, true),
    ])
    .unwrap()
}

fn transport(server: &MockServer) -> DaprTransport {
    DaprTransport::new(&server.uri(), chain(), Duration::from_secs(5), Duration::from_millis(500))
        .unwrap()
}

fn request() -> SecretRequest {
    SecretRequest::new("production", "db-creds", "password")
}

async fn fetch(server: &MockServer, backend: &str) -> BackendOutcome {
    transport(server).fetch(&BackendId::new(backend), &request()).await
}

#[tokio::test]
async fn test_found_key_in_unscoped_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/secrets/aws-secrets-manager/db-creds"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"password": "hunter2", "username": "app"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(
        fetch(&server, "aws-secrets-manager").await,
        BackendOutcome::Found("hunter2".into())
    );
}

#[tokio::test]
async fn test_namespaced_store_sends_namespace() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/secrets/kubernetes/db-creds"))
        .and(query_param("metadata.namespace", "production"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"password": "cGFzc3dvcmQxMjM="})),
        )
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(
        fetch(&server, "kubernetes").await,
        BackendOutcome::Found("cGFzc3dvcmQxMjM=".into())
    );
}

#[tokio::test]
async fn test_missing_key_and_missing_secret_are_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/secrets/aws-secrets-manager/db-creds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"username": "app"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/secrets/kubernetes/db-creds"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert_eq!(fetch(&server, "aws-secrets-manager").await, BackendOutcome::NotFound);
    assert_eq!(fetch(&server, "kubernetes").await, BackendOutcome::NotFound);
}

#[tokio::test]
async fn test_sidecar_missing_secret_error_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/secrets/kubernetes/db-creds"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "errorCode": "ERR_SECRET_GET",
            "message": "failed getting secret with key db-creds from secret store kubernetes: \
                        secrets \"db-creds\" not found"
        })))
        .mount(&server)
        .await;

    assert_eq!(fetch(&server, "kubernetes").await, BackendOutcome::NotFound);
}

#[tokio::test]
async fn test_server_errors_are_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/secrets/aws-secrets-manager/db-creds"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "errorCode": "ERR_SECRET_STORE_NOT_FOUND",
            "message": "secret store aws-secrets-manager not found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/secrets/kubernetes/db-creds"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    assert_eq!(fetch(&server, "aws-secrets-manager").await.status(), AttemptStatus::Unreachable);
    assert_eq!(fetch(&server, "kubernetes").await.status(), AttemptStatus::Unreachable);
}

#[tokio::test]
async fn test_other_responses_are_unexpected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/secrets/aws-secrets-manager/db-creds"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/secrets/kubernetes/db-creds"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    assert_eq!(fetch(&server, "aws-secrets-manager").await.status(), AttemptStatus::Unexpected);
    assert_eq!(fetch(&server, "kubernetes").await.status(), AttemptStatus::Unexpected);
}

#[tokio::test]
async fn test_timeout_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"password": "late"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let transport = DaprTransport::new(
        &server.uri(),
        chain(),
        Duration::from_millis(200),
        Duration::from_millis(200),
    )
    .unwrap();
    let outcome = transport.fetch(&BackendId::new("aws-secrets-manager"), &request()).await;
    assert_eq!(outcome.status(), AttemptStatus::Unreachable);
}

#[tokio::test]
async fn test_connection_refused_is_unreachable() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let transport =
        DaprTransport::new(&uri, chain(), Duration::from_secs(1), Duration::from_secs(1)).unwrap();
    let outcome = transport.fetch(&BackendId::new("kubernetes"), &request()).await;
    assert_eq!(outcome.status(), AttemptStatus::Unreachable);
    assert!(transport.probe().await.is_err());
}

#[tokio::test]
async fn test_probe_uses_metadata_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "secrets-router"})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(transport(&server).probe().await.is_ok());
}

#[tokio::test]
async fn test_probe_fails_on_error_status_and_slow_sidecar() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/metadata"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    assert!(transport(&server).probe().await.is_err());

    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/metadata"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&slow)
        .await;
    // probe timeout is 500ms, shorter than the request timeout
    assert!(transport(&slow).probe().await.is_err());
}

#[tokio::test]
async fn test_resolver_falls_through_sidecar_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/secrets/aws-secrets-manager/db-creds"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/secrets/kubernetes/db-creds"))
        .and(query_param("metadata.namespace", "production"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"password": "cGFzc3dvcmQxMjM="})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resolver = SecretResolver::new(chain(), Arc::new(transport(&server)));
    let resolved = resolver.resolve(&request()).await.unwrap();
    assert_eq!(resolved.backend.as_str(), "kubernetes");
    assert_eq!(resolved.value.expose_secret(), "password123");
}
