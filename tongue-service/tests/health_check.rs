//! Integration tests for tongue-service probes.
//!
//! The application is started on a random port with a mock provider.

mod common;

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tongue_service::config::TongueConfig;
use tongue_service::services::providers::mock::MockDiagnosisProvider;
use tongue_service::startup::Application;

async fn spawn(app: Application) -> u16 {
    let port = app.http_port();
    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    port
}

#[tokio::test]
async fn health_check_works() {
    let config = TongueConfig::for_tests(common::session_path());
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let app = Application::build_with_provider(config, provider)
        .await
        .expect("Failed to build application");
    let port = spawn(app).await;

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "tongue-service");
    assert_eq!(body["provider"], "mock");
}

#[tokio::test]
async fn readiness_fails_without_api_key() {
    let config = TongueConfig::for_tests(common::session_path());
    let app = Application::build(config)
        .await
        .expect("Failed to build application");
    let port = spawn(app).await;
    let client = Client::new();

    let ready = client
        .get(format!("http://127.0.0.1:{}/ready", port))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(ready.status().as_u16(), 503);

    let health = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to execute request");
    assert!(health.status().is_success());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let config = TongueConfig::for_tests(common::session_path());
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let app = Application::build_with_provider(config, provider)
        .await
        .expect("Failed to build application");
    let port = spawn(app).await;

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/api/workbench", port))
        .header("x-request-id", "probe-1")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "probe-1"
    );
}
