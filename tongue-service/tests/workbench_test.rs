//! Workbench flow over the HTTP router with a mock provider.

mod common;

use axum::http::StatusCode;
use common::{body_json, body_text, empty_request, test_state, upload_request, PNG_BYTES};
use std::sync::Arc;
use std::time::Duration;
use tongue_service::config::TongueConfig;
use tongue_service::services::providers::mock::MockDiagnosisProvider;
use tongue_service::services::DiagnosisError;
use tongue_service::startup::{build_router, AppState};
use tower::util::ServiceExt;

const FAILED_MESSAGE: &str = "AI 分析失败，请稍后重试或检查 API Key 设置。";

async fn send(
    state: &AppState,
    request: axum::http::Request<axum::body::Body>,
) -> axum::http::Response<axum::body::Body> {
    build_router(state.clone()).oneshot(request).await.unwrap()
}

async fn upload_png(state: &AppState) {
    let response = send(state, upload_request("tongue.png", "image/png", PNG_BYTES)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let state = test_state(provider.clone(), true).await;

    let response = send(&state, upload_request("notes.pdf", "application/pdf", b"%PDF-1.4")).await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = body_json(response).await;
    assert_eq!(body["error"], "请上传图片文件");

    let view = body_json(send(&state, empty_request("GET", "/api/workbench")).await).await;
    assert_eq!(view["state"], "idle");
    assert_eq!(view["has_image"], false);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn empty_upload_is_rejected() {
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let state = test_state(provider, true).await;

    let response = send(&state, upload_request("tongue.png", "image/png", b"")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_then_diagnose_sends_stripped_base64() {
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let state = test_state(provider.clone(), true).await;

    let response = send(&state, upload_request("tongue.png", "image/png", PNG_BYTES)).await;
    let view = body_json(response).await;
    assert_eq!(view["state"], "ready");
    assert_eq!(view["file_name"], "tongue.png");
    assert_eq!(view["mime_type"], "image/png");

    let response = send(&state, empty_request("POST", "/api/diagnosis")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["state"], "complete");
    assert_eq!(view["result"]["syndrome"]["name"], "气血调和");

    let sent = provider.last_image().expect("provider was called");
    assert_eq!(sent.mime_type, "image/png");
    assert!(!sent.data.starts_with("data:"));
    assert!(sent.data.starts_with("iVBORw0KGgo"));
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn diagnosis_without_image_is_bad_request() {
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let state = test_state(provider.clone(), true).await;

    let response = send(&state, empty_request("POST", "/api/diagnosis")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn logged_out_diagnosis_is_unauthorized_and_makes_no_call() {
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let state = test_state(provider.clone(), false).await;
    upload_png(&state).await;

    let response = send(&state, empty_request("POST", "/api/diagnosis")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn second_trigger_while_loading_is_conflict() {
    let provider = Arc::new(
        MockDiagnosisProvider::new(Ok(common::diagnosis()))
            .with_delay(Duration::from_millis(300)),
    );
    let state = test_state(provider.clone(), true).await;
    upload_png(&state).await;

    let first_state = state.clone();
    let first = tokio::spawn(async move {
        send(&first_state, empty_request("POST", "/api/diagnosis")).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let view = body_json(send(&state, empty_request("GET", "/api/workbench")).await).await;
    assert_eq!(view["state"], "loading");

    let second = send(&state, empty_request("POST", "/api/diagnosis")).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let first = first.await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn provider_failure_shows_single_message() {
    let provider = Arc::new(MockDiagnosisProvider::new(Err(
        DiagnosisError::TransportError("API key not valid".to_string()),
    )));
    let state = test_state(provider, true).await;
    upload_png(&state).await;

    let response = send(&state, empty_request("POST", "/api/diagnosis")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"], FAILED_MESSAGE);

    let view = body_json(send(&state, empty_request("GET", "/api/workbench")).await).await;
    assert_eq!(view["state"], "error");
    assert_eq!(view["error"], FAILED_MESSAGE);
    assert!(view.get("result").is_none());
}

#[tokio::test]
async fn new_image_clears_previous_error() {
    let provider = Arc::new(MockDiagnosisProvider::new(Err(DiagnosisError::EmptyResponse)));
    let state = test_state(provider, true).await;
    upload_png(&state).await;
    send(&state, empty_request("POST", "/api/diagnosis")).await;

    let response = send(&state, upload_request("again.jpg", "image/jpeg", PNG_BYTES)).await;
    let view = body_json(response).await;
    assert_eq!(view["state"], "ready");
    assert!(view.get("error").is_none());
    assert_eq!(view["mime_type"], "image/jpeg");
}

#[tokio::test]
async fn image_replaced_mid_flight_discards_outcome() {
    let provider = Arc::new(
        MockDiagnosisProvider::new(Ok(common::diagnosis()))
            .with_delay(Duration::from_millis(300)),
    );
    let state = test_state(provider, true).await;
    upload_png(&state).await;

    let first_state = state.clone();
    let first = tokio::spawn(async move {
        send(&first_state, empty_request("POST", "/api/diagnosis")).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    upload_png(&state).await;

    let first = first.await.unwrap();
    assert_eq!(first.status(), StatusCode::CONFLICT);

    let view = body_json(send(&state, empty_request("GET", "/api/workbench")).await).await;
    assert_eq!(view["state"], "ready");
    assert!(view.get("result").is_none());
}

#[tokio::test]
async fn login_triggers_waiting_diagnosis() {
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let state = test_state(provider.clone(), false).await;
    upload_png(&state).await;

    let response = send(&state, empty_request("POST", "/api/session/login")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["logged_in"], true);
    assert_eq!(view["state"], "complete");
    assert_eq!(provider.calls(), 1);
    assert!(state.sessions.is_logged_in().await);
}

#[tokio::test]
async fn login_without_image_makes_no_call() {
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let state = test_state(provider.clone(), false).await;

    let view = body_json(send(&state, empty_request("POST", "/api/session/login")).await).await;
    assert_eq!(view["state"], "idle");
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn logout_hides_result_and_report() {
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let state = test_state(provider, true).await;
    upload_png(&state).await;
    send(&state, empty_request("POST", "/api/diagnosis")).await;

    let response = send(&state, empty_request("GET", "/api/report")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/markdown; charset=utf-8"
    );
    let report = body_text(response).await;
    assert!(report.contains("## 核心证型：气血调和"));
    assert!(report.contains("暂无显著异常经络。"));

    let view = body_json(send(&state, empty_request("POST", "/api/session/logout")).await).await;
    assert_eq!(view["logged_in"], false);
    assert!(view.get("result").is_none());
    assert!(!state.sessions.is_logged_in().await);

    let response = send(&state, empty_request("GET", "/api/report")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn report_without_result_is_not_found() {
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let state = test_state(provider, true).await;

    let response = send(&state, empty_request("GET", "/api/report")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reset_returns_to_idle() {
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let state = test_state(provider, true).await;
    upload_png(&state).await;

    let view = body_json(send(&state, empty_request("DELETE", "/api/image")).await).await;
    assert_eq!(view["state"], "idle");
    assert_eq!(view["has_image"], false);
}

#[tokio::test]
async fn oversized_upload_is_payload_too_large() {
    let mut config = TongueConfig::for_tests(common::session_path());
    config.upload.max_image_bytes = 1024;
    let provider = Arc::new(MockDiagnosisProvider::new(Ok(common::diagnosis())));
    let state = AppState::new(config, provider).await;

    // Just over the image limit: rejected by the acquirer.
    let response = send(&state, upload_request("big.png", "image/png", &vec![0u8; 2048])).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    // Past the request body limit: the multipart stream is cut off.
    let response = send(
        &state,
        upload_request("huge.png", "image/png", &vec![0u8; 512 * 1024]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let view = body_json(send(&state, empty_request("GET", "/api/workbench")).await).await;
    assert_eq!(view["state"], "idle");
}

#[tokio::test]
async fn logout_during_diagnosis_discards_outcome() {
    let provider = Arc::new(
        MockDiagnosisProvider::new(Ok(common::diagnosis()))
            .with_delay(Duration::from_millis(300)),
    );
    let state = test_state(provider.clone(), true).await;
    upload_png(&state).await;

    let first_state = state.clone();
    let first = tokio::spawn(async move {
        send(&first_state, empty_request("POST", "/api/diagnosis")).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    send(&state, empty_request("POST", "/api/session/logout")).await;

    let first = first.await.unwrap();
    assert_eq!(first.status(), StatusCode::CONFLICT);

    let view = body_json(send(&state, empty_request("POST", "/api/session/login")).await).await;
    assert_eq!(view["state"], "complete");
    assert_eq!(provider.calls(), 2);
}
