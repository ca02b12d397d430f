#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use http_body_util::BodyExt;
use std::path::PathBuf;
use std::sync::Arc;
use tongue_service::config::TongueConfig;
use tongue_service::models::{
    DiagnosisResult, Recommendations, Syndrome, TongueBody, TongueCoating,
};
use tongue_service::services::DiagnosisProvider;
use tongue_service::startup::AppState;

pub const BOUNDARY: &str = "tongue-test-boundary";

/// PNG signature and the start of an IHDR chunk; content is never decoded.
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89,
];

/// Session file path unique to one test.
pub fn session_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("tongue-it-{}", uuid::Uuid::new_v4()))
        .join("session.json")
}

pub async fn test_state(provider: Arc<dyn DiagnosisProvider>, logged_in: bool) -> AppState {
    let config = TongueConfig::for_tests(session_path());
    if logged_in {
        tongue_service::services::SessionStore::new(config.session.file.clone())
            .log_in()
            .await
            .expect("Failed to write session file");
    }
    AppState::new(config, provider).await
}

pub fn upload_request(file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/image")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn diagnosis() -> DiagnosisResult {
    DiagnosisResult {
        overview: "舌淡红苔薄白".to_string(),
        tongue_body: TongueBody {
            color: "淡红".to_string(),
            shape: "正常".to_string(),
            moisture: "润".to_string(),
            analysis: "气血调和".to_string(),
        },
        tongue_coating: TongueCoating {
            color: "薄白".to_string(),
            thickness: "薄".to_string(),
            nature: "润".to_string(),
            analysis: "胃气充足".to_string(),
        },
        syndrome: Syndrome {
            name: "气血调和".to_string(),
            description: "阴阳平衡".to_string(),
            organs_involved: vec![],
        },
        symptoms: vec![],
        meridian_analysis: vec![],
        recommendations: Recommendations {
            diet: vec!["饮食清淡".to_string()],
            lifestyle: vec![],
            herbs_or_foods: vec![],
            tcm_formulas: vec![],
        },
    }
}
