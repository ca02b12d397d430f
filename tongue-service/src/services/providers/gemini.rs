//! Gemini vision provider.
//!
//! Sends the tongue photo with the fixed diagnostic instruction and response
//! schema to `models/{model}:generateContent`, one request per call.

use super::{parse_diagnosis, DiagnosisError, DiagnosisProvider};
use crate::models::{strip_data_url_prefix, DiagnosisResult, EncodedImage};
use crate::services::prompt::{response_schema, SYSTEM_INSTRUCTION, USER_PROMPT};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for tongue analysis.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Low temperature keeps the clinical phrasing consistent between runs.
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.map(Secret::new),
            model: DEFAULT_MODEL.to_string(),
            api_base: GEMINI_API_BASE.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Gemini diagnosis client.
pub struct GeminiDiagnosisClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiDiagnosisClient {
    /// Uses the transport's default timeout; no timeout policy is layered on top.
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    fn api_key(&self) -> Result<&str, DiagnosisError> {
        self.config
            .api_key
            .as_ref()
            .map(|key| key.expose_secret().trim())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                DiagnosisError::ConfigurationError("Gemini API key not configured".to_string())
            })
    }

    /// Build the API URL for the given method.
    fn api_url(&self, method: &str, api_key: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            method,
            api_key
        )
    }

    pub(crate) fn build_request(&self, image: &EncodedImage) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::inline_data(&image.mime_type, strip_data_url_prefix(&image.data)),
                    Part::text(USER_PROMPT),
                ],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(SYSTEM_INSTRUCTION)],
            },
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        }
    }
}

#[async_trait]
impl DiagnosisProvider for GeminiDiagnosisClient {
    #[tracing::instrument(skip(self, image), fields(model = %self.config.model))]
    async fn diagnose(&self, image: &EncodedImage) -> Result<DiagnosisResult, DiagnosisError> {
        let api_key = self.api_key()?;
        let request = self.build_request(image);
        let url = self.api_url("generateContent", api_key);

        tracing::debug!(
            mime_type = %image.mime_type,
            image_bytes = image.decoded_len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DiagnosisError::TransportError(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| DiagnosisError::TransportError(e.without_url().to_string()))?;

        if !status.is_success() {
            let message = upstream_error_message(status, &body);
            tracing::warn!(status = %status, error = %message, "Gemini API returned an error");
            return Err(DiagnosisError::TransportError(message));
        }

        let api_response: GenerateContentResponse = serde_json::from_slice(&body)
            .map_err(|e| DiagnosisError::SchemaViolation(format!("malformed response envelope: {}", e)))?;

        if let Some(usage) = &api_response.usage_metadata {
            tracing::debug!(
                input_tokens = usage.prompt_token_count.unwrap_or(0),
                output_tokens = usage.candidates_token_count.unwrap_or(0),
                "Gemini usage"
            );
        }

        let text = api_response.text().ok_or_else(|| {
            tracing::warn!(
                finish_reason = api_response.finish_reason().unwrap_or("none"),
                block_reason = api_response
                    .prompt_feedback
                    .as_ref()
                    .and_then(|f| f.block_reason.as_deref())
                    .unwrap_or("none"),
                "Gemini response carried no text"
            );
            DiagnosisError::EmptyResponse
        })?;

        parse_diagnosis(&text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_configured(&self) -> bool {
        GeminiDiagnosisClient::is_configured(self)
    }
}

/// Best available diagnostic text for a failed call: the API's
/// `error.message`, else the raw body, else the status line.
fn upstream_error_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    if let Ok(envelope) = serde_json::from_slice::<ApiErrorEnvelope>(body) {
        if let Some(message) = envelope.error.message.filter(|m| !m.trim().is_empty()) {
            return message;
        }
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if !raw.is_empty() {
        return raw.to_string();
    }

    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing, default)]
    thought: Option<bool>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    fn inline_data(mime_type: &str, data: &str) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.to_string(),
                data: data.to_string(),
            }),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Concatenated non-thought text of the first candidate.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let content = candidate.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<i32>,
    candidates_token_count: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}
