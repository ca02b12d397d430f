//! Diagnosis provider abstraction and implementations.
//!
//! The HTTP layer only sees [`DiagnosisProvider`], so the Gemini client can be
//! swapped for the mock in tests.

pub mod gemini;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;
use validator::Validate;

use crate::models::{DiagnosisResult, EncodedImage};

/// Error type for diagnosis requests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiagnosisError {
    #[error("Provider not configured: {0}")]
    ConfigurationError(String),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Response does not match the diagnosis schema: {0}")]
    SchemaViolation(String),

    #[error("Model returned no text")]
    EmptyResponse,
}

impl DiagnosisError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DiagnosisError::ConfigurationError(_) => "configuration",
            DiagnosisError::TransportError(_) => "transport",
            DiagnosisError::SchemaViolation(_) => "schema_violation",
            DiagnosisError::EmptyResponse => "empty_response",
        }
    }
}

/// Image-to-diagnosis exchange with an external model.
#[async_trait]
pub trait DiagnosisProvider: Send + Sync {
    /// Issue exactly one request for the image and parse the result.
    async fn diagnose(&self, image: &EncodedImage) -> Result<DiagnosisResult, DiagnosisError>;

    /// Provider name for logs and metrics.
    fn name(&self) -> &'static str;

    /// Model identifier the provider targets.
    fn model(&self) -> &str;

    /// Whether the provider has what it needs to make a request.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Parse the model's text payload into a [`DiagnosisResult`].
///
/// Missing fields, wrong types and an empty overview are all schema
/// violations; nothing is defaulted.
pub fn parse_diagnosis(text: &str) -> Result<DiagnosisResult, DiagnosisError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(DiagnosisError::EmptyResponse);
    }

    let result: DiagnosisResult = serde_json::from_str(strip_code_fence(trimmed))
        .map_err(|e| DiagnosisError::SchemaViolation(e.to_string()))?;

    result
        .validate()
        .map_err(|e| DiagnosisError::SchemaViolation(e.to_string()))?;

    Ok(result)
}

/// Models occasionally wrap JSON output in a Markdown fence.
fn strip_code_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}
