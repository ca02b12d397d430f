//! Mapping of domain failures onto HTTP errors.

use anyhow::anyhow;
use service_core::error::AppError;

use crate::models::WorkbenchError;
use crate::services::acquirer::INVALID_INPUT_MESSAGE;
use crate::services::{AcquireError, DiagnosisError};

/// The one message users see for any failed diagnosis.
pub const DIAGNOSIS_FAILED_MESSAGE: &str = "AI 分析失败，请稍后重试或检查 API Key 设置。";

pub fn acquire_error(err: AcquireError) -> AppError {
    match err {
        AcquireError::InvalidInputKind(_) => {
            AppError::UnsupportedMediaType(INVALID_INPUT_MESSAGE.to_string())
        }
        AcquireError::EmptyFile => AppError::BadRequest(anyhow!("Uploaded file is empty")),
        AcquireError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
        AcquireError::Read(_) => AppError::BadRequest(anyhow!(err)),
    }
}

pub fn workbench_error(err: WorkbenchError) -> AppError {
    match err {
        WorkbenchError::NoImage => AppError::BadRequest(anyhow!(err)),
        WorkbenchError::LoginRequired => AppError::Unauthorized(anyhow!(err)),
        WorkbenchError::AlreadyRunning => AppError::Conflict(anyhow!(err)),
    }
}

/// Provider details go to the log; the client only gets the fixed message.
pub fn diagnosis_error(err: &DiagnosisError) -> AppError {
    match err {
        DiagnosisError::ConfigurationError(_) => {
            AppError::ConfigError(anyhow!(DIAGNOSIS_FAILED_MESSAGE))
        }
        _ => AppError::BadGateway(DIAGNOSIS_FAILED_MESSAGE.to_string()),
    }
}
