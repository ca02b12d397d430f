//! Image intake: validates an uploaded file and base64-encodes it.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::models::EncodedImage;

/// Message shown when a non-image file is chosen.
pub const INVALID_INPUT_MESSAGE: &str = "请上传图片文件";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AcquireError {
    #[error("Unsupported file type: {0}")]
    InvalidInputKind(String),

    #[error("File is empty")]
    EmptyFile,

    #[error("File of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Failed to read file: {0}")]
    Read(String),
}

/// A user-selected file as received from the client.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ImageAcquirer {
    max_bytes: usize,
}

impl ImageAcquirer {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate the declared content type and encode the bytes.
    ///
    /// Only the declared type is checked; the bytes are not sniffed.
    pub fn acquire(&self, file: RawFile) -> Result<EncodedImage, AcquireError> {
        let content_type = file
            .content_type
            .as_deref()
            .map(|ct| ct.trim().to_ascii_lowercase())
            .unwrap_or_default();

        // Parameters such as "; charset=binary" are not part of the MIME type.
        let mime_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        if !mime_type.starts_with("image/") || mime_type.len() == "image/".len() {
            return Err(AcquireError::InvalidInputKind(if mime_type.is_empty() {
                "unknown".to_string()
            } else {
                mime_type
            }));
        }

        if file.bytes.is_empty() {
            return Err(AcquireError::EmptyFile);
        }

        if file.bytes.len() > self.max_bytes {
            return Err(AcquireError::TooLarge {
                size: file.bytes.len(),
                limit: self.max_bytes,
            });
        }

        tracing::debug!(
            file_name = file.file_name.as_deref().unwrap_or("unnamed"),
            mime_type = %mime_type,
            size = file.bytes.len(),
            "Encoding uploaded image"
        );

        Ok(EncodedImage {
            mime_type,
            data: STANDARD.encode(&file.bytes),
        })
    }
}
