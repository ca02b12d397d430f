//! Encoded image carried from the acquirer to the diagnosis client.

use serde::{Deserialize, Serialize};

/// Base64 image payload with its declared MIME type.
///
/// `data` never carries a `data:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub mime_type: String,
    pub data: String,
}

impl EncodedImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: strip_data_url_prefix(&data.into()).to_string(),
        }
    }

    /// Approximate decoded size in bytes.
    pub fn decoded_len(&self) -> usize {
        let padding = self.data.bytes().rev().take_while(|b| *b == b'=').count();
        (self.data.len() / 4 * 3).saturating_sub(padding)
    }
}

/// Drop any `data:...;base64,` prefix, leaving only the base64 payload.
///
/// Raw base64 is returned unchanged.
pub fn strip_data_url_prefix(input: &str) -> &str {
    if !input.starts_with("data:") {
        return input;
    }

    match input.find(";base64,") {
        Some(idx) => &input[idx + ";base64,".len()..],
        None => input,
    }
}
