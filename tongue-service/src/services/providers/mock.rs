//! Mock provider for testing.

use super::{DiagnosisError, DiagnosisProvider};
use crate::models::{DiagnosisResult, EncodedImage};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Returns a fixed outcome and counts calls.
pub struct MockDiagnosisProvider {
    outcome: Result<DiagnosisResult, DiagnosisError>,
    delay: Duration,
    calls: AtomicUsize,
    last_image: Mutex<Option<EncodedImage>>,
}

impl MockDiagnosisProvider {
    pub fn new(outcome: Result<DiagnosisResult, DiagnosisError>) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            last_image: Mutex::new(None),
        }
    }

    /// Hold each call open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_image(&self) -> Option<EncodedImage> {
        self.last_image.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl DiagnosisProvider for MockDiagnosisProvider {
    async fn diagnose(&self, image: &EncodedImage) -> Result<DiagnosisResult, DiagnosisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_image.lock() {
            *guard = Some(image.clone());
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.outcome.clone()
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-vision"
    }
}
