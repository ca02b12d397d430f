//! Per-process application state: the selected image, the current diagnosis
//! and the transient UI state derived from them.
//!
//! The workbench is injected into the HTTP layer through `AppState`; nothing
//! here is a global.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{DiagnosisResult, EncodedImage};

/// Why a diagnosis cannot start right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WorkbenchError {
    #[error("No image has been selected")]
    NoImage,

    #[error("Login required to view the diagnosis")]
    LoginRequired,

    #[error("A diagnosis is already in progress")]
    AlreadyRunning,
}

#[derive(Debug, Clone)]
struct SelectedImage {
    id: Uuid,
    file_name: Option<String>,
    image: EncodedImage,
    selected_at: DateTime<Utc>,
}

/// Handle for one in-flight diagnosis.
///
/// Completion is only applied if no newer image was selected meanwhile.
#[derive(Debug)]
pub struct DiagnosisTicket {
    generation: u64,
    pub image_id: Uuid,
    pub image: EncodedImage,
}

#[derive(Debug, Default)]
pub struct Workbench {
    image: Option<SelectedImage>,
    result: Option<DiagnosisResult>,
    error: Option<String>,
    in_flight: bool,
    generation: u64,
    logged_in: bool,
    diagnosed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    Idle,
    Ready,
    Loading,
    Error,
    Complete,
}

/// Serializable snapshot of the workbench for clients.
#[derive(Debug, Clone, Serialize)]
pub struct WorkbenchView {
    pub state: ViewState,
    pub logged_in: bool,
    pub has_image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DiagnosisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosed_at: Option<DateTime<Utc>>,
}

impl Workbench {
    pub fn new(logged_in: bool) -> Self {
        Self {
            logged_in,
            ..Self::default()
        }
    }

    /// Replace the current image. Any previous result and error are cleared
    /// before a new diagnosis can begin.
    pub fn select_image(&mut self, image: EncodedImage, file_name: Option<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.generation += 1;
        self.image = Some(SelectedImage {
            id,
            file_name,
            image,
            selected_at: Utc::now(),
        });
        self.clear_outcome();
        id
    }

    /// Drop the image, result and error.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.image = None;
        self.clear_outcome();
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn log_in(&mut self) {
        self.logged_in = true;
    }

    /// Logging out hides and discards the current result, including one
    /// still in flight.
    pub fn log_out(&mut self) {
        self.generation += 1;
        self.logged_in = false;
        self.result = None;
        self.diagnosed_at = None;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// An image is waiting and nothing has been produced for it yet.
    pub fn awaits_diagnosis(&self) -> bool {
        self.image.is_some() && self.result.is_none() && !self.in_flight
    }

    /// Mark a diagnosis as started for the current image.
    ///
    /// The in-flight marker rejects a second trigger until
    /// [`Workbench::finish_diagnosis`] runs for this ticket.
    pub fn begin_diagnosis(&mut self) -> Result<DiagnosisTicket, WorkbenchError> {
        let selected = self.image.as_ref().ok_or(WorkbenchError::NoImage)?;
        if !self.logged_in {
            return Err(WorkbenchError::LoginRequired);
        }
        if self.in_flight {
            return Err(WorkbenchError::AlreadyRunning);
        }

        let ticket = DiagnosisTicket {
            generation: self.generation,
            image_id: selected.id,
            image: selected.image.clone(),
        };

        self.in_flight = true;
        self.error = None;
        Ok(ticket)
    }

    /// Record the outcome of a diagnosis. Returns `false` when the outcome
    /// was discarded because the image changed while the request ran.
    pub fn finish_diagnosis(
        &mut self,
        ticket: DiagnosisTicket,
        outcome: Result<DiagnosisResult, String>,
    ) -> bool {
        self.in_flight = false;

        if ticket.generation != self.generation {
            return false;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
                self.diagnosed_at = Some(Utc::now());
            }
            Err(message) => {
                self.result = None;
                self.error = Some(message);
            }
        }
        true
    }

    /// The current result, only visible while logged in.
    pub fn result(&self) -> Option<&DiagnosisResult> {
        if self.logged_in {
            self.result.as_ref()
        } else {
            None
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> ViewState {
        if self.in_flight {
            ViewState::Loading
        } else if self.error.is_some() {
            ViewState::Error
        } else if self.result.is_some() {
            ViewState::Complete
        } else if self.image.is_some() {
            ViewState::Ready
        } else {
            ViewState::Idle
        }
    }

    pub fn view(&self) -> WorkbenchView {
        let selected = self.image.as_ref();
        WorkbenchView {
            state: self.state(),
            logged_in: self.logged_in,
            has_image: selected.is_some(),
            image_id: selected.map(|s| s.id),
            file_name: selected.and_then(|s| s.file_name.clone()),
            mime_type: selected.map(|s| s.image.mime_type.clone()),
            selected_at: selected.map(|s| s.selected_at),
            error: self.error.clone(),
            result: self.result().cloned(),
            diagnosed_at: self.diagnosed_at,
        }
    }

    fn clear_outcome(&mut self) {
        self.result = None;
        self.error = None;
        self.diagnosed_at = None;
    }
}
