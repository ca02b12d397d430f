pub mod acquirer;
pub mod metrics;
pub mod prompt;
pub mod providers;
pub mod report;
pub mod session_store;

pub use acquirer::{AcquireError, ImageAcquirer, RawFile};
pub use providers::{DiagnosisError, DiagnosisProvider};
pub use report::render_report;
pub use session_store::SessionStore;
