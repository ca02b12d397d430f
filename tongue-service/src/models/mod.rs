//! Domain models for the tongue diagnosis service.

pub mod diagnosis;
pub mod image;
pub mod workbench;

pub use diagnosis::{
    DiagnosisResult, Formula, MeridianFinding, Recommendations, Syndrome, TongueBody,
    TongueCoating, UNRECOGNIZABLE,
};
pub use image::{strip_data_url_prefix, EncodedImage};
pub use workbench::{DiagnosisTicket, ViewState, Workbench, WorkbenchError, WorkbenchView};
