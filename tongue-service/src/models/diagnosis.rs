//! Structured diagnosis returned by the vision model.
//!
//! Every field is required on the wire: a response missing any of them is
//! rejected as a schema violation rather than filled with defaults.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Overview text the model uses when the photo is not a readable tongue.
pub const UNRECOGNIZABLE: &str = "无法辨识";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    #[validate(length(min = 1, message = "overview cannot be empty"))]
    pub overview: String,
    pub tongue_body: TongueBody,
    pub tongue_coating: TongueCoating,
    pub syndrome: Syndrome,
    pub symptoms: Vec<String>,
    pub meridian_analysis: Vec<MeridianFinding>,
    pub recommendations: Recommendations,
}

/// Tongue body (舌质).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TongueBody {
    pub color: String,
    pub shape: String,
    pub moisture: String,
    pub analysis: String,
}

/// Tongue coating (舌苔).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TongueCoating {
    pub color: String,
    pub thickness: String,
    pub nature: String,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Syndrome {
    pub name: String,
    pub description: String,
    pub organs_involved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeridianFinding {
    pub name: String,
    pub status: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub diet: Vec<String>,
    pub lifestyle: Vec<String>,
    pub herbs_or_foods: Vec<String>,
    pub tcm_formulas: Vec<Formula>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    pub name: String,
    pub description: String,
}

impl DiagnosisResult {
    /// Whether the model flagged the photo as unusable.
    pub fn is_unrecognizable(&self) -> bool {
        self.overview.contains(UNRECOGNIZABLE)
    }

    /// An empty meridian list means no notable imbalance was found.
    pub fn has_meridian_imbalance(&self) -> bool {
        !self.meridian_analysis.is_empty()
    }
}
