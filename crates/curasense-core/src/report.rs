//! Fixed-schema analysis report models.
//!
//! These are the JSON contracts the Structured Analyzer asks the model to
//! fill. Every field defaults, so a reply that legitimately omits unknown
//! sections (`null` / empty list, per the prompt instructions) still
//! deserializes into a well-formed report.

use serde::{Deserialize, Deserializer, Serialize};

/// Structured summary of a textual medical document (lab report,
/// prescription, discharge summary, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextReport {
    pub summary: Option<String>,
    pub diagnosis: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub key_findings: Vec<String>,
    pub causes: Option<Vec<String>>,
    pub recommendations: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub precautions: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub remedies: Vec<String>,
    pub important_notes: Option<String>,
    pub treatment_plan: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub lifestyle_changes: Vec<String>,
    pub urgent_concerns: Option<String>,
}

/// Structured summary of a medical image (X-ray, scan, photographed report).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagingReport {
    pub summary: String,
    pub diagnosis: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub key_findings: Vec<String>,
    pub precautions: Option<Vec<String>>,
    pub remedies: Option<Vec<String>>,
    pub urgent_concerns: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub anatomical_structures: Vec<String>,
}

/// The model is told to use `null` for unknowns and sometimes does so for
/// list fields too; treat that as an empty list rather than a parse error.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
