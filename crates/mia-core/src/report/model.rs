//! Report domain models.

use serde::{Deserialize, Serialize};

use crate::analysis::model::StudyType;

/// Review status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Draft,
    Finalized,
    Reviewed,
}

impl ReportStatus {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "finalized" => Self::Finalized,
            "reviewed" => Self::Reviewed,
            _ => Self::Draft,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Finalized => "finalized",
            Self::Reviewed => "reviewed",
        }
    }
}

/// A radiology report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub patient_id: String,
    pub image_id: String,
    pub study_type: StudyType,
    pub findings: String,
    pub impression: String,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub review_notes: Option<String>,
    #[serde(default = "first_version")]
    pub version: u32,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn first_version() -> u32 {
    1
}

/// Form for creating a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub patient_id: String,
    pub image_id: String,
    pub study_type: StudyType,
    pub findings: String,
    pub impression: String,
}

/// Partial update; absent fields are left untouched by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

impl ReportUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
