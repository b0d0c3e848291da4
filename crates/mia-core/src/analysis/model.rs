//! Analysis domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MiaError, MiaResult};

/// Imaging modality selected before an analysis is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyType {
    #[default]
    General,
    ChestXray,
    BrainMri,
    AbdominalCt,
    SpineMri,
    Mammography,
}

impl StudyType {
    pub const ALL: [StudyType; 6] = [
        Self::General,
        Self::ChestXray,
        Self::BrainMri,
        Self::AbdominalCt,
        Self::SpineMri,
        Self::Mammography,
    ];

    /// Wire value sent as the `study_type` form field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::ChestXray => "chest_xray",
            Self::BrainMri => "brain_mri",
            Self::AbdominalCt => "abdominal_ct",
            Self::SpineMri => "spine_mri",
            Self::Mammography => "mammography",
        }
    }

    pub fn from_str(s: &str) -> MiaResult<Self> {
        let wanted = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|study| study.as_str() == wanted)
            .ok_or_else(|| {
                MiaError::validation(format!(
                    "Invalid study type: '{}'. Use: general, chest_xray, brain_mri, abdominal_ct, spine_mri, mammography",
                    s
                ))
            })
    }

    /// Upper-case label used in report headers, e.g. `CHEST XRAY`.
    pub fn report_label(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }

    /// Human readable name for menus.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::ChestXray => "Chest X-ray",
            Self::BrainMri => "Brain MRI",
            Self::AbdominalCt => "Abdominal CT",
            Self::SpineMri => "Spine MRI",
            Self::Mammography => "Mammography",
        }
    }
}

impl fmt::Display for StudyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one file selection. Every selection gets a fresh, strictly
/// increasing id so late preview or analysis results can be matched against
/// the request that is current when they arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An image file picked by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Extensions the analysis backend accepts.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "tif", "dicom", "dcm"];

impl ImageFile {
    /// Create a file, inferring the mime type from the file name.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime = mime_for_name(&name).to_string();
        Self { name, mime, bytes }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Size in megabytes, as shown next to the file name.
    pub fn size_mb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0 / 1024.0
    }

    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
    }

    pub fn is_supported(&self) -> bool {
        self.extension()
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Best-guess mime type from a file name.
pub fn mime_for_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tiff" | "tif" => "image/tiff",
        "dicom" | "dcm" => "application/dicom",
        _ => "application/octet-stream",
    }
}

/// The file and modality of one analysis cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub id: RequestId,
    pub file: ImageFile,
    pub study_type: StudyType,
}

/// Where an analysis result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrigin {
    Remote,
    Fallback,
}

impl ResultOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        }
    }
}

/// A resolved analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub report_text: String,
    /// Always within `[0, 1]`.
    pub confidence_score: f64,
    pub origin: ResultOrigin,
}

impl AnalysisResult {
    /// Result built from the analysis service's answer.
    pub fn remote(report_text: impl Into<String>, confidence_score: f64) -> Self {
        let score = if confidence_score.is_finite() {
            confidence_score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            report_text: report_text.into(),
            confidence_score: score,
            origin: ResultOrigin::Remote,
        }
    }

    /// Synthesized result used when the analysis service cannot be reached.
    pub fn fallback(study_type: StudyType) -> Self {
        Self {
            report_text: super::fallback_report(study_type),
            confidence_score: super::FALLBACK_CONFIDENCE,
            origin: ResultOrigin::Fallback,
        }
    }

    /// Whether the report names the given study type, ignoring case and the
    /// `_` / space spelling difference.
    pub fn mentions_study_type(&self, study_type: StudyType) -> bool {
        let text = self.report_text.to_uppercase();
        text.contains(&study_type.report_label()) || text.contains(&study_type.as_str().to_uppercase())
    }
}
