//! Medical image domain models.

use serde::{Deserialize, Serialize};

use crate::analysis::model::{ImageFile, StudyType};

/// Metadata of an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalImage {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub patient_id: String,
    pub study_type: StudyType,
    #[serde(default)]
    pub description: Option<String>,
    pub file_name: String,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Upload form: the file plus its patient and modality.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file: ImageFile,
    pub patient_id: String,
    pub study_type: StudyType,
    pub description: Option<String>,
}

/// Identifiers the service returns for an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub image_id: String,
    #[serde(default)]
    pub file_path: Option<String>,
}
