//! Uploaded medical images.

pub mod model;

use crate::error::{MiaError, MiaResult};
use crate::session::required;
use model::ImageUpload;

/// Check an upload before it is sent: the patient must be named and the file
/// must be non-empty with an extension the service accepts.
pub fn validate_upload(upload: &ImageUpload) -> MiaResult<()> {
    required("patient id", &upload.patient_id)?;
    if upload.file.bytes.is_empty() {
        return Err(MiaError::validation(format!("{} is empty", upload.file.name)));
    }
    if !upload.file.is_supported() {
        return Err(MiaError::validation(
            "Unsupported file type. Please upload PNG, JPG, TIFF, or DICOM files.",
        ));
    }
    Ok(())
}
