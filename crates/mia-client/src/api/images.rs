//! Image uploads.

use mia_core::image::model::{ImageUpload, MedicalImage, UploadedImage};
use mia_core::image::validate_upload;
use mia_core::MiaResult;
use tracing::info;

use crate::gateway::RequestGateway;
use crate::request::{path_segment, MultipartBody, OutboundRequest};

/// Upload an image for a patient.
pub async fn upload(gateway: &RequestGateway, upload: &ImageUpload) -> MiaResult<UploadedImage> {
    validate_upload(upload)?;

    let mut body = MultipartBody::new()
        .file("file", &upload.file)
        .text("patient_id", upload.patient_id.trim())
        .text("study_type", upload.study_type.as_str());
    if let Some(description) = upload.description.as_deref().filter(|d| !d.trim().is_empty()) {
        body = body.text("description", description);
    }

    let request = OutboundRequest::post("/images/upload").multipart(body);
    let uploaded: UploadedImage = gateway.send_json(request).await.into_result()?;
    info!(
        image_id = %uploaded.image_id,
        file = %upload.file.name,
        size = upload.file.size(),
        "Uploaded image"
    );
    Ok(uploaded)
}

/// Images stored for a patient.
pub async fn for_patient(gateway: &RequestGateway, patient_id: &str) -> MiaResult<Vec<MedicalImage>> {
    let patient_id = path_segment("patient id", patient_id)?;
    let request = OutboundRequest::get(format!("/images/patient/{}", patient_id));
    gateway.send_json(request).await.into_result()
}
