use std::path::Path;

use mia_core::{ImageFile, MiaError, MiaResult};
use tracing::debug;

/// Read an image from disk for analysis or upload.
pub async fn load_image(path: &Path) -> MiaResult<ImageFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MiaError::validation(format!("'{}' is not a file", path.display())))?
        .to_string();

    let bytes = tokio::fs::read(path).await?;
    let file = ImageFile::new(name, bytes);

    if !file.is_supported() {
        return Err(MiaError::validation(
            "Unsupported file type. Please upload PNG, JPG, TIFF, or DICOM files.",
        ));
    }
    if file.bytes.is_empty() {
        return Err(MiaError::validation(format!("{} is empty", file.name)));
    }

    debug!(file = %file.name, size = file.size(), mime = %file.mime, "Loaded image");
    Ok(file)
}
