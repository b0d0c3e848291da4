use std::path::{Path, PathBuf};

use mia_core::MiaResult;
use tracing::info;

/// A report ready to be saved as a text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub file_name: String,
    pub contents: String,
}

impl ReportArtifact {
    pub fn new(millis: i64, contents: impl Into<String>) -> Self {
        Self {
            file_name: format!("analysis_report_{}.txt", millis),
            contents: contents.into(),
        }
    }

    /// Write the report into `dir`, creating it if needed.
    pub async fn write_to(&self, dir: &Path) -> MiaResult<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, self.contents.as_bytes()).await?;
        info!(path = %path.display(), bytes = self.contents.len(), "Exported report");
        Ok(path)
    }
}
