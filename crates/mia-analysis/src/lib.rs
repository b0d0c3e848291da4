//! # MIA Analysis
//!
//! Drives one image through selection, preview, remote analysis and export.
//! When the analysis service fails the workflow still resolves, with a
//! templated fallback report instead of the remote one.

pub mod export;
pub mod file;
pub mod preview;
pub mod workflow;

pub use export::ReportArtifact;
pub use file::load_image;
pub use preview::{decode_preview, Preview, PreviewError, PreviewTicket};
pub use workflow::{AnalysisWorkflow, Submission, WorkflowState};
