//! Image analysis command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use mia_analysis::{decode_preview, load_image, AnalysisWorkflow, WorkflowState};
use mia_client::RequestGateway;
use mia_core::{MiaError, ResultOrigin, StudyType};
use tracing::debug;

use super::{parse_study_type, require_session};
use crate::output;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Image file (PNG, JPG, TIFF or DICOM)
    pub file: PathBuf,

    /// Study type (general, chest_xray, brain_mri, abdominal_ct, spine_mri, mammography)
    #[arg(short, long, default_value = "general", value_parser = parse_study_type)]
    pub study_type: StudyType,

    /// Save the report as a text file in this directory
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}

pub async fn execute(args: AnalyzeArgs, gateway: &RequestGateway) -> Result<()> {
    require_session(gateway)?;

    let file = load_image(&args.file).await?;
    println!(
        "{} {} ({:.2} MB)",
        "Selected".bold(),
        file.name.cyan(),
        file.size_mb()
    );

    let mut workflow = AnalysisWorkflow::with_study_type(args.study_type);
    let ticket = workflow.select_file(file);
    let (ticket, preview) = decode_preview(ticket).await;
    if workflow.apply_preview(&ticket, preview) {
        if let Some(preview) = workflow.preview() {
            debug!(mime = %preview.mime, len = preview.data_url.len(), "Preview ready");
        }
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message(format!("Analyzing as {}...", args.study_type.display_name()));
    let state = workflow.submit(gateway).await;
    spinner.finish_and_clear();

    match state {
        Some(WorkflowState::Resolved(origin)) => {
            if origin == ResultOrigin::Fallback {
                println!(
                    "{} Analysis service unavailable, showing a template report.",
                    "!".yellow().bold()
                );
            }
        }
        Some(WorkflowState::Idle) => return Err(MiaError::AuthRejected.into()),
        other => anyhow::bail!("Analysis did not complete (state: {:?})", other),
    }

    if let Some(result) = workflow.result() {
        output::print_analysis(result);
    }

    if let Some(dir) = args.export {
        if let Some(artifact) = workflow.export() {
            let path = artifact
                .write_to(&dir)
                .await
                .with_context(|| format!("Failed to export report to {}", dir.display()))?;
            println!("{} Saved report to {}", "✓".green().bold(), path.display());
        }
    }

    Ok(())
}
