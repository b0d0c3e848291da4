//! Image commands.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use mia_analysis::load_image;
use mia_client::api;
use mia_client::RequestGateway;
use mia_core::image::model::ImageUpload;
use mia_core::StudyType;

use super::{parse_study_type, require_session};
use crate::output;

#[derive(Subcommand)]
pub enum ImageCommands {
    /// Upload an image for a patient
    Upload(UploadArgs),

    /// List a patient's images
    List {
        /// Patient id
        patient_id: String,
    },
}

#[derive(Args)]
pub struct UploadArgs {
    /// Image file (PNG, JPG, TIFF or DICOM)
    pub file: PathBuf,

    #[arg(long)]
    pub patient_id: String,

    /// Study type (general, chest_xray, brain_mri, abdominal_ct, spine_mri, mammography)
    #[arg(short, long, default_value = "general", value_parser = parse_study_type)]
    pub study_type: StudyType,

    #[arg(short, long)]
    pub description: Option<String>,
}

pub async fn execute(cmd: ImageCommands, gateway: &RequestGateway) -> Result<()> {
    require_session(gateway)?;

    match cmd {
        ImageCommands::Upload(args) => {
            let file = load_image(&args.file).await?;
            let upload = ImageUpload {
                file,
                patient_id: args.patient_id,
                study_type: args.study_type,
                description: args.description,
            };
            let uploaded = api::images::upload(gateway, &upload).await?;
            println!(
                "{} Uploaded {} ({:.2} MB) as {}",
                "✓".green().bold(),
                upload.file.name.cyan(),
                upload.file.size_mb(),
                uploaded.image_id.dimmed()
            );
        }

        ImageCommands::List { patient_id } => {
            let images = api::images::for_patient(gateway, &patient_id).await?;
            output::print_images_table(&images);
        }
    }

    Ok(())
}
