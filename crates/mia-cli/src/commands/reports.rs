//! Report commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use mia_client::api;
use mia_client::RequestGateway;
use mia_core::report::model::{NewReport, ReportStatus, ReportUpdate};
use mia_core::StudyType;

use super::{parse_study_type, require_session};
use crate::output;

#[derive(Subcommand)]
pub enum ReportCommands {
    /// List a patient's reports
    List {
        /// Patient id
        patient_id: String,
    },

    /// Write a new draft report
    Create(CreateArgs),

    /// Update a report
    Update(UpdateArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub patient_id: String,

    #[arg(long)]
    pub image_id: String,

    #[arg(short, long, default_value = "general", value_parser = parse_study_type)]
    pub study_type: StudyType,

    #[arg(long)]
    pub findings: String,

    #[arg(long)]
    pub impression: String,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Report id
    pub report_id: String,

    #[arg(long)]
    pub findings: Option<String>,

    #[arg(long)]
    pub impression: Option<String>,

    /// New status (draft, finalized, reviewed)
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub reviewed_by: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

pub async fn execute(cmd: ReportCommands, gateway: &RequestGateway) -> Result<()> {
    require_session(gateway)?;

    match cmd {
        ReportCommands::List { patient_id } => {
            let reports = api::reports::for_patient(gateway, &patient_id).await?;
            output::print_reports_table(&reports);
        }

        ReportCommands::Create(args) => {
            let report = NewReport {
                patient_id: args.patient_id,
                image_id: args.image_id,
                study_type: args.study_type,
                findings: args.findings,
                impression: args.impression,
            };
            let id = api::reports::create(gateway, &report).await?;
            println!(
                "{} Created {} report ({})",
                "✓".green().bold(),
                report.study_type.display_name().cyan(),
                id.dimmed()
            );
        }

        ReportCommands::Update(args) => {
            let update = ReportUpdate {
                findings: args.findings,
                impression: args.impression,
                status: args.status.as_deref().map(ReportStatus::from_str),
                reviewed_by: args.reviewed_by,
                review_notes: args.notes,
            };
            api::reports::update(gateway, &args.report_id, &update).await?;
            println!("{} Updated report {}", "✓".green().bold(), args.report_id.dimmed());
        }
    }

    Ok(())
}
