//! Patient commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use mia_client::api;
use mia_client::RequestGateway;
use mia_core::patient::model::{NewPatient, Page};

use super::require_session;
use crate::output;

#[derive(Subcommand)]
pub enum PatientCommands {
    /// List patients
    List(ListArgs),

    /// Create a patient record
    Create(CreateArgs),
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 0)]
    pub skip: u32,

    #[arg(long, default_value_t = 100)]
    pub limit: u32,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Hospital patient identifier
    #[arg(long)]
    pub patient_id: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub dob: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub history: Option<String>,
}

pub async fn execute(cmd: PatientCommands, gateway: &RequestGateway) -> Result<()> {
    require_session(gateway)?;

    match cmd {
        PatientCommands::List(args) => {
            let page = Page {
                skip: args.skip,
                limit: args.limit,
            };
            let patients = api::patients::list(gateway, page).await?;
            output::print_patients_table(&patients);
        }

        PatientCommands::Create(args) => {
            let patient = NewPatient {
                patient_id: args.patient_id,
                first_name: args.first_name,
                last_name: args.last_name,
                date_of_birth: args.dob,
                gender: args.gender,
                medical_history: args.history,
            };
            let id = api::patients::create(gateway, &patient).await?;
            println!(
                "{} Created patient: {} {} ({})",
                "✓".green().bold(),
                patient.first_name.cyan(),
                patient.last_name.cyan(),
                id.dimmed()
            );
        }
    }

    Ok(())
}
