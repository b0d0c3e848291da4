//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mia_client::{ClientConfig, ConfigOverrides, RequestGateway};
use mia_core::{MiaError, StudyType};
use mia_store::{FileStorage, SessionStore};

use crate::events;

pub mod analyze;
pub mod auth;
pub mod images;
pub mod patients;
pub mod reports;

/// Medical Imaging Assistant - educational image analysis client
#[derive(Parser)]
#[command(name = "mia")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of the MIA service (overrides MIA_API_URL and config.toml)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Directory holding the saved session
    #[arg(long, global = true)]
    pub session_dir: Option<PathBuf>,

    /// Path to a config file (defaults to <config dir>/mia/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in to the service
    Login(auth::LoginArgs),

    /// Create an account
    Register(auth::RegisterArgs),

    /// Forget the saved session
    Logout,

    /// Show the logged in user
    Whoami,

    /// Check that the service is up
    Health,

    /// Patient records
    #[command(subcommand)]
    Patients(patients::PatientCommands),

    /// Medical images
    #[command(subcommand)]
    Images(images::ImageCommands),

    /// Radiology reports
    #[command(subcommand)]
    Reports(reports::ReportCommands),

    /// Analyze an image
    Analyze(analyze::AnalyzeArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = ClientConfig::resolve(ConfigOverrides {
            api_url: self.api_url,
            timeout_secs: self.timeout,
            session_dir: self.session_dir,
            config_file: self.config,
        })
        .context("Failed to load configuration")?;

        let store = SessionStore::open(FileStorage::new(&config.session_dir));
        let gateway = RequestGateway::new(&config, Arc::new(store))?;
        let listener = events::spawn_listener(gateway.subscribe());

        let result = match self.command {
            Commands::Login(args) => auth::login(&gateway, args).await,
            Commands::Register(args) => auth::register(&gateway, args).await,
            Commands::Logout => auth::logout(&gateway),
            Commands::Whoami => auth::whoami(&gateway),
            Commands::Health => auth::health(&gateway).await,
            Commands::Patients(cmd) => patients::execute(cmd, &gateway).await,
            Commands::Images(cmd) => images::execute(cmd, &gateway).await,
            Commands::Reports(cmd) => reports::execute(cmd, &gateway).await,
            Commands::Analyze(args) => analyze::execute(args, &gateway).await,
        };

        // Closing the channel lets the listener flush any pending notice.
        drop(gateway);
        events::join_listener(listener).await;
        result
    }
}

/// Fail early for commands that need a session.
pub(crate) fn require_session(gateway: &RequestGateway) -> Result<()> {
    if gateway.session().is_present() {
        Ok(())
    } else {
        Err(MiaError::NotLoggedIn).context("Run 'mia login' first")
    }
}

pub(crate) fn parse_study_type(s: &str) -> Result<StudyType, String> {
    StudyType::from_str(s).map_err(|e| e.to_string())
}
