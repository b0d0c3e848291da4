//! Account and session commands.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::Password;
use mia_client::api;
use mia_client::RequestGateway;
use mia_core::{Credentials, NewUser, UserRole};

use crate::output;

#[derive(Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Account email
    #[arg(short, long)]
    pub email: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    /// Role (student, instructor, admin)
    #[arg(long, default_value = "student")]
    pub role: String,

    #[arg(long)]
    pub institution: Option<String>,

    /// Password (prompted when omitted)
    #[arg(short, long)]
    pub password: Option<String>,
}

pub async fn login(gateway: &RequestGateway, args: LoginArgs) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?,
    };

    let session = api::auth::login(gateway, &Credentials::new(args.email, password)).await?;
    println!(
        "{} Logged in as {} ({})",
        "✓".green().bold(),
        session.user.display_name().cyan(),
        session.user.role.as_str().dimmed()
    );
    Ok(())
}

pub async fn register(gateway: &RequestGateway, args: RegisterArgs) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .context("Failed to read password")?,
    };

    let user = NewUser {
        email: args.email,
        password,
        first_name: args.first_name,
        last_name: args.last_name,
        role: UserRole::from_str(&args.role),
        institution: args.institution,
    };
    let user_id = api::auth::register(gateway, &user).await?;
    println!(
        "{} Registered {} ({})",
        "✓".green().bold(),
        user.email.cyan(),
        user_id.dimmed()
    );
    println!("Log in with {}", format!("mia login --email {}", user.email).cyan());
    Ok(())
}

pub fn logout(gateway: &RequestGateway) -> Result<()> {
    api::auth::logout(gateway)?;
    println!("{} Logged out", "✓".green().bold());
    Ok(())
}

pub fn whoami(gateway: &RequestGateway) -> Result<()> {
    match gateway.session().user() {
        Some(user) => output::print_profile(&user),
        None => println!("{}", "Not logged in.".dimmed()),
    }
    Ok(())
}

pub async fn health(gateway: &RequestGateway) -> Result<()> {
    if api::health::check(gateway).await {
        println!("{} {} is healthy", "✓".green().bold(), gateway.base_url());
        Ok(())
    } else {
        anyhow::bail!("{} is not reachable or unhealthy", gateway.base_url())
    }
}
