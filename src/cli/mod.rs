pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

#[derive(Parser)]
#[command(name = "vet")]
#[command(about = "Vet CLI - Session management for the veterinary clinic API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Initialize configuration directory with required files")]
    Init {
        #[command(subcommand)]
        cmd: commands::init::InitCommands,
    },

    #[command(about = "Login, logout and permission checks")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Authenticated requests against the API")]
    Api {
        #[command(subcommand)]
        cmd: commands::api::ApiCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let result = match cli.command {
        Commands::Init { cmd } => commands::init::handle(cmd, &output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, &output_format).await,
        Commands::Api { cmd } => commands::api::handle(cmd, &output_format).await,
    };

    if let Err(e) = &result {
        match e.downcast_ref::<AuthError>() {
            Some(auth) => utils::output_error(&output_format, &auth.message(), Some(auth.error_code()))?,
            None => utils::output_error(&output_format, &format!("{:#}", e), None)?,
        }
    }

    result
}
