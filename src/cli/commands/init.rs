use clap::Subcommand;
use serde_json::json;

use crate::cli::config::{get_config_dir, open_session_storage};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum InitCommands {
    #[command(about = "Initialize configuration directory")]
    Config,
}

pub async fn handle(cmd: InitCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    match cmd {
        InitCommands::Config => {
            let config_dir = get_config_dir()?;
            let storage = open_session_storage()?;

            output_success(
                output_format,
                &format!("Configuration directory ready at {}", config_dir.display()),
                Some(json!({
                    "config_dir": config_dir.display().to_string(),
                    "session_file": storage.path().display().to_string(),
                    "api_url": crate::config::config().api.base_url,
                })),
            )
        }
    }
}
