use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::config::open_session;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ApiCommands {
    #[command(about = "GET an API path using the current session")]
    Get {
        #[arg(help = "API path, e.g. /api/mascotas")]
        path: String,
    },
}

pub async fn handle(cmd: ApiCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let store = open_session().await?;

    match cmd {
        ApiCommands::Get { path } => {
            if !store.is_authenticated().await {
                tracing::warn!("No active session, sending {} without credentials", path);
            }

            let response = store.client().get(&path).await?;
            let status = response.status();
            let body = response.text().await?;

            let parsed = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body.clone()));
            output_value(
                output_format,
                json!({ "status": status.as_u16(), "body": parsed }),
                &[body],
            )?;

            if !status.is_success() {
                anyhow::bail!("Request to {} failed with status {}", path, status);
            }
            Ok(())
        }
    }
}
