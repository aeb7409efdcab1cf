use clap::Parser;
use tracing_subscriber::EnvFilter;
use vet_session::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so VET_API_URL, VET_CONFIG_DIR, etc. are picked up
    let _ = dotenvy::dotenv();

    let config = vet_session::config::config();

    // Logs go to stderr so --json output on stdout stays parseable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting vet CLI in {:?} mode against {}", config.environment, config.api.base_url);

    let cli = Cli::parse();

    if let Err(e) = vet_session::cli::run(cli).await {
        // run() already reported the error; verbose mode adds the full chain
        if let Ok("true") | Ok("1") = std::env::var("CLI_VERBOSE").as_deref() {
            eprintln!("Error: {e:?}");
        }
        std::process::exit(1);
    }

    Ok(())
}
