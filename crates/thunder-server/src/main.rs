//! `thunderd` entry point.

use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use thunder_server::{bootstrap, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "thunderd", about = "Thunder identity provider server")]
struct Args {
    /// Thunder home directory; declared resources live under
    /// `<home>/repository/resources`
    #[arg(long, env = "THUNDER_HOME", default_value = ".")]
    home: PathBuf,

    /// Configuration file, resolved against the home directory unless
    /// absolute
    #[arg(long, default_value = "repository/conf/deployment.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config_path = if args.config.is_absolute() {
        args.config.clone()
    } else {
        args.home.join(&args.config)
    };

    let config = match ServerConfig::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration load failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = bootstrap::run(config, &args.home).await {
        error!("fatal start-up failure: {e}");
        std::process::exit(1);
    }
}
