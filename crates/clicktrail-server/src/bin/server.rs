//! Clicktrail collection server binary

use anyhow::{bail, Result};
use clap::Parser;
use clicktrail_server::config::{load_config, validate_config};
use clicktrail_server::Server;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "clicktrail-server", version, about = "Collects Clicktrail audit records")]
struct Args {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, env = "CLICKTRAIL_CONFIG")]
    config: Option<String>,

    /// Override the bind host.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    clicktrail_common_log::init_from_env()?;

    let args = Args::parse();
    let mut config = load_config(args.config)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    if let Err(errors) = validate_config(&config) {
        for err in &errors {
            error!(error = %err, "invalid configuration");
        }
        bail!("configuration has {} error(s)", errors.len());
    }

    info!("Starting Clicktrail server v{}", env!("CARGO_PKG_VERSION"));

    Server::new(config).run().await?;

    info!("Server shutdown complete");
    Ok(())
}
