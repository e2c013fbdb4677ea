//! Packetsim Server Binary
//!
//! A synthetic backend worker that burns CPU and memory per request so a
//! load balancer can be exercised against realistic, measurable load.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use packetsim_config::{ConfigLoader, LogLevel, PacketsimConfig};
use packetsim_logging::init_logging_from_config;
use packetsim_server::Server;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (YAML, or JSON by extension)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Start with the admission gate closed
    #[arg(long)]
    closed: bool,

    /// Print default configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", PacketsimConfig::generate_sample());
        return Ok(());
    }

    let mut config = ConfigLoader::new().load(cli.config.as_ref())?;
    apply_cli_overrides(&mut config, &cli)?;
    config.validate_all()?;

    init_logging_from_config(&config.logging)?;

    let server = Server::new(config)?;
    server.start().await
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(config: &mut PacketsimConfig, cli: &Cli) -> Result<()> {
    if let Some(bind) = &cli.bind {
        config.server.bind_address = bind.clone();
    }

    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if let Some(level) = &cli.log_level {
        config.logging.level = level
            .parse::<LogLevel>()
            .map_err(|e| anyhow!("Invalid --log-level: {}", e))?;
    }

    if cli.closed {
        config.gate.start_open = false;
    }

    Ok(())
}
