use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use shipguard_infrastructure::{AppConfig, CONFIG_ENV};

#[derive(Parser, Debug)]
#[command(name = "shipguard")]
#[command(about = "Shipment anomaly detection service", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Analyze a shipment JSON file, or every JSON/CSV file in a directory
    Analyze {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Historical shipments CSV used for cargo value checks
        #[arg(long)]
        historical: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = &args.config {
        std::env::set_var(CONFIG_ENV, config);
    }

    let mut config = AppConfig::load().await?;
    let _log_guard = shipguard_bootstrap::init_logging(config.log_dir.as_deref());
    info!(bind_addr = %config.bind_addr, "configuration loaded");

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => shipguard_bootstrap::run_standalone(config).await,
        Command::Analyze {
            input,
            output,
            historical,
        } => {
            if historical.is_some() {
                config.historical_data_path = historical;
            }
            let text = shipguard_bootstrap::run_analyze(config, &input, &output).await?;
            print!("{}", text);
            Ok(())
        }
    }
}
