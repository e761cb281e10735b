use anyhow::Result;
use clap::Parser;

use backend_infrastructure::{CONFIG_ENV, EVENTS_PATH_ENV};

#[derive(Parser, Debug)]
#[command(name = "sentinel-backend")]
#[command(about = "Aura Sentinel login anomaly backend", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// JSON-lines event file to tail (overrides events_path)
    #[arg(short, long)]
    events: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = backend_bootstrap::logging::init_tracing()?;

    if let Some(config) = args.config {
        std::env::set_var(CONFIG_ENV, config);
    }
    if let Some(events) = args.events {
        std::env::set_var(EVENTS_PATH_ENV, events);
    }

    backend_bootstrap::run_standalone().await
}
