//! tagsweep: multi-environment AWS tag inventory
//!
//! Reads one credential file per environment, fetches every taggable
//! resource via the Resource Groups Tagging API, and writes CSV reports:
//! full and focus-filtered, per environment and aggregated.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tagsweep::{config::Config, orchestrator};

#[derive(Parser, Debug)]
#[command(name = "tagsweep")]
#[command(about = "AWS tag inventory and CSV reporting across environments")]
#[command(version)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config)?;
    config.validate()?;

    orchestrator::run(&config).await
}
