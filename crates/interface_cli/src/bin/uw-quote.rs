//! Underwriting Engine - Batch Quote Binary
//!
//! Evaluates a batch of requests against a snapshot file and prints the
//! quote results as a JSON array.
//!
//! # Usage
//!
//! ```bash
//! uw-quote --snapshot snapshot.json --requests requests.json
//!
//! # Best offer first
//! uw-quote --snapshot snapshot.json --requests requests.json --rank
//!
//! # Reject snapshots with invalid rule sets
//! uw-quote --snapshot snapshot.json --requests requests.json --strict
//!
//! # Interpolated premiums
//! UW_ENGINE__LOOKUP_MODE=bilinear uw-quote --snapshot snapshot.json --requests requests.json
//! ```
//!
//! # Environment Variables
//!
//! * `UW_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `UW_LOG_JSON` - Emit logs as JSON lines (default: false)
//! * `UW_ENGINE__FLAT_EXTRA_COMPOSITION` - sum, max or worst_only (default: sum)
//! * `UW_ENGINE__LOOKUP_MODE` - exact or bilinear (default: exact)
//! * `UW_ENGINE__DEFAULT_VARIANT` - Rule set variant when a request names none

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use domain_quoting::QuoteService;
use infra_snapshot::JsonFileSnapshot;
use interface_cli::{read_requests, render, CliConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Quote applicants against an underwriting snapshot
#[derive(Parser)]
#[command(name = "uw-quote", version, about = "Quote applicants against an underwriting snapshot")]
struct Cli {
    /// Snapshot document with rule sets and premium rows
    #[arg(long)]
    snapshot: PathBuf,

    /// Request document: one request or an array of them
    #[arg(long)]
    requests: PathBuf,

    /// Order results best offer first
    #[arg(long)]
    rank: bool,

    /// Refuse to quote when any rule set fails validation
    #[arg(long)]
    strict: bool,

    /// Configuration file (json, toml or yaml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref()).context("invalid configuration")?;

    init_tracing(&config.log_level, config.log_json);

    let requests = read_requests(&cli.requests).await?;
    tracing::info!(
        snapshot = %cli.snapshot.display(),
        requests = requests.len(),
        "Starting batch quote"
    );

    let port = JsonFileSnapshot::new(&cli.snapshot);
    if cli.strict {
        port.read().await?.ensure_valid()?;
    }

    let service = QuoteService::new(Arc::new(port), config.engine);
    let results = service
        .quote_portfolio(requests)
        .await
        .context("cannot load snapshot")?;

    let output = render(results, cli.rank)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Initializes the tracing subscriber
///
/// Logs go to stderr so stdout carries only the JSON results.
fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
