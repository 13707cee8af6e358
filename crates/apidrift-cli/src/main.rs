//! # apidrift CLI entry point
//!
//! Parses command-line arguments, loads the OpenAPI document, and runs one
//! sequential validation pass over the endpoint catalog.
//!
//! Exit status reflects operational health only: 0 on completion no matter
//! how many issues were found, 1 when the spec document cannot be loaded
//! or a report cannot be written.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use apidrift_cli::{report, run};
use apidrift_client::{catalog, ApiClient};
use apidrift_schema::SchemaIndex;

/// Contract-drift detector for the game server HTTP API.
///
/// Fetches every cataloged endpoint from a running server, compares each
/// JSON payload against the OpenAPI schemas, and writes Markdown and JSON
/// discrepancy reports.
#[derive(Parser, Debug)]
#[command(name = "apidrift", version, about, long_about = None)]
struct Cli {
    /// API host to probe.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// API port to probe.
    #[arg(long, default_value_t = 9877)]
    port: u16,

    /// Path to the OpenAPI document. Defaults to the nearest openapi.yaml
    /// found walking up from the current directory.
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Directory for the generated reports. Defaults to docs/ next to the
    /// OpenAPI document.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run_validation(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run_validation(cli: Cli) -> anyhow::Result<()> {
    let spec_path = match cli.spec {
        Some(path) => path,
        None => resolve_spec_path()
            .context("could not locate openapi.yaml in this or any parent directory; pass --spec")?,
    };

    println!("Loading spec from: {}", spec_path.display());
    let index = SchemaIndex::from_path(&spec_path)
        .with_context(|| format!("failed to load OpenAPI document {}", spec_path.display()))?;
    tracing::debug!(schemas = index.len(), "loaded schema index");

    let base_display = format!("http://{}:{}", cli.host, cli.port);
    let base_url: Url = base_display
        .parse()
        .with_context(|| format!("invalid server address {base_display}"))?;
    let client = ApiClient::new(base_url).context("failed to build HTTP client")?;

    println!("Testing against: {base_display}");
    println!();

    let endpoints = catalog();
    let outcome = run::execute(&client, &index, &endpoints).await;

    let output_dir = cli.output_dir.unwrap_or_else(|| {
        spec_path
            .parent()
            .unwrap_or(Path::new("."))
            .join("docs")
    });
    let (markdown_path, json_path) =
        report::write_reports(&outcome, &output_dir).context("failed to write reports")?;

    println!("Markdown report: {}", markdown_path.display());
    println!("JSON report: {}", json_path.display());

    Ok(())
}

/// Walk up from the current directory to the first one containing an
/// `openapi.yaml`.
fn resolve_spec_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut dir = cwd.as_path();
    loop {
        let candidate = dir.join("openapi.yaml");
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}
