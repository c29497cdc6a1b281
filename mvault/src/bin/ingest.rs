//! Replay a tab-delimited membership export into the Membership Vault.

use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::{ArgAction, Parser};
use mvault::{
    FailurePolicy, IngestOptions, VaultClient, VaultConfig,
    ingest::{self, DEFAULT_TIMEZONE},
    tracing_config::{TracingConfig, init_tracing},
};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "mvault-ingest", version, about = "Upsert members from a tab-delimited export")]
struct Cli {
    /// Member export file (tab-delimited, one header row)
    file: PathBuf,

    /// Time zone export dates are local to
    #[arg(long, env = "MVAULT_TIMEZONE", value_parser = parse_timezone, default_value_t = DEFAULT_TIMEZONE)]
    timezone: Tz,

    /// Record failing rows and continue instead of stopping at the first one
    #[arg(long)]
    keep_going: bool,

    /// Log more detail; repeat for trace output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn parse_timezone(s: &str) -> Result<Tz, String> {
    s.parse::<Tz>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&TracingConfig::new(cli.verbose, cli.json_logs));

    let config = VaultConfig::from_env().context("loading Vault configuration")?;
    let vault = VaultClient::new(config)?;

    let policy = if cli.keep_going {
        FailurePolicy::Continue
    } else {
        FailurePolicy::Abort
    };
    let options = IngestOptions::default()
        .with_timezone(cli.timezone)
        .with_policy(policy);

    info!(
        file = %cli.file.display(),
        callsign = %vault.config().callsign,
        timezone = %cli.timezone,
        "Starting ingest"
    );
    let report = ingest::ingest_file(&vault, &cli.file, &options).await?;

    println!(
        "{} rows: {} upserted, {} rejected, {} failed",
        report.rows.len(),
        report.upserted(),
        report.rejected(),
        report.failed()
    );

    if !report.is_clean() {
        anyhow::bail!("some rows were not upserted");
    }
    Ok(())
}
