//! Inspect a station's records in the Membership Vault.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use mvault::{
    VaultClient, VaultConfig, inspect,
    tracing_config::{TracingConfig, init_tracing},
};
use tracing::debug;

#[derive(Debug, Parser)]
#[command(name = "mvault", version, about = "Inspect members in the Membership Vault")]
struct Cli {
    /// List members in the Membership Vault
    #[arg(short, long)]
    list: bool,

    /// Fetch a member by membership ID
    #[arg(short, long, value_name = "ID")]
    member: Option<String>,

    /// Log more detail; repeat for trace output
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&TracingConfig::new(cli.verbose, cli.json_logs));

    let config = VaultConfig::from_env().context("loading Vault configuration")?;
    let vault = VaultClient::new(config)?;
    debug!(
        callsign = %vault.config().callsign,
        endpoint = %vault.config().base_endpoint,
        "Vault client ready"
    );

    let mut out = std::io::stdout().lock();

    if cli.list {
        inspect::list_members(&vault, &mut out).await?;
    }

    if let Some(membership_id) = cli.member.as_deref() {
        inspect::show_member(&vault, membership_id, &mut out).await?;
    }

    Ok(())
}
