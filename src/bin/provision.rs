//! Provision a tenant role and database from a single event payload.
//!
//! Usage: provision [EVENT] [--pretty] [--strict-create-database] [--trusted-identifiers]
//!   EVENT : path to the event JSON, or `-` for stdin (default)
//!
//! Prints the result JSON on stdout; logs go to stderr.

use std::io::Read;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tenant_provisioner::{
    db::PgConnector,
    models::ProvisionRequest,
    services::{IdentifierPolicy, PlanPolicy, Provisioner},
};

#[derive(Parser)]
#[command(name = "provision", about = "Provision a tenant role and database in PostgreSQL")]
struct Args {
    /// Event JSON file, or `-` to read stdin
    #[arg(default_value = "-")]
    event: String,

    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,

    /// Fail when the tenant database already exists
    #[arg(long)]
    strict_create_database: bool,

    /// Interpolate tenant identifiers without validation
    #[arg(long)]
    trusted_identifiers: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut policy = PlanPolicy::from_env()?;
    if args.strict_create_database {
        policy.create_database_required = true;
    }
    if args.trusted_identifiers {
        policy.identifiers = IdentifierPolicy::Trusted;
    }

    let raw = read_event(&args.event)?;
    let request: ProvisionRequest =
        serde_json::from_str(&raw).context("event is not a valid provisioning request")?;

    let result = Provisioner::new(PgConnector, policy).execute(&request).await?;

    let out = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{out}");

    Ok(())
}

fn read_event(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read event from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read event file {path}"))
    }
}
