//! eligcheck - command-line front-end for member eligibility lookups.
//!
//! Generates and caches an OAuth token, then runs eligibility searches,
//! provider network status checks and copay lookups against the API.

mod commands;
mod output;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use eligcheck_core::{ApiError, Config};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{credentials, lookup, token};

// ============================================================================
// CLI Structure
// ============================================================================

/// Member eligibility, network status and copay lookups
#[derive(Parser, Debug)]
#[command(name = "eligcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Keep a separate token file for this operator
    #[arg(long, global = true, env = "ELIGCHECK_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate, inspect, set or clear the OAuth token
    Token(token::TokenArgs),

    /// Search member eligibility
    Eligibility(lookup::EligibilityArgs),

    /// Check provider network status for a member
    NetworkStatus(lookup::NetworkStatusArgs),

    /// Get copay and coinsurance details
    Copay(lookup::CopayArgs),

    /// Manage the client secret in the OS keychain
    Credentials(credentials::CredentialsArgs),
}

/// Initialize the tracing subscriber for logging.
///
/// Console output honours `RUST_LOG` (default `warn`); `--verbose` raises the
/// workspace crates to `debug`. When a log directory is configured, a daily
/// rolling JSON log is written there as well.
fn init_tracing(verbose: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let console_filter = if verbose {
        EnvFilter::new("eligcheck=debug,eligcheck_core=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "eligcheck.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new("eligcheck=debug,eligcheck_core=debug,info"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_filter(console_filter),
        )
        .with(file_layer)
        .init();

    guard
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let ctx = commands::Context {
        config,
        profile: cli.profile,
        json_output: cli.json,
    };

    match cli.command {
        Commands::Token(args) => token::run(args, &ctx).await,
        Commands::Eligibility(args) => lookup::run_eligibility(args, &ctx).await,
        Commands::NetworkStatus(args) => lookup::run_network_status(args, &ctx).await,
        Commands::Copay(args) => lookup::run_copay(args, &ctx).await,
        Commands::Credentials(args) => credentials::run(args, &ctx),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    let _guard = init_tracing(cli.verbose, config.log_dir.as_deref());
    info!("eligcheck starting");

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // API failures were already reported with their status and payload
            if e.downcast_ref::<ApiError>().is_none() {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}
