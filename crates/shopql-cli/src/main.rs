//! Shopql CLI
//!
//! Issue, inspect and check shop tokens against a local configuration.

#![forbid(unsafe_code)]

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{CliConfig, DEFAULT_CONFIG_FILE};

/// Shopql CLI - bearer tokens for a legacy shop
#[derive(Parser, Debug)]
#[command(name = "shopql")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "SHOPQL_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print a token
    Login {
        /// Login name
        #[arg(short, long)]
        username: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Print a token's header and claims without verifying it
    Inspect {
        /// Compact token
        token: String,
    },
    /// Validate a token against the configured shop
    Check {
        /// Compact token
        token: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Login { username, password } => {
            let config = CliConfig::load(&args.config)?;
            let auth = commands::build_service(&config)?;
            println!("{}", commands::login(&auth, &username, &password)?);
        }
        Command::Inspect { token } => {
            let value = commands::inspect(&token)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Check { token } => {
            let config = CliConfig::load(&args.config)?;
            let auth = commands::build_service(&config)?;
            let report = commands::check(&auth, &token)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
