// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Agent Hub CLI
//!
//! The `agent-hub` binary browses and edits the agent catalog kept in a JSON
//! file of a remote repository.
//!
//! ## Commands
//!
//! - `agent-hub list|categories|show` - Browse the catalog
//! - `agent-hub add|update|set-status|move|delete` - Edit the catalog
//! - `agent-hub refresh` - Re-read the remote file
//! - `agent-hub config show|validate|generate` - Configuration management
//!
//! Without a write token every edit is kept in the running process only and
//! reported as local-only.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use agent_hub_cli::commands::{self, AgentCommand, ConfigCommand};
use agent_hub_cli::embedded;

/// Agent Hub - browse and curate the agent catalog
#[derive(Parser)]
#[command(name = "agent-hub")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "AGENT_HUB_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Work against an in-memory copy of the built-in catalog
    #[arg(long, global = true)]
    offline: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AGENT_HUB_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Agent(AgentCommand),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Agent(command)) => {
            let service = embedded::build_service(cli.config, cli.offline)?;
            commands::agent::handle_command(command, &service).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
