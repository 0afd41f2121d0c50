// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration commands
//!
//! `show` prints the effective remote and cache settings, `validate` checks a
//! file, `generate` writes a starter file from the bundled templates.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use hub_core::domain::config::{CatalogConfig, CONFIG_PATH_ENV, FALLBACK_TOKEN_ENV, TOKEN_ENV};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective configuration as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Write a starter configuration file
    Generate {
        #[arg(short, long, default_value = "./agent-hub.yaml")]
        output: PathBuf,

        /// Use the annotated template with every option spelled out
        #[arg(long)]
        examples: bool,

        /// Overwrite the output file if it already exists
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate {
            output,
            examples,
            force,
        } => generate(output, examples, force).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = CatalogConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. {}: {}",
            CONFIG_PATH_ENV,
            std::env::var(CONFIG_PATH_ENV)
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./agent-hub.yaml");
        println!("  4. ~/.agent-hub/config.yaml");
        println!("  5. /etc/agent-hub/config.yaml");
        println!();
    }

    if as_yaml {
        print!("{}", config.to_yaml_string()?);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Remote:".bold());
    println!("  API: {}", config.remote.api_base);
    println!("  Repository: {}/{}", config.remote.owner, config.remote.repo);
    println!("  Path: {}", config.remote.path);
    println!(
        "  Branch: {}",
        config.remote.branch.as_deref().unwrap_or("(repository default)")
    );
    println!("  Timeout: {:?}", config.remote.timeout);
    if config.has_write_token() {
        println!("  Write token: {}", "set".green());
    } else {
        println!(
            "  Write token: {} (set {} or {}; edits stay local until then)",
            "not set".yellow(),
            TOKEN_ENV,
            FALLBACK_TOKEN_ENV
        );
    }
    println!();

    println!("{}", "Cache:".bold());
    println!("  TTL: {:?}", config.cache.ttl);
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = CatalogConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn sample_config(with_examples: bool) -> &'static str {
    if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    }
}

async fn generate(output: PathBuf, with_examples: bool, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite it",
            output.display()
        );
    }

    std::fs::write(&output, sample_config(with_examples))
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{}", format!("✓ Wrote {}", output.display()).green());
    if !with_examples {
        println!("  Run with --examples for the annotated template");
    }

    Ok(())
}
