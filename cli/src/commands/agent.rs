// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Catalog commands
//!
//! Commands: list, categories, show, add, update, set-status, move, delete, refresh

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use hub_core::{
    AgentForm, AgentId, AgentPatch, AgentRecord, AgentStatus, CatalogService, WriteState,
};

#[derive(Subcommand, Debug)]
pub enum AgentCommand {
    /// List catalog entries
    List {
        /// Only entries in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List categories in catalog order
    Categories,

    /// Show one entry
    Show {
        #[arg(value_name = "AGENT_ID")]
        id: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Add an entry
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        category: String,

        /// applied, under-review or review-complete
        #[arg(long, default_value = "under-review")]
        status: AgentStatus,

        /// Page end users open
        #[arg(long = "user-url", value_name = "URL")]
        user_page_url: String,

        /// Admin console page
        #[arg(long = "admin-url", value_name = "URL")]
        admin_page_url: Option<String>,
    },

    /// Change fields of an entry
    Update {
        #[arg(value_name = "AGENT_ID")]
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        status: Option<AgentStatus>,

        #[arg(long = "user-url", value_name = "URL")]
        user_page_url: Option<String>,

        #[arg(long = "admin-url", value_name = "URL", conflicts_with = "clear_admin_url")]
        admin_page_url: Option<String>,

        /// Remove the admin page link
        #[arg(long)]
        clear_admin_url: bool,
    },

    /// Set the review status of an entry
    SetStatus {
        #[arg(value_name = "AGENT_ID")]
        id: String,

        #[arg(value_name = "STATUS")]
        status: AgentStatus,
    },

    /// Move an entry to a position (0-based)
    Move {
        #[arg(value_name = "AGENT_ID")]
        id: String,

        #[arg(value_name = "INDEX")]
        index: usize,
    },

    /// Delete an entry
    Delete {
        #[arg(value_name = "AGENT_ID")]
        id: String,
    },

    /// Discard the cached copy and read the remote file again
    Refresh,
}

pub async fn handle_command(command: AgentCommand, service: &CatalogService) -> Result<()> {
    match command {
        AgentCommand::List { category, json } => list(service, category.as_deref(), json).await,
        AgentCommand::Categories => categories(service).await,
        AgentCommand::Show { id, json } => show(service, AgentId::new(id), json).await,
        AgentCommand::Add {
            name,
            description,
            category,
            status,
            user_page_url,
            admin_page_url,
        } => {
            let form = AgentForm {
                name,
                description,
                category,
                status,
                user_page_url,
                admin_page_url,
            };
            add(service, form).await
        }
        AgentCommand::Update {
            id,
            name,
            description,
            category,
            status,
            user_page_url,
            admin_page_url,
            clear_admin_url,
        } => {
            let patch = AgentPatch {
                name,
                description,
                category,
                status,
                user_page_url,
                admin_page_url: if clear_admin_url {
                    Some(None)
                } else {
                    admin_page_url.map(Some)
                },
            };
            update(service, AgentId::new(id), patch).await
        }
        AgentCommand::SetStatus { id, status } => {
            let id = AgentId::new(id);
            service
                .set_status(&id, status)
                .await
                .with_context(|| format!("Failed to set status of {}", id))?;
            print_write_outcome(service, &format!("Status of {} set to {}", id, status));
            Ok(())
        }
        AgentCommand::Move { id, index } => {
            let id = AgentId::new(id);
            service
                .move_to(&id, index)
                .await
                .with_context(|| format!("Failed to move {}", id))?;
            print_write_outcome(service, &format!("Moved {} to position {}", id, index));
            Ok(())
        }
        AgentCommand::Delete { id } => delete(service, AgentId::new(id)).await,
        AgentCommand::Refresh => {
            let records = service.refresh().await;
            println!("{}", format!("✓ Reloaded {} entries", records.len()).green());
            print_banners(service);
            Ok(())
        }
    }
}

async fn list(service: &CatalogService, category: Option<&str>, json: bool) -> Result<()> {
    service.get_all().await;
    let records = service.by_category(category);

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    print_banners(service);

    if records.is_empty() {
        println!("{}", "No entries found".yellow());
        return Ok(());
    }

    println!("{} entries:", records.len());
    println!("{:<16} {:<24} {:<16} {:<16} {}", "ID", "NAME", "CATEGORY", "STATUS", "USER PAGE");
    for record in &records {
        println!(
            "{:<16} {:<24} {:<16} {:<16} {}",
            record.id,
            record.name.bold(),
            record.category,
            colored_status(record.status),
            record.user_page_url
        );
    }

    Ok(())
}

async fn categories(service: &CatalogService) -> Result<()> {
    service.get_all().await;
    for category in service.categories() {
        let count = service.by_category(Some(&category)).len();
        println!("{} ({})", category.bold(), count);
    }
    Ok(())
}

async fn show(service: &CatalogService, id: AgentId, json: bool) -> Result<()> {
    service.get_all().await;
    let record = service
        .find(&id)
        .with_context(|| format!("Agent '{}' not found", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record(&record);
    }
    Ok(())
}

async fn add(service: &CatalogService, form: AgentForm) -> Result<()> {
    let record = service.add(form).await.context("Failed to add entry")?;
    print_write_outcome(service, &format!("Added {} ({})", record.name, record.id));
    Ok(())
}

async fn update(service: &CatalogService, id: AgentId, patch: AgentPatch) -> Result<()> {
    if patch.is_empty() {
        anyhow::bail!("Nothing to update: pass at least one field option");
    }
    service
        .update(&id, patch)
        .await
        .with_context(|| format!("Failed to update {}", id))?;
    print_write_outcome(service, &format!("Updated {}", id));
    Ok(())
}

async fn delete(service: &CatalogService, id: AgentId) -> Result<()> {
    if service.delete(&id).await {
        print_write_outcome(service, &format!("Deleted {}", id));
    } else {
        println!("{}", format!("Agent '{}' not found, nothing deleted", id).yellow());
    }
    Ok(())
}

fn print_record(record: &AgentRecord) {
    println!("{}", record.name.bold());
    println!("  ID: {}", record.id);
    println!("  Category: {}", record.category);
    println!("  Status: {}", colored_status(record.status));
    if !record.description.is_empty() {
        println!("  Description: {}", record.description);
    }
    println!("  User page: {}", record.user_page_url);
    if let Some(admin) = &record.admin_page_url {
        println!("  Admin page: {}", admin);
    }
}

fn colored_status(status: AgentStatus) -> colored::ColoredString {
    match status {
        AgentStatus::Applied => status.as_str().green(),
        AgentStatus::UnderReview => status.as_str().yellow(),
        AgentStatus::ReviewComplete => status.as_str().cyan(),
    }
}

/// Summarize how the last write ended.
fn print_write_outcome(service: &CatalogService, action: &str) {
    match service.write_status().map(|r| r.state) {
        Some(WriteState::Confirmed) => {
            println!("{}", format!("✓ {} (saved to remote)", action).green())
        }
        Some(WriteState::LocalOnly) => {
            println!("{}", format!("⚠ {} (local only)", action).yellow())
        }
        Some(WriteState::Conflicted) | Some(WriteState::Failed) => {
            println!("{}", format!("✗ {} (not saved)", action).red())
        }
        Some(WriteState::Pending) | None => println!("{}", action),
    }
    print_banners(service);
}

fn print_banners(service: &CatalogService) {
    if let Some(notice) = service.notice() {
        println!("{}", notice.dimmed());
    }
    if let Some(error) = service.error() {
        eprintln!("{}", error.red());
    }
}
