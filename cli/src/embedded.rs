// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-process catalog wiring
//!
//! Builds the one [`CatalogService`] a CLI invocation works with, backed by
//! either the GitHub contents API or, offline, an in-memory store holding the
//! built-in catalog.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use hub_core::application::cache::SnapshotCache;
use hub_core::domain::config::CatalogConfig;
use hub_core::domain::seed::seed_collection;
use hub_core::infrastructure::{GitHubContentsStore, InMemoryFileStore};
use hub_core::{CatalogService, RemoteFileStore};

pub fn build_service(config_path: Option<PathBuf>, offline: bool) -> Result<Arc<CatalogService>> {
    let config = CatalogConfig::load_or_default(config_path).context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    from_config(&config, offline)
}

pub fn from_config(config: &CatalogConfig, offline: bool) -> Result<Arc<CatalogService>> {
    let store: Arc<dyn RemoteFileStore> = if offline {
        info!("Offline mode: using in-memory catalog");
        Arc::new(
            InMemoryFileStore::with_records(&seed_collection())
                .context("Failed to build in-memory catalog")?,
        )
    } else {
        if !config.has_write_token() {
            warn!("No write token configured, changes will stay local to this process");
        }
        Arc::new(
            GitHubContentsStore::new(&config.remote).context("Failed to create GitHub client")?,
        )
    };

    let cache = Arc::new(SnapshotCache::with_system_clock(config.cache.ttl));
    let service = CatalogService::new(store, cache)
        .with_commit_message(config.remote.commit_message.clone());

    Ok(Arc::new(service))
}
