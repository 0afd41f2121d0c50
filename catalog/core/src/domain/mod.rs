// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: catalog records and the contracts the rest of the crate builds on.

pub mod agent;
pub mod config;
pub mod error;
pub mod migration;
pub mod seed;
pub mod store;

pub use agent::*;
pub use error::CatalogError;
pub use migration::{migrate, MigrationReport, MigrationWarning};
pub use store::{RemoteFile, RemoteFileStore, StoreError, VersionTag};
