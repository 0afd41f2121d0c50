// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Agent Hub core
//!
//! Keeps the agent catalog in sync with a JSON file held in a remote
//! source-controlled repository.
//!
//! # Architecture
//!
//! - **Domain:** records, schema migration, the remote store port
//! - **Application:** snapshot cache and the synchronization facade
//! - **Infrastructure:** GitHub contents client, in-memory store, codecs

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
pub use application::{CatalogService, CatalogView, WriteReport, WriteState};
