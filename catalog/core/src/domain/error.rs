// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

use crate::domain::agent::AgentId;

/// Errors the catalog facade hands back to its callers.
///
/// Remote failures never show up here: reads fall back to the seed collection
/// and writes report through [`crate::application::WriteState`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Agent not found: {0}")]
    NotFound(AgentId),

    #[error("Invalid agent record: {0}")]
    InvalidRecord(String),
}
