// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Write status reporting
//!
//! Every mutation applies locally first and then attempts a remote write.
//! The outcome of that attempt is published as a [`WriteReport`] on the
//! catalog's [`CatalogView`] so the presentation layer can show it.

use std::fmt;

use serde::Serialize;

use crate::domain::agent::AgentRecord;

pub const NOTICE_LOCAL_ONLY: &str =
    "Changes are kept in this session only. No write token is configured for the remote repository.";
pub const ERROR_CONFLICT: &str =
    "The data was changed elsewhere. Refresh to load the latest version before editing again.";
pub const ERROR_FAILED: &str = "Saving to the remote repository failed.";
pub const NOTICE_FALLBACK: &str =
    "The remote catalog could not be loaded. Showing the built-in sample catalog.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteState {
    /// Applied locally, remote write in flight
    Pending,
    /// Remote accepted the write
    Confirmed,
    /// No write credential; the change lives in this session only
    LocalOnly,
    /// Remote moved on since it was last read
    Conflicted,
    /// Network or remote error
    Failed,
}

impl fmt::Display for WriteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WriteState::Pending => "pending",
            WriteState::Confirmed => "confirmed",
            WriteState::LocalOnly => "local-only",
            WriteState::Conflicted => "conflicted",
            WriteState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Outcome of one write attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    /// Monotonic per service instance
    pub attempt: u64,
    pub state: WriteState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl WriteReport {
    pub fn pending(attempt: u64) -> Self {
        Self {
            attempt,
            state: WriteState::Pending,
            detail: None,
        }
    }
}

/// Everything the presentation layer needs, published on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogView {
    pub records: Vec<AgentRecord>,
    pub loading: bool,
    pub saving: bool,
    pub last_write: Option<WriteReport>,
    pub error: Option<String>,
    pub notice: Option<String>,
}
