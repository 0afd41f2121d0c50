// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Remote File Store - port for the versioned file holding the catalog
//!
//! The catalog lives in a single JSON file inside a source-controlled
//! repository. Every read returns the file's current version tag (a content
//! hash); every write must present the tag it last saw, so a concurrent edit
//! surfaces as [`StoreError::VersionConflict`] instead of being overwritten.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content hash identifying one revision of the remote file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(pub String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded file content together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub content: String,
    pub version: VersionTag,
}

/// Read/write access to the remote catalog file.
#[async_trait]
pub trait RemoteFileStore: Send + Sync {
    /// Fetch the decoded file content and its current version tag.
    ///
    /// # Returns
    /// * `Err(StoreError::RemoteUnavailable)` on network failure or a non-2xx response
    async fn fetch_file(&self) -> Result<RemoteFile, StoreError>;

    /// Overwrite the file, guarded by the version tag read earlier.
    ///
    /// # Arguments
    /// * `content` - Full new file content (UTF-8 text)
    /// * `expected` - Version tag the caller last observed
    /// * `message` - Commit message recorded with the change
    ///
    /// # Returns
    /// * `Ok(VersionTag)` - Version tag of the newly written file
    /// * `Err(StoreError::VersionConflict)` if the remote moved on since `expected`
    /// * `Err(StoreError::WritePermissionDenied)` when no write credential is available
    async fn write_file(
        &self,
        content: &str,
        expected: &VersionTag,
        message: &str,
    ) -> Result<VersionTag, StoreError>;

    /// Whether a write credential is configured at all.
    fn can_write(&self) -> bool;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Version conflict: remote file no longer matches {expected}")]
    VersionConflict { expected: String },

    #[error("Write permission denied: {0}")]
    WritePermissionDenied(String),

    #[error("Content encoding error: {0}")]
    Encoding(String),

    #[error("Timeout while communicating with remote store")]
    Timeout,
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::RemoteUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Encoding(err.to_string())
    }
}
