// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Versioned in-memory file store
//!
//! Behaves like the remote contents API without the network: every write
//! must present the current version tag, tags are content hashes, and the
//! store can be switched read-only or unavailable. Used by tests and by the
//! CLI's offline mode.

use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::domain::agent::AgentRecord;
use crate::domain::store::{RemoteFile, RemoteFileStore, StoreError, VersionTag};

#[derive(Debug)]
struct FileState {
    content: String,
    version: VersionTag,
    available: bool,
    writable: bool,
    fetches: usize,
    writes: usize,
    last_message: Option<String>,
}

#[derive(Debug)]
pub struct InMemoryFileStore {
    state: Mutex<FileState>,
}

impl InMemoryFileStore {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            state: Mutex::new(FileState {
                version: version_of(&content),
                content,
                available: true,
                writable: true,
                fetches: 0,
                writes: 0,
                last_message: None,
            }),
        }
    }

    /// Store holding `records` serialized the way the catalog writes them.
    pub fn with_records(records: &[AgentRecord]) -> Result<Self, StoreError> {
        Ok(Self::new(serde_json::to_string_pretty(records)?))
    }

    /// Reject writes the way a store without credentials does.
    pub fn read_only(self) -> Self {
        self.state.lock().writable = false;
        self
    }

    pub fn set_available(&self, available: bool) {
        self.state.lock().available = available;
    }

    /// Replace the content out of band, as another session editing the file would.
    pub fn replace_content(&self, content: impl Into<String>) -> VersionTag {
        let mut state = self.state.lock();
        state.content = content.into();
        state.version = version_of(&state.content);
        state.version.clone()
    }

    pub fn content(&self) -> String {
        self.state.lock().content.clone()
    }

    pub fn version(&self) -> VersionTag {
        self.state.lock().version.clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.state.lock().fetches
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().writes
    }

    pub fn last_commit_message(&self) -> Option<String> {
        self.state.lock().last_message.clone()
    }
}

fn version_of(content: &str) -> VersionTag {
    VersionTag::new(hex::encode(Sha256::digest(content.as_bytes())))
}

#[async_trait]
impl RemoteFileStore for InMemoryFileStore {
    async fn fetch_file(&self) -> Result<RemoteFile, StoreError> {
        let mut state = self.state.lock();
        if !state.available {
            return Err(StoreError::RemoteUnavailable("in-memory store offline".to_string()));
        }
        state.fetches += 1;
        Ok(RemoteFile {
            content: state.content.clone(),
            version: state.version.clone(),
        })
    }

    async fn write_file(
        &self,
        content: &str,
        expected: &VersionTag,
        message: &str,
    ) -> Result<VersionTag, StoreError> {
        let mut state = self.state.lock();
        if !state.writable {
            return Err(StoreError::WritePermissionDenied(
                "store is read-only".to_string(),
            ));
        }
        if !state.available {
            return Err(StoreError::RemoteUnavailable("in-memory store offline".to_string()));
        }
        if &state.version != expected {
            return Err(StoreError::VersionConflict {
                expected: expected.to_string(),
            });
        }

        state.content = content.to_string();
        state.version = version_of(content);
        state.writes += 1;
        state.last_message = Some(message.to_string());
        Ok(state.version.clone())
    }

    fn can_write(&self) -> bool {
        self.state.lock().writable
    }
}
