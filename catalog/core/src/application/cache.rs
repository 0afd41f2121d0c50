// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Snapshot cache
//!
//! Holds the last known collection with the time it was stored and the
//! version tag it was read at. A snapshot is fresh while less than the TTL
//! has elapsed since it was stored. Time comes from a [`Clock`] so tests can
//! move it by hand.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use crate::domain::agent::AgentRecord;
use crate::domain::store::VersionTag;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        if let Some(next) = chrono::Duration::from_std(by)
            .ok()
            .and_then(|by| now.checked_add_signed(by))
        {
            *now = next;
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Last known state of the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot {
    pub records: Vec<AgentRecord>,
    /// `None` when the snapshot did not come from the remote (seed fallback).
    pub version: Option<VersionTag>,
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Entry {
    records: Vec<AgentRecord>,
    version: Option<VersionTag>,
    stored_at: DateTime<Utc>,
}

pub struct SnapshotCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: RwLock<Option<Entry>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entry: RwLock::new(None),
        }
    }

    pub fn with_system_clock(ttl: Duration) -> Self {
        Self::new(ttl, Arc::new(SystemClock))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh snapshot, or `None` if empty or expired.
    pub fn get(&self) -> Option<CollectionSnapshot> {
        let now = self.clock.now();
        let entry = self.entry.read();
        entry
            .as_ref()
            .filter(|e| self.is_within_ttl(e.stored_at, now))
            .map(|e| CollectionSnapshot {
                records: e.records.clone(),
                version: e.version.clone(),
                stored_at: e.stored_at,
            })
    }

    /// Store a snapshot stamped with the current time.
    pub fn put(&self, records: Vec<AgentRecord>, version: Option<VersionTag>) {
        let stored_at = self.clock.now();
        *self.entry.write() = Some(Entry {
            records,
            version,
            stored_at,
        });
    }

    /// Replace the cached records without touching the timestamp or version.
    ///
    /// Used for local-only changes: the records reflect the session's view, but
    /// the remote is still at the old version and the window must not extend.
    pub fn overwrite_records(&self, records: Vec<AgentRecord>) {
        let mut entry = self.entry.write();
        match entry.as_mut() {
            Some(existing) => existing.records = records,
            None => {
                *entry = Some(Entry {
                    records,
                    version: None,
                    stored_at: DateTime::<Utc>::UNIX_EPOCH,
                })
            }
        }
    }

    /// Drop the snapshot so the next read goes to the remote.
    pub fn invalidate(&self) {
        *self.entry.write() = None;
    }

    pub fn is_fresh(&self) -> bool {
        let now = self.clock.now();
        self.entry
            .read()
            .as_ref()
            .is_some_and(|e| self.is_within_ttl(e.stored_at, now))
    }

    fn is_within_ttl(&self, stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match (now - stored_at).to_std() {
            Ok(age) => age < self.ttl,
            // stored_at in the future: clock went backwards, treat as fresh
            Err(_) => true,
        }
    }
}
