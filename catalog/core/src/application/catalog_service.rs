// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Catalog Service
//!
//! The single entry point for collaborators that read or edit the catalog.
//!
//! Reads go cache first, then the remote file (migrated on the way in), then
//! the built-in seed if the remote cannot be read. Mutations change the
//! working collection and publish it before the remote write starts; the
//! outcome of the write is reported separately on the [`CatalogView`].
//!
//! One instance is meant to be constructed per process and shared by
//! reference (`Arc<CatalogService>`).

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::application::cache::SnapshotCache;
use crate::application::write_status::{
    CatalogView, WriteReport, WriteState, ERROR_CONFLICT, ERROR_FAILED, NOTICE_FALLBACK,
    NOTICE_LOCAL_ONLY,
};
use crate::domain::agent::{AgentForm, AgentId, AgentPatch, AgentRecord, AgentStatus};
use crate::domain::error::CatalogError;
use crate::domain::migration::{migrate_document, MigrationWarning};
use crate::domain::seed::seed_collection;
use crate::domain::store::{RemoteFileStore, StoreError, VersionTag};
use crate::infrastructure::id_generator::IdGenerator;

const DEFAULT_COMMIT_MESSAGE: &str = "Update agents data";

#[derive(Debug, Default)]
struct Working {
    records: Vec<AgentRecord>,
    /// Version tag the records were last read or written at
    version: Option<VersionTag>,
    loaded: bool,
    loading: usize,
    in_flight: usize,
    next_attempt: u64,
    last_write: Option<WriteReport>,
    error: Option<String>,
    notice: Option<String>,
    warnings: Vec<MigrationWarning>,
}

/// Everything a remote write needs, captured under the lock.
struct PendingWrite {
    attempt: u64,
    records: Vec<AgentRecord>,
    expected: Option<VersionTag>,
}

pub struct CatalogService {
    store: Arc<dyn RemoteFileStore>,
    cache: Arc<SnapshotCache>,
    ids: IdGenerator,
    commit_message: String,
    working: Mutex<Working>,
    view: watch::Sender<CatalogView>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RemoteFileStore>, cache: Arc<SnapshotCache>) -> Self {
        let (view, _) = watch::channel(CatalogView::default());
        Self {
            store,
            cache,
            ids: IdGenerator::new(),
            commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
            working: Mutex::new(Working::default()),
            view,
        }
    }

    pub fn with_commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Current collection. Never fails: a remote that cannot be read yields
    /// the seed collection.
    pub async fn get_all(&self) -> Vec<AgentRecord> {
        if let Some(snapshot) = self.cache.get() {
            debug!(records = snapshot.records.len(), "Serving catalog from cache");
            let mut w = self.working.lock();
            w.records = snapshot.records;
            w.version = snapshot.version;
            w.loaded = true;
            self.publish(&w);
            return w.records.clone();
        }

        self.load_from_remote().await
    }

    /// Drop the cached snapshot and read the remote file again.
    pub async fn refresh(&self) -> Vec<AgentRecord> {
        self.cache.invalidate();
        self.load_from_remote().await
    }

    async fn load_from_remote(&self) -> Vec<AgentRecord> {
        {
            let mut w = self.working.lock();
            w.loading += 1;
            self.publish(&w);
        }

        let fetched = match self.store.fetch_file().await {
            Ok(file) => migrate_document(&file.content)
                .map(|report| (report, file.version))
                .map_err(StoreError::from),
            Err(e) => Err(e),
        };

        let mut w = self.working.lock();
        w.loading = w.loading.saturating_sub(1);

        match fetched {
            Ok((report, version)) => {
                for warning in &report.warnings {
                    warn!(%warning, "Coerced malformed catalog record");
                }
                info!(
                    records = report.records.len(),
                    version = %version,
                    "Loaded catalog from remote store"
                );
                self.cache.put(report.records.clone(), Some(version.clone()));
                w.records = report.records;
                w.version = Some(version);
                w.warnings = report.warnings;
            }
            Err(e) => {
                warn!(error = %e, "Remote catalog unavailable, serving seed collection");
                let seed = seed_collection();
                self.cache.put(seed.clone(), None);
                w.records = seed;
                w.version = None;
                w.warnings.clear();
                w.notice = Some(NOTICE_FALLBACK.to_string());
            }
        }

        w.loaded = true;
        self.publish(&w);
        w.records.clone()
    }

    async fn ensure_loaded(&self) {
        let loaded = self.working.lock().loaded;
        if !loaded {
            self.get_all().await;
        }
    }

    /// Working collection as it stands, without touching cache or remote.
    pub fn records(&self) -> Vec<AgentRecord> {
        self.working.lock().records.clone()
    }

    pub fn find(&self, id: &AgentId) -> Option<AgentRecord> {
        self.working.lock().records.iter().find(|r| &r.id == id).cloned()
    }

    /// Distinct non-empty categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        let w = self.working.lock();
        let mut categories: Vec<String> = Vec::new();
        for record in &w.records {
            if !record.category.is_empty() && !categories.contains(&record.category) {
                categories.push(record.category.clone());
            }
        }
        categories
    }

    /// Records in `category`, or all of them for `None`.
    pub fn by_category(&self, category: Option<&str>) -> Vec<AgentRecord> {
        let w = self.working.lock();
        w.records
            .iter()
            .filter(|r| category.is_none_or(|c| r.category == c))
            .cloned()
            .collect()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new record under a freshly issued id.
    ///
    /// Returns the record whatever happens to the remote write; see
    /// [`CatalogService::write_status`] for that.
    pub async fn add(&self, form: AgentForm) -> Result<AgentRecord, CatalogError> {
        form.validate()?;
        self.ensure_loaded().await;

        let (record, pending) = {
            let mut w = self.working.lock();
            let id = self.fresh_id(&w.records);
            let record = AgentRecord::from_form(id, form);
            w.records.push(record.clone());
            (record, self.begin_write(&mut w))
        };

        info!(id = %record.id, name = %record.name, "Added catalog record");
        self.persist(pending).await;
        Ok(record)
    }

    /// Merge `patch` into the record with `id`.
    ///
    /// # Returns
    /// * `Err(CatalogError::NotFound)` - nothing changed, nothing written
    pub async fn update(&self, id: &AgentId, patch: AgentPatch) -> Result<(), CatalogError> {
        patch.validate()?;
        self.ensure_loaded().await;

        let pending = {
            let mut w = self.working.lock();
            let record = w
                .records
                .iter_mut()
                .find(|r| &r.id == id)
                .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
            record.apply(patch);
            self.begin_write(&mut w)
        };

        info!(id = %id, "Updated catalog record");
        self.persist(pending).await;
        Ok(())
    }

    pub async fn set_status(&self, id: &AgentId, status: AgentStatus) -> Result<(), CatalogError> {
        self.update(id, AgentPatch::status(status)).await
    }

    /// Remove the record with `id`. Absent ids are a no-op and nothing is
    /// written. Returns whether a record was removed.
    pub async fn delete(&self, id: &AgentId) -> bool {
        self.ensure_loaded().await;

        let pending = {
            let mut w = self.working.lock();
            let before = w.records.len();
            w.records.retain(|r| &r.id != id);
            if w.records.len() == before {
                debug!(id = %id, "Delete of unknown record ignored");
                return false;
            }
            self.begin_write(&mut w)
        };

        info!(id = %id, "Deleted catalog record");
        self.persist(pending).await;
        true
    }

    /// Move the record with `id` to `index`, clamped to the end of the list.
    pub async fn move_to(&self, id: &AgentId, index: usize) -> Result<(), CatalogError> {
        self.ensure_loaded().await;

        let pending = {
            let mut w = self.working.lock();
            let from = w
                .records
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| CatalogError::NotFound(id.clone()))?;
            let to = index.min(w.records.len() - 1);
            if from == to {
                return Ok(());
            }
            let record = w.records.remove(from);
            w.records.insert(to, record);
            self.begin_write(&mut w)
        };

        info!(id = %id, position = index, "Moved catalog record");
        self.persist(pending).await;
        Ok(())
    }

    fn fresh_id(&self, records: &[AgentRecord]) -> AgentId {
        loop {
            let id = self.ids.next_id();
            if !records.iter().any(|r| r.id == id) {
                return id;
            }
        }
    }

    // ========================================================================
    // Write pipeline
    // ========================================================================

    /// Publish the optimistic state and open a new write attempt.
    fn begin_write(&self, w: &mut Working) -> PendingWrite {
        w.next_attempt += 1;
        w.in_flight += 1;
        w.error = None;
        w.notice = None;
        w.last_write = Some(WriteReport::pending(w.next_attempt));

        // Reads within the window must see the local change even if the
        // remote write never lands.
        self.cache.overwrite_records(w.records.clone());
        self.publish(w);

        PendingWrite {
            attempt: w.next_attempt,
            records: w.records.clone(),
            expected: w.version.clone(),
        }
    }

    async fn persist(&self, pending: PendingWrite) {
        let outcome = self.push_to_remote(&pending).await;
        self.finish_write(pending, outcome);
    }

    async fn push_to_remote(&self, pending: &PendingWrite) -> Result<VersionTag, StoreError> {
        if !self.store.can_write() {
            return Err(StoreError::WritePermissionDenied(
                "no write token configured".to_string(),
            ));
        }
        let Some(expected) = pending.expected.as_ref() else {
            return Err(StoreError::VersionConflict {
                expected: "<no version read from remote>".to_string(),
            });
        };

        let content = serde_json::to_string_pretty(&pending.records)?;
        self.store
            .write_file(&content, expected, &self.commit_message)
            .await
    }

    fn finish_write(&self, pending: PendingWrite, outcome: Result<VersionTag, StoreError>) {
        let attempt = pending.attempt;
        let mut w = self.working.lock();
        w.in_flight = w.in_flight.saturating_sub(1);

        // Only the most recent attempt drives the reported status and banners
        let is_latest = w.last_write.as_ref().is_none_or(|r| r.attempt <= attempt);

        let (state, detail) = match outcome {
            Ok(version) => {
                info!(attempt, version = %version, "Catalog write confirmed");
                // Snapshot is exactly what the remote now holds at `version`
                self.cache.put(pending.records.clone(), Some(version.clone()));
                if w.records != pending.records {
                    // Later edits are still in flight; keep them visible to reads
                    self.cache.overwrite_records(w.records.clone());
                }
                w.version = Some(version);
                (WriteState::Confirmed, None)
            }
            Err(StoreError::WritePermissionDenied(reason)) => {
                warn!(attempt, %reason, "Catalog change kept locally only");
                if is_latest {
                    w.notice = Some(NOTICE_LOCAL_ONLY.to_string());
                }
                (WriteState::LocalOnly, Some(reason))
            }
            Err(e @ StoreError::VersionConflict { .. }) => {
                error!(attempt, error = %e, "Catalog write rejected, remote changed");
                if is_latest {
                    w.error = Some(ERROR_CONFLICT.to_string());
                }
                (WriteState::Conflicted, Some(e.to_string()))
            }
            Err(e) => {
                error!(attempt, error = %e, "Catalog write failed");
                if is_latest {
                    w.error = Some(format!("{} {}", ERROR_FAILED, e));
                }
                (WriteState::Failed, Some(e.to_string()))
            }
        };

        if is_latest {
            w.last_write = Some(WriteReport {
                attempt,
                state,
                detail,
            });
        }
        self.publish(&w);
    }

    // ========================================================================
    // Status
    // ========================================================================

    fn publish(&self, w: &Working) {
        self.view.send_replace(CatalogView {
            records: w.records.clone(),
            loading: w.loading > 0,
            saving: w.in_flight > 0,
            last_write: w.last_write.clone(),
            error: w.error.clone(),
            notice: w.notice.clone(),
        });
    }

    pub fn view(&self) -> CatalogView {
        self.view.borrow().clone()
    }

    /// Receive every published [`CatalogView`], including the optimistic
    /// one sent before a remote write starts.
    pub fn subscribe(&self) -> watch::Receiver<CatalogView> {
        self.view.subscribe()
    }

    pub fn write_status(&self) -> Option<WriteReport> {
        self.working.lock().last_write.clone()
    }

    pub fn is_saving(&self) -> bool {
        self.working.lock().in_flight > 0
    }

    pub fn is_loading(&self) -> bool {
        self.working.lock().loading > 0
    }

    pub fn error(&self) -> Option<String> {
        self.working.lock().error.clone()
    }

    pub fn notice(&self) -> Option<String> {
        self.working.lock().notice.clone()
    }

    pub fn clear_error(&self) {
        let mut w = self.working.lock();
        w.error = None;
        self.publish(&w);
    }

    pub fn clear_notice(&self) {
        let mut w = self.working.lock();
        w.notice = None;
        self.publish(&w);
    }

    /// Coercions applied by the last successful remote read.
    pub fn migration_warnings(&self) -> Vec<MigrationWarning> {
        self.working.lock().warnings.clone()
    }
}
