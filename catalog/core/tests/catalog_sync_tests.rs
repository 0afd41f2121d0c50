// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for catalog synchronization
//!
//! Drives `CatalogService` against the versioned in-memory store with a
//! manual clock, covering cache windows, optimistic writes and the write
//! status reported for each outcome.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hub_core::application::cache::{ManualClock, SnapshotCache};
use hub_core::application::write_status::{ERROR_CONFLICT, NOTICE_LOCAL_ONLY};
use hub_core::domain::seed::seed_collection;
use hub_core::infrastructure::InMemoryFileStore;
use hub_core::{
    AgentForm, AgentId, AgentPatch, AgentStatus, CatalogError, CatalogService, RemoteFile,
    RemoteFileStore, StoreError, VersionTag, WriteState,
};
use tokio::sync::Semaphore;

const WINDOW: Duration = Duration::from_secs(5 * 60);

/// Store whose writes wait for a permit, so tests can observe the state
/// between the optimistic change and the remote outcome.
struct GatedStore {
    inner: Arc<InMemoryFileStore>,
    gate: Arc<Semaphore>,
}

#[async_trait]
impl RemoteFileStore for GatedStore {
    async fn fetch_file(&self) -> Result<RemoteFile, StoreError> {
        self.inner.fetch_file().await
    }

    async fn write_file(
        &self,
        content: &str,
        expected: &VersionTag,
        message: &str,
    ) -> Result<VersionTag, StoreError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| StoreError::RemoteUnavailable(e.to_string()))?;
        permit.forget();
        self.inner.write_file(content, expected, message).await
    }

    fn can_write(&self) -> bool {
        self.inner.can_write()
    }
}

/// Store where each write, in call order, waits on its own gate and may be
/// told to fail before reaching the inner store.
struct ScriptedStore {
    inner: Arc<InMemoryFileStore>,
    gates: Vec<Arc<Semaphore>>,
    failing: HashSet<usize>,
    calls: AtomicUsize,
}

#[async_trait]
impl RemoteFileStore for ScriptedStore {
    async fn fetch_file(&self) -> Result<RemoteFile, StoreError> {
        self.inner.fetch_file().await
    }

    async fn write_file(
        &self,
        content: &str,
        expected: &VersionTag,
        message: &str,
    ) -> Result<VersionTag, StoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(call) {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| StoreError::RemoteUnavailable(e.to_string()))?;
            permit.forget();
        }
        if self.failing.contains(&call) {
            return Err(StoreError::RemoteUnavailable("connection reset".to_string()));
        }
        self.inner.write_file(content, expected, message).await
    }

    fn can_write(&self) -> bool {
        self.inner.can_write()
    }
}

fn seeded_store() -> Arc<InMemoryFileStore> {
    Arc::new(InMemoryFileStore::with_records(&seed_collection()).unwrap())
}

fn create_service(store: Arc<dyn RemoteFileStore>) -> (Arc<ManualClock>, CatalogService) {
    let clock = Arc::new(ManualClock::default());
    let cache = Arc::new(SnapshotCache::new(WINDOW, clock.clone()));
    (clock, CatalogService::new(store, cache))
}

fn form(name: &str) -> AgentForm {
    AgentForm {
        name: name.to_string(),
        description: "d".to_string(),
        category: "c".to_string(),
        status: AgentStatus::UnderReview,
        user_page_url: "https://x.test".to_string(),
        admin_page_url: None,
    }
}

#[tokio::test]
async fn test_read_within_window_is_served_from_cache() {
    let store = seeded_store();
    let (clock, svc) = create_service(store.clone());

    let first = svc.get_all().await;
    clock.advance(WINDOW - Duration::from_secs(1));
    let second = svc.get_all().await;

    assert_eq!(first, second);
    assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn test_expired_window_triggers_exactly_one_fetch() {
    let store = seeded_store();
    let (clock, svc) = create_service(store.clone());

    svc.get_all().await;
    clock.advance(WINDOW);
    svc.get_all().await;
    svc.get_all().await;

    assert_eq!(store.fetch_count(), 2);
}

#[tokio::test]
async fn test_refresh_always_goes_to_remote() {
    let store = seeded_store();
    let (_clock, svc) = create_service(store.clone());

    svc.get_all().await;
    store.replace_content("[]");
    assert_eq!(svc.get_all().await.len(), 3);

    let refreshed = svc.refresh().await;
    assert!(refreshed.is_empty());
    assert_eq!(store.fetch_count(), 2);
}

#[tokio::test]
async fn test_update_missing_id_is_not_found() {
    let store = seeded_store();
    let (_clock, svc) = create_service(store.clone());
    let before = svc.get_all().await;

    let result = svc
        .update(
            &AgentId::from("missing-id"),
            AgentPatch {
                name: Some("renamed".to_string()),
                ..AgentPatch::default()
            },
        )
        .await;

    assert_eq!(result, Err(CatalogError::NotFound(AgentId::from("missing-id"))));
    assert_eq!(svc.records(), before);
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_delete_missing_id_is_a_no_op() {
    let store = seeded_store();
    let (_clock, svc) = create_service(store.clone());
    svc.get_all().await;

    assert!(!svc.delete(&AgentId::from("missing-id")).await);
    assert_eq!(svc.records().len(), 3);
    assert!(svc.write_status().is_none());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_add_then_read_without_fetch() {
    let store = seeded_store();
    let (_clock, svc) = create_service(store.clone());
    svc.get_all().await;

    let record = svc.add(form("X")).await.unwrap();

    let seed_ids: HashSet<_> = seed_collection().into_iter().map(|r| r.id).collect();
    assert!(!seed_ids.contains(&record.id));
    assert!(!record.id.as_str().is_empty());

    let all = svc.get_all().await;
    assert_eq!(all.len(), 4);
    assert_eq!(all.last(), Some(&record));
    assert_eq!(store.fetch_count(), 1);

    let report = svc.write_status().unwrap();
    assert_eq!(report.state, WriteState::Confirmed);
    assert!(!svc.is_saving());
    assert!(store.content().contains("\"name\": \"X\""));
}

#[tokio::test]
async fn test_add_before_first_read_loads_collection() {
    let store = seeded_store();
    let (_clock, svc) = create_service(store.clone());

    svc.add(form("first thing")).await.unwrap();

    assert_eq!(svc.records().len(), 4);
    assert_eq!(store.fetch_count(), 1);
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_missing_token_keeps_change_locally() {
    let store = Arc::new(
        InMemoryFileStore::with_records(&seed_collection())
            .unwrap()
            .read_only(),
    );
    let (_clock, svc) = create_service(store.clone());
    let original = store.content();

    let record = svc.add(form("X")).await.unwrap();

    let report = svc.write_status().unwrap();
    assert_eq!(report.state, WriteState::LocalOnly);
    assert_eq!(svc.notice().as_deref(), Some(NOTICE_LOCAL_ONLY));
    assert!(svc.error().is_none());
    assert!(svc.find(&record.id).is_some());
    assert_eq!(store.content(), original);

    // still visible to reads inside the window
    assert_eq!(svc.get_all().await.len(), 4);
    assert_eq!(store.fetch_count(), 1);
}

#[tokio::test]
async fn test_local_only_changes_give_way_after_window() {
    let store = Arc::new(
        InMemoryFileStore::with_records(&seed_collection())
            .unwrap()
            .read_only(),
    );
    let (clock, svc) = create_service(store.clone());

    svc.get_all().await;
    clock.advance(Duration::from_secs(60));
    svc.delete(&AgentId::from("1")).await;
    assert_eq!(svc.get_all().await.len(), 2);

    // the window is measured from the last fetch, not the local edit
    clock.advance(WINDOW - Duration::from_secs(60));
    assert_eq!(svc.get_all().await.len(), 3);
    assert_eq!(store.fetch_count(), 2);
}

#[tokio::test]
async fn test_unreachable_remote_serves_seed() {
    let store = seeded_store();
    store.replace_content("[]");
    store.set_available(false);
    let (_clock, svc) = create_service(store.clone());

    let records = svc.get_all().await;

    assert_eq!(records, seed_collection());
    assert!(svc.error().is_none());
    assert!(!svc.is_loading());
}

#[tokio::test]
async fn test_garbage_remote_content_serves_seed() {
    let store = Arc::new(InMemoryFileStore::new("<html>rate limited</html>"));
    let (_clock, svc) = create_service(store);

    assert_eq!(svc.get_all().await, seed_collection());
}

#[tokio::test]
async fn test_external_edit_surfaces_as_conflict() {
    let store = seeded_store();
    let (_clock, svc) = create_service(store.clone());
    svc.get_all().await;

    store.replace_content("[]");
    svc.set_status(&AgentId::from("2"), AgentStatus::Applied)
        .await
        .unwrap();

    let report = svc.write_status().unwrap();
    assert_eq!(report.state, WriteState::Conflicted);
    assert_eq!(svc.error().as_deref(), Some(ERROR_CONFLICT));
    assert_eq!(store.content(), "[]");

    // no rollback
    let local = svc.find(&AgentId::from("2")).unwrap();
    assert_eq!(local.status, AgentStatus::Applied);

    svc.clear_error();
    assert!(svc.error().is_none());
}

#[tokio::test]
async fn test_legacy_file_is_migrated_and_rewritten() {
    let legacy = r#"[
        {"id": "10", "name": "old on", "description": "", "category": "x", "userPageUrl": "https://a.test", "isApplied": true},
        {"id": "11", "name": "old off", "description": "", "category": "x", "userPageUrl": "https://b.test", "applied": false},
        {"id": "12", "name": "bare", "description": "", "category": "x", "userPageUrl": "https://c.test"}
    ]"#;
    let store = Arc::new(InMemoryFileStore::new(legacy));
    let (_clock, svc) = create_service(store.clone());

    let records = svc.get_all().await;
    let statuses: Vec<_> = records.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![AgentStatus::Applied, AgentStatus::UnderReview, AgentStatus::UnderReview]
    );
    assert!(svc.migration_warnings().is_empty());

    svc.delete(&AgentId::from("12")).await;
    let written = store.content();
    assert!(!written.contains("isApplied"));
    assert!(written.contains("\"status\": \"APPLIED\""));
}

#[tokio::test]
async fn test_optimistic_state_is_visible_before_write_resolves() {
    let inner = seeded_store();
    let gate = Arc::new(Semaphore::new(0));
    let store = Arc::new(GatedStore {
        inner: inner.clone(),
        gate: gate.clone(),
    });
    let (_clock, svc) = create_service(store);
    let svc = Arc::new(svc);
    svc.get_all().await;

    let mut view = svc.subscribe();
    let pending = tokio::spawn({
        let svc = svc.clone();
        async move { svc.add(form("in flight")).await }
    });

    view.wait_for(|v| v.records.len() == 4 && v.saving)
        .await
        .unwrap();
    assert_eq!(svc.write_status().unwrap().state, WriteState::Pending);
    assert_eq!(inner.write_count(), 0);

    gate.add_permits(1);
    let record = pending.await.unwrap().unwrap();

    assert!(!svc.is_saving());
    assert_eq!(svc.write_status().unwrap().state, WriteState::Confirmed);
    assert!(inner.content().contains(&record.name));
    assert!(!svc.view().saving);
}

#[tokio::test]
async fn test_overlapping_writes_race_on_version_tag() {
    let inner = seeded_store();
    let gate = Arc::new(Semaphore::new(0));
    let store = Arc::new(GatedStore {
        inner: inner.clone(),
        gate: gate.clone(),
    });
    let (_clock, svc) = create_service(store);
    let svc = Arc::new(svc);
    svc.get_all().await;
    let mut view = svc.subscribe();

    let first = tokio::spawn({
        let svc = svc.clone();
        async move { svc.add(form("first")).await }
    });
    view.wait_for(|v| v.records.len() == 4).await.unwrap();

    let second = tokio::spawn({
        let svc = svc.clone();
        async move { svc.add(form("second")).await }
    });
    view.wait_for(|v| v.records.len() == 5).await.unwrap();
    assert!(svc.is_saving());

    gate.add_permits(2);
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    // both writes carried the same tag, only one can land
    assert_eq!(inner.write_count(), 1);
    assert_eq!(svc.error().as_deref(), Some(ERROR_CONFLICT));
    assert_eq!(svc.records().len(), 5);
    assert!(!svc.is_saving());

    // the cache keeps the working copy, not just the write that landed
    assert_eq!(svc.get_all().await.len(), 5);
    assert_eq!(inner.fetch_count(), 1);
}

#[tokio::test]
async fn test_older_write_finishing_last_does_not_override_status() {
    let inner = seeded_store();
    let gates = vec![Arc::new(Semaphore::new(0)), Arc::new(Semaphore::new(0))];
    let store = Arc::new(ScriptedStore {
        inner: inner.clone(),
        gates: gates.clone(),
        failing: HashSet::from([0]),
        calls: AtomicUsize::new(0),
    });
    let (_clock, svc) = create_service(store);
    let svc = Arc::new(svc);
    svc.get_all().await;
    let mut view = svc.subscribe();

    let older = tokio::spawn({
        let svc = svc.clone();
        async move { svc.delete(&AgentId::from("1")).await }
    });
    view.wait_for(|v| v.records.len() == 2).await.unwrap();

    let newer = tokio::spawn({
        let svc = svc.clone();
        async move { svc.delete(&AgentId::from("2")).await }
    });
    view.wait_for(|v| v.records.len() == 1).await.unwrap();

    gates[1].add_permits(1);
    assert!(newer.await.unwrap());
    let confirmed = svc.write_status().unwrap();
    assert_eq!(confirmed.attempt, 2);
    assert_eq!(confirmed.state, WriteState::Confirmed);

    gates[0].add_permits(1);
    assert!(older.await.unwrap());

    assert_eq!(svc.write_status(), Some(confirmed));
    assert_eq!(svc.error(), None);
    assert_eq!(svc.view().error, None);
    assert!(!svc.is_saving());
    assert_eq!(inner.write_count(), 1);
    assert_eq!(svc.get_all().await.len(), 1);
}
