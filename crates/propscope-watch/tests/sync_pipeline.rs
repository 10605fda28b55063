//! Integration tests for the event → rule → sync pipeline.
//!
//! Exercises the `SyncManager` against an in-memory metadata store:
//! debounced coalescing, per-path mutual exclusion, template flow for
//! new documents, and failure isolation in bulk operations.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_yaml::Value;
use tokio::sync::Notify;
use tokio::time::{sleep, Duration};

use propscope_core::{FolderRule, FrontmatterMap, PropscopeSettings};
use propscope_watch::{
    ContentReader, Error, FrontmatterMutator, MetadataStore, RestoreOutcome, SyncManager,
    SyncOutcome, SyncReason, TemplateOutcome, VaultEvent, VaultEventKind,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// In-memory metadata store with per-test failure injection and an
/// optional gate that holds each read-modify-write open.
#[derive(Default)]
struct MemoryStore {
    documents: Mutex<HashMap<PathBuf, FrontmatterMap>>,
    raw_text: Mutex<HashMap<PathBuf, String>>,
    failing: Mutex<HashSet<PathBuf>>,
    process_count: AtomicUsize,
    hold: Option<Arc<Notify>>,
}

impl MemoryStore {
    fn new() -> Self {
        Self::default()
    }

    fn with_hold(hold: Arc<Notify>) -> Self {
        Self {
            hold: Some(hold),
            ..Self::default()
        }
    }

    fn put(&self, path: &str, yaml: &str) {
        let fm: FrontmatterMap = serde_yaml::from_str(yaml).expect("test yaml");
        self.documents.lock().insert(PathBuf::from(path), fm);
    }

    fn put_raw(&self, path: &str, text: &str) {
        self.raw_text.lock().insert(PathBuf::from(path), text.to_string());
    }

    fn fail_on(&self, path: &str) {
        self.failing.lock().insert(PathBuf::from(path));
    }

    fn get(&self, path: &str) -> FrontmatterMap {
        self.documents
            .lock()
            .get(Path::new(path))
            .cloned()
            .unwrap_or_default()
    }

    fn processed(&self) -> usize {
        self.process_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn read_frontmatter(&self, path: &Path) -> Option<FrontmatterMap> {
        self.documents.lock().get(path).cloned()
    }

    async fn process_frontmatter(
        &self,
        path: &Path,
        mutator: FrontmatterMutator,
    ) -> propscope_watch::Result<()> {
        if let Some(hold) = &self.hold {
            hold.notified().await;
        }
        if self.failing.lock().contains(path) {
            return Err(Error::Storage(format!("injected failure for {}", path.display())));
        }
        self.process_count.fetch_add(1, Ordering::SeqCst);
        let mut documents = self.documents.lock();
        let fm = documents.entry(path.to_path_buf()).or_default();
        mutator(fm);
        Ok(())
    }
}

#[async_trait]
impl ContentReader for MemoryStore {
    async fn read_raw_text(&self, path: &Path) -> propscope_watch::Result<String> {
        Ok(self.raw_text.lock().get(path).cloned().unwrap_or_default())
    }
}

fn settings(debounce_ms: u64, remove_plain: bool) -> PropscopeSettings {
    PropscopeSettings {
        rules: vec![FolderRule::new("index/projects/", "projects")],
        managed_properties: "priority, status".to_string(),
        remove_plain_on_sync: remove_plain,
        debounce_ms,
        ..Default::default()
    }
}

fn manager(store: Arc<MemoryStore>, settings: PropscopeSettings) -> SyncManager {
    SyncManager::new(settings, store.clone(), store)
}

fn value(fm: &FrontmatterMap, key: &str) -> Option<Value> {
    fm.get(key).cloned()
}

// ============================================================================
// Direct sync operations
// ============================================================================

#[tokio::test]
async fn sync_migrates_aliases_into_storage_keys() {
    let store = Arc::new(MemoryStore::new());
    store.put("index/projects/a.md", "priority: high\nstatus: in progress\n");
    let manager = manager(store.clone(), settings(0, true));

    let outcome = manager
        .sync_path(Path::new("index/projects/a.md"), SyncReason::Manual)
        .await
        .unwrap();
    assert_eq!(outcome, SyncOutcome::Synced);

    let fm = store.get("index/projects/a.md");
    assert_eq!(value(&fm, "projects__priority"), Some(Value::from("high")));
    assert_eq!(value(&fm, "projects__status"), Some(Value::from("in progress")));
    assert!(!fm.contains_key("priority"));
    assert!(!fm.contains_key("status"));
}

#[tokio::test]
async fn sync_with_removal_off_keeps_both_keys() {
    let store = Arc::new(MemoryStore::new());
    store.put("index/projects/a.md", "priority: high\n");
    let manager = manager(store.clone(), settings(0, false));

    manager
        .sync_path(Path::new("index/projects/a.md"), SyncReason::Manual)
        .await
        .unwrap();

    let fm = store.get("index/projects/a.md");
    assert_eq!(value(&fm, "priority"), Some(Value::from("high")));
    assert_eq!(value(&fm, "projects__priority"), Some(Value::from("high")));
}

#[tokio::test]
async fn clean_document_skips_the_rewrite() {
    let store = Arc::new(MemoryStore::new());
    store.put("index/projects/a.md", "projects__priority: high\n");
    let manager = manager(store.clone(), settings(0, true));

    let outcome = manager
        .sync_path(Path::new("index/projects/a.md"), SyncReason::Manual)
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Clean);
    assert_eq!(store.processed(), 0);
}

#[tokio::test]
async fn unscoped_document_is_left_alone() {
    let store = Arc::new(MemoryStore::new());
    store.put("journal/today.md", "priority: high\n");
    let manager = manager(store.clone(), settings(0, true));

    let outcome = manager
        .sync_path(Path::new("journal/today.md"), SyncReason::Manual)
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::NotScoped);
    assert_eq!(store.processed(), 0);
    assert!(store.get("journal/today.md").contains_key("priority"));
}

#[tokio::test]
async fn storage_failure_clears_in_flight_marker() {
    let store = Arc::new(MemoryStore::new());
    store.put("index/projects/a.md", "priority: high\n");
    store.fail_on("index/projects/a.md");
    let manager = manager(store.clone(), settings(0, true));
    let path = Path::new("index/projects/a.md");

    assert!(manager.sync_path(path, SyncReason::Manual).await.is_err());
    assert!(!manager.guard().is_in_flight(path));

    // A later trigger proceeds instead of being permanently blocked.
    store.failing.lock().clear();
    let outcome = manager.sync_path(path, SyncReason::Manual).await.unwrap();
    assert_eq!(outcome, SyncOutcome::Synced);
}

// ============================================================================
// Debounced event path
// ============================================================================

#[tokio::test(start_paused = true)]
async fn event_burst_coalesces_into_one_sync() {
    let store = Arc::new(MemoryStore::new());
    store.put("index/projects/a.md", "priority: high\n");
    let manager = manager(store.clone(), settings(100, true));

    for kind in [
        VaultEventKind::Opened,
        VaultEventKind::Modified,
        VaultEventKind::Modified,
        VaultEventKind::MetadataChanged,
    ] {
        manager
            .handle_event(VaultEvent::new(kind, "index/projects/a.md"))
            .await;
    }

    sleep(Duration::from_millis(400)).await;

    assert_eq!(store.processed(), 1);
    let fm = store.get("index/projects/a.md");
    assert!(fm.contains_key("projects__priority"));
}

#[tokio::test(start_paused = true)]
async fn events_for_different_documents_run_independently() {
    let store = Arc::new(MemoryStore::new());
    store.put("index/projects/a.md", "priority: high\n");
    store.put("index/projects/b.md", "status: open\n");
    let manager = manager(store.clone(), settings(100, true));

    for path in ["index/projects/a.md", "index/projects/b.md"] {
        manager
            .handle_event(VaultEvent::new(VaultEventKind::Modified, path))
            .await;
    }

    sleep(Duration::from_millis(400)).await;

    assert_eq!(store.processed(), 2);
    assert!(store.get("index/projects/a.md").contains_key("projects__priority"));
    assert!(store.get("index/projects/b.md").contains_key("projects__status"));
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_syncs() {
    let store = Arc::new(MemoryStore::new());
    store.put("index/projects/a.md", "priority: high\n");
    let manager = manager(store.clone(), settings(100, true));

    manager
        .handle_event(VaultEvent::new(VaultEventKind::Modified, "index/projects/a.md"))
        .await;
    manager.shutdown();

    sleep(Duration::from_millis(400)).await;
    assert_eq!(store.processed(), 0);
}

// ============================================================================
// Mutual exclusion
// ============================================================================

#[tokio::test]
async fn overlapping_sync_for_same_path_is_dropped() {
    let hold = Arc::new(Notify::new());
    let store = Arc::new(MemoryStore::with_hold(Arc::clone(&hold)));
    store.put("index/projects/a.md", "priority: high\n");
    let manager = manager(store.clone(), settings(0, true));
    let path = PathBuf::from("index/projects/a.md");

    let first = {
        let manager = manager.clone();
        let path = path.clone();
        tokio::spawn(async move { manager.sync_path(&path, SyncReason::Manual).await })
    };

    // Wait until the first operation is inside the store call.
    while !manager.guard().is_in_flight(&path) {
        tokio::task::yield_now().await;
    }

    let second = manager.sync_path(&path, SyncReason::Modified).await.unwrap();
    assert_eq!(second, SyncOutcome::Busy);

    hold.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), SyncOutcome::Synced);
    assert_eq!(store.processed(), 1);
}

// ============================================================================
// Template flow
// ============================================================================

fn template_settings(remove_plain: bool) -> PropscopeSettings {
    PropscopeSettings {
        rules: vec![FolderRule::new("index/projects/", "projects")
            .with_template("priority: medium\nstatus: draft\nowner: null\n")],
        managed_properties: "priority, status, owner".to_string(),
        remove_plain_on_sync: remove_plain,
        debounce_ms: 50,
        ..Default::default()
    }
}

#[tokio::test(start_paused = true)]
async fn created_document_gets_template_defaults() {
    let store = Arc::new(MemoryStore::new());
    store.put_raw("index/projects/new.md", "");
    let manager = manager(store.clone(), template_settings(true));

    manager
        .handle_event(VaultEvent::new(VaultEventKind::Created, "index/projects/new.md"))
        .await;
    sleep(Duration::from_millis(300)).await;

    let fm = store.get("index/projects/new.md");
    assert_eq!(value(&fm, "projects__priority"), Some(Value::from("medium")));
    assert_eq!(value(&fm, "projects__status"), Some(Value::from("draft")));
    assert_eq!(value(&fm, "projects__owner"), Some(Value::Null));
    assert_eq!(fm.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn template_skipped_when_frontmatter_already_present() {
    let store = Arc::new(MemoryStore::new());
    store.put_raw("index/projects/new.md", "---\npriority: high\n---\nbody\n");
    store.put("index/projects/new.md", "priority: high\n");
    let manager = manager(store.clone(), template_settings(true));

    let outcome = manager
        .apply_template_for_new(Path::new("index/projects/new.md"))
        .await
        .unwrap();
    assert_eq!(outcome, TemplateOutcome::HasFrontmatter);

    // The follow-up sync still normalizes the alias key it found.
    manager
        .handle_event(VaultEvent::new(VaultEventKind::Created, "index/projects/new.md"))
        .await;
    sleep(Duration::from_millis(300)).await;

    let fm = store.get("index/projects/new.md");
    assert_eq!(value(&fm, "projects__priority"), Some(Value::from("high")));
    assert!(!fm.contains_key("priority"));
}

#[tokio::test]
async fn invalid_template_aborts_without_mutation() {
    let store = Arc::new(MemoryStore::new());
    store.put_raw("index/projects/new.md", "");
    let mut cfg = template_settings(true);
    cfg.rules = vec![FolderRule::new("index/projects/", "projects")
        .with_template("priority: [unclosed\n")];
    let manager = manager(store.clone(), cfg);

    let result = manager
        .apply_template_for_new(Path::new("index/projects/new.md"))
        .await;
    assert!(result.is_err());
    assert_eq!(store.processed(), 0);
}

#[tokio::test]
async fn template_disabled_rule_is_not_applicable() {
    let store = Arc::new(MemoryStore::new());
    store.put_raw("index/projects/new.md", "");
    let mut cfg = template_settings(true);
    cfg.rules = vec![FolderRule::new("index/projects/", "projects")];
    let manager = manager(store.clone(), cfg);

    let outcome = manager
        .apply_template_for_new(Path::new("index/projects/new.md"))
        .await
        .unwrap();
    assert_eq!(outcome, TemplateOutcome::NotApplicable);
    assert_eq!(store.processed(), 0);
}

#[tokio::test(start_paused = true)]
async fn template_mirrors_aliases_when_removal_off() {
    let store = Arc::new(MemoryStore::new());
    store.put_raw("index/projects/new.md", "");
    let manager = manager(store.clone(), template_settings(false));

    manager
        .handle_event(VaultEvent::new(VaultEventKind::Created, "index/projects/new.md"))
        .await;
    sleep(Duration::from_millis(300)).await;

    let fm = store.get("index/projects/new.md");
    assert_eq!(value(&fm, "projects__priority"), Some(Value::from("medium")));
    assert_eq!(value(&fm, "priority"), Some(Value::from("medium")));
}

// ============================================================================
// Restore and bulk operations
// ============================================================================

#[tokio::test]
async fn restore_round_trips_a_synced_document() {
    let store = Arc::new(MemoryStore::new());
    store.put("index/projects/a.md", "priority: high\ntitle: Note\n");
    let manager = manager(store.clone(), settings(0, true));
    let path = Path::new("index/projects/a.md");

    manager.sync_path(path, SyncReason::Manual).await.unwrap();
    let outcome = manager.restore_path(path, Some(true)).await.unwrap();
    assert_eq!(outcome, RestoreOutcome::Restored);

    let fm = store.get("index/projects/a.md");
    assert_eq!(value(&fm, "priority"), Some(Value::from("high")));
    assert_eq!(value(&fm, "title"), Some(Value::from("Note")));
    assert!(!fm.contains_key("projects__priority"));
}

#[tokio::test]
async fn bulk_sync_counts_every_outcome() {
    let store = Arc::new(MemoryStore::new());
    store.put("index/projects/a.md", "priority: high\n");
    store.put("index/projects/b.md", "projects__priority: high\n");
    store.put("journal/c.md", "priority: high\n");
    store.put("index/projects/d.md", "status: open\n");
    store.fail_on("index/projects/d.md");
    let manager = manager(store.clone(), settings(0, true));

    let summary = manager
        .sync_paths(&[
            PathBuf::from("index/projects/a.md"),
            PathBuf::from("index/projects/b.md"),
            PathBuf::from("journal/c.md"),
            PathBuf::from("index/projects/d.md"),
        ])
        .await;

    assert_eq!(summary.synced, 1);
    assert_eq!(summary.clean, 1);
    assert_eq!(summary.not_scoped, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total(), 4);
}

#[tokio::test]
async fn bulk_restore_continues_past_failures() {
    let store = Arc::new(MemoryStore::new());
    store.put("index/projects/a.md", "projects__priority: high\n");
    store.put("index/projects/b.md", "projects__priority: low\n");
    store.put("index/projects/c.md", "projects__status: open\n");
    store.fail_on("index/projects/b.md");
    let manager = manager(store.clone(), settings(0, true));

    let summary = manager
        .restore_paths(
            &[
                PathBuf::from("index/projects/a.md"),
                PathBuf::from("index/projects/b.md"),
                PathBuf::from("index/projects/c.md"),
            ],
            None,
        )
        .await;

    assert_eq!(summary.restored, 2);
    assert_eq!(summary.failed, 1);

    // The documents after the failing one were still restored.
    assert!(store.get("index/projects/c.md").contains_key("status"));
}
