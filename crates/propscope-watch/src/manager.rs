//! Orchestration of lifecycle events into engine operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, trace, warn};

use propscope_core::{
    apply_sync, apply_template, needs_sync, parse_template, resolve_rule, restore_aliases,
    PropscopeSettings, StorageKeyConfig,
};

use crate::error::Result;
use crate::events::{SyncReason, VaultEvent, VaultEventKind};
use crate::guard::ScheduleGuard;
use crate::traits::{ContentReader, MetadataStore};

/// Outcome of a single sync operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The document was rewritten.
    Synced,
    /// Nothing to do; the document was already normalized.
    Clean,
    /// No rule governs the document (or no keys are managed).
    NotScoped,
    /// An operation for this document was already in flight; the
    /// trigger was dropped.
    Busy,
}

/// Outcome of a template application attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateOutcome {
    /// Defaults were written into the new document.
    Applied,
    /// No rule governs the document, templating is disabled for the
    /// matching rule, or the template body is empty.
    NotApplicable,
    /// The document already begins with a frontmatter block.
    HasFrontmatter,
    /// An operation for this document was already in flight.
    Busy,
}

/// Outcome of a single restore operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// Storage-key values were copied back to alias keys.
    Restored,
    /// No rule governs the document (or no keys are managed).
    NotScoped,
    /// An operation for this document was already in flight.
    Busy,
}

/// Tally of a bulk sync run. Failures never abort the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Documents rewritten.
    pub synced: usize,
    /// Documents already normalized.
    pub clean: usize,
    /// Documents outside every rule.
    pub not_scoped: usize,
    /// Documents skipped because an operation was in flight.
    pub busy: usize,
    /// Documents whose rewrite failed.
    pub failed: usize,
}

impl SyncSummary {
    /// Total documents visited.
    pub fn total(&self) -> usize {
        self.synced + self.clean + self.not_scoped + self.busy + self.failed
    }
}

/// Tally of a bulk restore run. Failures never abort the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Documents restored.
    pub restored: usize,
    /// Documents outside every rule.
    pub not_scoped: usize,
    /// Documents skipped because an operation was in flight.
    pub busy: usize,
    /// Documents whose rewrite failed.
    pub failed: usize,
}

impl RestoreSummary {
    /// Total documents visited.
    pub fn total(&self) -> usize {
        self.restored + self.not_scoped + self.busy + self.failed
    }
}

/// Whether raw document text already begins with a structured
/// metadata block.
pub fn has_frontmatter_block(text: &str) -> bool {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.starts_with("---\n") || text.starts_with("---\r\n")
}

/// Coordinates lifecycle events, rule resolution and engine
/// transforms against the metadata store.
///
/// Cheap to clone; clones share the same settings, collaborators and
/// scheduling state, which is what lets debounce timers call back into
/// the manager.
#[derive(Clone)]
pub struct SyncManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    settings: RwLock<PropscopeSettings>,
    store: Arc<dyn MetadataStore>,
    reader: Arc<dyn ContentReader>,
    guard: ScheduleGuard,
}

impl SyncManager {
    /// Create a manager over the given collaborators.
    pub fn new(
        settings: PropscopeSettings,
        store: Arc<dyn MetadataStore>,
        reader: Arc<dyn ContentReader>,
    ) -> Self {
        Self {
            inner: Arc::new(ManagerInner {
                settings: RwLock::new(settings),
                store,
                reader,
                guard: ScheduleGuard::new(),
            }),
        }
    }

    /// Replace the active settings. Pending timers keep the delay they
    /// were scheduled with; new triggers use the new settings.
    pub async fn update_settings(&self, settings: PropscopeSettings) {
        *self.inner.settings.write().await = settings;
    }

    /// Snapshot of the active settings.
    pub async fn settings(&self) -> PropscopeSettings {
        self.inner.settings.read().await.clone()
    }

    /// The scheduling guard, for shutdown and introspection.
    pub fn guard(&self) -> &ScheduleGuard {
        &self.inner.guard
    }

    /// Dispatch a lifecycle event.
    ///
    /// Created documents get template defaults immediately, then join
    /// the standard debounced sync path like every other event.
    pub async fn handle_event(&self, event: VaultEvent) {
        trace!("event {} for {}", event.kind.as_str(), event.path.display());
        let reason = match event.kind {
            VaultEventKind::Created => match self.apply_template_for_new(&event.path).await {
                Ok(TemplateOutcome::Applied) => SyncReason::PostTemplate,
                Ok(_) => SyncReason::Created,
                Err(e) => {
                    warn!(
                        "Template application failed for {}: {}",
                        event.path.display(),
                        e
                    );
                    SyncReason::Created
                }
            },
            kind => SyncReason::from(kind),
        };
        self.schedule_sync(event.path, reason).await;
    }

    /// Schedule a debounced sync for `path`, superseding any pending
    /// one. Triggers within the window collapse into one sync carrying
    /// the most recent reason.
    pub async fn schedule_sync(&self, path: PathBuf, reason: SyncReason) {
        let delay = self.inner.settings.read().await.debounce_delay();
        let manager = self.clone();
        let target = path.clone();
        self.inner.guard.schedule(path, delay, move || async move {
            match manager.sync_path(&target, reason).await {
                Ok(outcome) => {
                    trace!("debounced sync for {}: {:?}", target.display(), outcome)
                }
                Err(e) => warn!("Debounced sync failed for {}: {}", target.display(), e),
            }
        });
    }

    /// Synchronize one document now.
    ///
    /// Resolves the governing rule, pre-checks the cached snapshot,
    /// then performs the exclusive read-modify-write. Returns
    /// [`SyncOutcome::Busy`] when an operation for the path is already
    /// in flight (the trigger is dropped, not queued).
    pub async fn sync_path(&self, path: &Path, reason: SyncReason) -> Result<SyncOutcome> {
        let Some(scope) = self.scope_for(path).await else {
            return Ok(SyncOutcome::NotScoped);
        };

        if let Some(snapshot) = self.inner.store.read_frontmatter(path).await {
            if !needs_sync(
                &snapshot,
                &scope.storage,
                &scope.slug,
                &scope.managed,
                scope.remove_plain,
            ) {
                trace!("{} already normalized", path.display());
                return Ok(SyncOutcome::Clean);
            }
        }

        let result = self
            .inner
            .guard
            .run_exclusive(path, async {
                let scope = scope.clone();
                self.inner
                    .store
                    .process_frontmatter(
                        path,
                        Box::new(move |fm| {
                            apply_sync(
                                fm,
                                &scope.storage,
                                &scope.slug,
                                &scope.managed,
                                scope.remove_plain,
                            )
                        }),
                    )
                    .await
            })
            .await;

        match result {
            None => {
                debug!("sync for {} dropped, operation in flight", path.display());
                Ok(SyncOutcome::Busy)
            }
            Some(Err(e)) => {
                warn!("Sync failed for {}: {}", path.display(), e);
                Err(e)
            }
            Some(Ok(())) => {
                debug!(
                    "synchronized {} into '{}' ({})",
                    path.display(),
                    scope.slug,
                    reason.as_str()
                );
                Ok(SyncOutcome::Synced)
            }
        }
    }

    /// Synchronize many documents, continuing past per-document
    /// failures.
    pub async fn sync_paths(&self, paths: &[PathBuf]) -> SyncSummary {
        let mut summary = SyncSummary::default();
        for path in paths {
            match self.sync_path(path, SyncReason::Manual).await {
                Ok(SyncOutcome::Synced) => summary.synced += 1,
                Ok(SyncOutcome::Clean) => summary.clean += 1,
                Ok(SyncOutcome::NotScoped) => summary.not_scoped += 1,
                Ok(SyncOutcome::Busy) => summary.busy += 1,
                Err(_) => summary.failed += 1,
            }
        }
        info!(
            "bulk sync: {} synced, {} clean, {} unscoped, {} busy, {} failed",
            summary.synced, summary.clean, summary.not_scoped, summary.busy, summary.failed
        );
        summary
    }

    /// Apply template defaults to a newly created document, then leave
    /// it to the standard sync path.
    ///
    /// Gates, in order: a governing rule with templating enabled and a
    /// non-empty template body; the document not already beginning
    /// with a frontmatter block (when configured). A template that
    /// fails to parse aborts with no mutation.
    pub async fn apply_template_for_new(&self, path: &Path) -> Result<TemplateOutcome> {
        let (rule, only_without_fm) = {
            let settings = self.inner.settings.read().await;
            let path_str = path.to_string_lossy();
            let Some(rule) = resolve_rule(&path_str, &settings.rules) else {
                return Ok(TemplateOutcome::NotApplicable);
            };
            (rule.clone(), settings.template_only_without_frontmatter)
        };

        if !rule.template_enabled {
            return Ok(TemplateOutcome::NotApplicable);
        }

        let defaults = parse_template(&rule.template_yaml)?;
        if defaults.is_empty() {
            return Ok(TemplateOutcome::NotApplicable);
        }

        if only_without_fm {
            let raw = self.inner.reader.read_raw_text(path).await?;
            if has_frontmatter_block(&raw) {
                debug!(
                    "{} already has frontmatter, skipping template",
                    path.display()
                );
                return Ok(TemplateOutcome::HasFrontmatter);
            }
        }

        let (storage, managed, remove_plain) = {
            let settings = self.inner.settings.read().await;
            (
                settings.storage.clone(),
                settings.managed_keys(),
                settings.remove_plain_on_sync,
            )
        };
        let slug = rule.slug().to_string();

        let result = self
            .inner
            .guard
            .run_exclusive(path, async {
                self.inner
                    .store
                    .process_frontmatter(
                        path,
                        Box::new(move |fm| {
                            apply_template(fm, &defaults, &storage, &slug, &managed, remove_plain)
                        }),
                    )
                    .await
            })
            .await;

        match result {
            None => Ok(TemplateOutcome::Busy),
            Some(Err(e)) => Err(e),
            Some(Ok(())) => {
                info!("applied template defaults to {}", path.display());
                Ok(TemplateOutcome::Applied)
            }
        }
    }

    /// Copy storage-key values back to alias keys for one document.
    ///
    /// `delete_storage` overrides the configured delete-on-restore
    /// flag when given.
    pub async fn restore_path(
        &self,
        path: &Path,
        delete_storage: Option<bool>,
    ) -> Result<RestoreOutcome> {
        let Some(scope) = self.scope_for(path).await else {
            return Ok(RestoreOutcome::NotScoped);
        };
        let delete = match delete_storage {
            Some(value) => value,
            None => self.inner.settings.read().await.delete_storage_on_restore,
        };

        let result = self
            .inner
            .guard
            .run_exclusive(path, async {
                let scope = scope.clone();
                self.inner
                    .store
                    .process_frontmatter(
                        path,
                        Box::new(move |fm| {
                            restore_aliases(fm, &scope.storage, &scope.slug, &scope.managed, delete)
                        }),
                    )
                    .await
            })
            .await;

        match result {
            None => Ok(RestoreOutcome::Busy),
            Some(Err(e)) => {
                warn!("Restore failed for {}: {}", path.display(), e);
                Err(e)
            }
            Some(Ok(())) => {
                debug!("restored aliases for {}", path.display());
                Ok(RestoreOutcome::Restored)
            }
        }
    }

    /// Restore many documents, continuing past per-document failures.
    pub async fn restore_paths(
        &self,
        paths: &[PathBuf],
        delete_storage: Option<bool>,
    ) -> RestoreSummary {
        let mut summary = RestoreSummary::default();
        for path in paths {
            match self.restore_path(path, delete_storage).await {
                Ok(RestoreOutcome::Restored) => summary.restored += 1,
                Ok(RestoreOutcome::NotScoped) => summary.not_scoped += 1,
                Ok(RestoreOutcome::Busy) => summary.busy += 1,
                Err(_) => summary.failed += 1,
            }
        }
        info!(
            "bulk restore: {} restored, {} unscoped, {} busy, {} failed",
            summary.restored, summary.not_scoped, summary.busy, summary.failed
        );
        summary
    }

    /// Cancel pending timers and clear in-flight markers. Writes
    /// already dispatched to the store complete independently.
    pub fn shutdown(&self) {
        self.inner.guard.shutdown();
        info!("sync manager shut down");
    }

    async fn scope_for(&self, path: &Path) -> Option<SyncScope> {
        let settings = self.inner.settings.read().await;
        let path_str = path.to_string_lossy();
        let rule = resolve_rule(&path_str, &settings.rules)?;
        let managed = settings.managed_keys();
        if managed.is_empty() {
            return None;
        }
        Some(SyncScope {
            slug: rule.slug().to_string(),
            managed,
            storage: settings.storage.clone(),
            remove_plain: settings.remove_plain_on_sync,
        })
    }
}

/// Everything a single engine operation needs from the settings,
/// resolved once per trigger.
#[derive(Debug, Clone)]
struct SyncScope {
    slug: String,
    managed: Vec<String>,
    storage: StorageKeyConfig,
    remove_plain: bool,
}
