//! Background save sync orchestrator.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;

use crate::config::{DeviceLayout, SyncSettings};
use crate::models::{SyncAction, SyncIssue, SyncItem};
use crate::remote::RemoteCatalog;
use crate::state::SyncStatus;
use crate::sync::{find_save_syncs, requires_emulator_selection, SyncExecutor, SyncOutcome};
use crate::{Error, Result};

/// Counts from the most recent cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub uploaded: usize,
    pub downloaded: usize,
    /// Items held back until someone picks an emulator folder
    pub needs_emulator: usize,
    pub failed: usize,
    /// Set when the cycle could not get as far as deciding items
    pub cycle_error: Option<String>,
}

/// Runs scan, decide and execute cycles on a background task.
///
/// Cheap to clone; clones share the same flags and issue list. Only one
/// cycle runs at a time and [`AutoSync::start`] is a no-op while one is in
/// flight. Issues survive across cycles until cleared, removed, resolved, or
/// a later cycle transfers the same game successfully.
#[derive(Clone)]
pub struct AutoSync {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: Arc<dyn RemoteCatalog>,
    executor: SyncExecutor,
    settings: SyncSettings,
    running: AtomicBool,
    has_issues: AtomicBool,
    show_button: AtomicBool,
    status: AtomicU8,
    issues: Mutex<Vec<SyncIssue>>,
    summary: Mutex<SyncSummary>,
    done: Mutex<watch::Receiver<bool>>,
}

impl AutoSync {
    pub fn new(catalog: Arc<dyn RemoteCatalog>, layout: DeviceLayout, settings: SyncSettings) -> Self {
        let executor = SyncExecutor::new(catalog.clone(), layout);
        Self::with_executor(catalog, executor, settings)
    }

    /// Build around a preconfigured executor, e.g. one with its own staging
    /// directory.
    pub fn with_executor(
        catalog: Arc<dyn RemoteCatalog>,
        executor: SyncExecutor,
        settings: SyncSettings,
    ) -> Self {
        let (_, done) = watch::channel(true);
        Self {
            inner: Arc::new(Inner {
                catalog,
                executor,
                settings,
                running: AtomicBool::new(false),
                has_issues: AtomicBool::new(false),
                show_button: AtomicBool::new(false),
                status: AtomicU8::new(SyncStatus::Idle.as_u8()),
                issues: Mutex::new(Vec::new()),
                summary: Mutex::new(SyncSummary::default()),
                done: Mutex::new(done),
            }),
        }
    }

    /// Begin a cycle on the current tokio runtime.
    ///
    /// Returns `false` without doing anything when a cycle is already running.
    pub fn start(&self) -> bool {
        // Held across the flag flip so `wait` never sees a running cycle
        // paired with the previous cycle's finished receiver.
        let mut done = lock(&self.inner.done);
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("AutoSync already running");
            return false;
        }

        let (done_tx, done_rx) = watch::channel(false);
        *done = done_rx;
        drop(done);

        let inner = self.inner.clone();
        tokio::spawn(async move {
            let _guard = CycleGuard {
                inner: inner.clone(),
                done: done_tx,
            };
            inner.run_cycle().await;
        });
        true
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Wait for the cycle started by the latest [`AutoSync::start`].
    ///
    /// Returns immediately when no cycle was ever started.
    pub async fn wait(&self) {
        let mut done = lock(&self.inner.done).clone();
        // The sender always publishes `true` before it is dropped.
        let _ = done.wait_for(|finished| *finished).await;
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus::from_u8(self.inner.status.load(Ordering::Acquire))
    }

    pub fn has_issues(&self) -> bool {
        self.inner.has_issues.load(Ordering::Acquire)
    }

    /// Whether an action button for the issue list should be shown.
    pub fn show_button(&self) -> bool {
        self.inner.show_button.load(Ordering::Acquire)
    }

    /// Snapshot of the current issues.
    pub fn issues(&self) -> Vec<SyncIssue> {
        lock(&self.inner.issues).clone()
    }

    pub fn last_summary(&self) -> SyncSummary {
        lock(&self.inner.summary).clone()
    }

    /// Drop every issue and reset the status indicator.
    pub fn clear_issues(&self) {
        self.inner.reset_issues(SyncStatus::Idle);
    }

    /// Drop every issue and show the indicator as clean.
    pub fn mark_complete(&self) {
        self.inner.reset_issues(SyncStatus::Clean);
    }

    /// Remove the issue for the same game and platform, if present.
    pub fn remove_issue(&self, issue: &SyncIssue) -> bool {
        self.inner.remove_issue(&issue.item)
    }

    /// Execute an issue's item from the foreground, optionally into a chosen
    /// emulator folder.
    ///
    /// The issue is removed on success. On failure it stays listed with the
    /// new error message.
    pub async fn resolve_issue(&self, issue: &SyncIssue, emulator: Option<&str>) -> Result<SyncOutcome> {
        let mut item = issue.item.clone();
        if let Some(emulator) = emulator {
            // Rejected up front so the listed issue keeps its original state.
            self.inner.executor.layout().emulator_save_directory(&item.slug, emulator)?;
            item.set_selected_emulator(emulator);
        }
        if requires_emulator_selection(&item, self.inner.executor.layout()) {
            return Err(Error::InvalidInput(format!(
                "select an emulator folder for {}",
                item.display_name()
            )));
        }

        match self.inner.executor.execute(&item).await {
            Ok(outcome) => {
                self.inner.remove_issue(&item);
                tracing::info!(game = %item.game_base, slug = %item.slug, "Resolved sync issue");
                Ok(outcome)
            }
            Err(error) => {
                tracing::error!(game = %item.game_base, error = %error, "Failed to resolve sync issue");
                self.inner.add_issue(SyncIssue::failed(item, error.to_string()));
                Err(error)
            }
        }
    }
}

impl Inner {
    fn set_status(&self, status: SyncStatus) {
        self.status.store(status.as_u8(), Ordering::Release);
    }

    async fn hold_indicator(&self, status: SyncStatus) {
        self.set_status(status);
        let delay = self.settings.indicator_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    async fn run_cycle(&self) {
        self.hold_indicator(SyncStatus::Scanning).await;
        tracing::debug!("AutoSync: Starting save sync scan");

        let mut summary = SyncSummary::default();
        let plan = match find_save_syncs(self.catalog.as_ref(), self.executor.layout()).await {
            Ok(plan) => plan,
            Err(error) => {
                tracing::error!(error = %error, "AutoSync: Failed to find save syncs");
                summary.cycle_error = Some(error.to_string());
                *lock(&self.summary) = summary;
                self.has_issues.store(true, Ordering::Release);
                self.show_button.store(true, Ordering::Release);
                self.set_status(SyncStatus::Issues);
                return;
            }
        };

        tracing::debug!(count = plan.items.len(), "AutoSync: Found syncs");
        for item in plan.items {
            self.process_item(item, &mut summary).await;
        }

        let remaining = lock(&self.issues).len();
        if remaining == 0 {
            self.has_issues.store(false, Ordering::Release);
            self.show_button.store(false, Ordering::Release);
            self.set_status(SyncStatus::Clean);
            tracing::info!(
                uploaded = summary.uploaded,
                downloaded = summary.downloaded,
                "AutoSync: Completed successfully"
            );
        } else {
            self.has_issues.store(true, Ordering::Release);
            self.show_button.store(true, Ordering::Release);
            self.set_status(SyncStatus::Issues);
            tracing::info!(
                uploaded = summary.uploaded,
                downloaded = summary.downloaded,
                needs_emulator = summary.needs_emulator,
                failed = summary.failed,
                remaining,
                "AutoSync: Completed with issues"
            );
        }
        *lock(&self.summary) = summary;
    }

    async fn process_item(&self, item: SyncItem, summary: &mut SyncSummary) {
        if requires_emulator_selection(&item, self.executor.layout()) {
            tracing::debug!(game = %item.game_base, "AutoSync: Skipping sync that needs emulator selection");
            summary.needs_emulator += 1;
            self.add_issue(SyncIssue::needs_emulator(item));
            return;
        }

        match item.action {
            SyncAction::Upload => self.hold_indicator(SyncStatus::Uploading).await,
            SyncAction::Download => self.hold_indicator(SyncStatus::Downloading).await,
            SyncAction::Skip => return,
        }

        match self.executor.execute(&item).await {
            Ok(outcome) => {
                tracing::debug!(game = %item.game_base, action = %outcome.action, "AutoSync: Sync successful");
                match outcome.action {
                    SyncAction::Upload => summary.uploaded += 1,
                    SyncAction::Download => summary.downloaded += 1,
                    SyncAction::Skip => {}
                }
                self.remove_issue(&item);
            }
            Err(error) => {
                tracing::error!(game = %item.game_base, error = %error, "AutoSync: Sync failed");
                summary.failed += 1;
                self.add_issue(SyncIssue::failed(item, error.to_string()));
            }
        }
    }

    /// File an issue, replacing any earlier one for the same game.
    fn add_issue(&self, issue: SyncIssue) {
        let mut issues = lock(&self.issues);
        if let Some(existing) = issues.iter_mut().find(|existing| existing.same_target(&issue)) {
            *existing = issue;
        } else {
            issues.push(issue);
        }
        self.has_issues.store(true, Ordering::Release);
    }

    fn remove_issue(&self, item: &SyncItem) -> bool {
        let mut issues = lock(&self.issues);
        let before = issues.len();
        issues.retain(|existing| {
            !(existing.item.game_base == item.game_base && existing.item.slug == item.slug)
        });
        let removed = issues.len() != before;
        if issues.is_empty() {
            self.has_issues.store(false, Ordering::Release);
            self.show_button.store(false, Ordering::Release);
        }
        removed
    }

    fn reset_issues(&self, status: SyncStatus) {
        lock(&self.issues).clear();
        self.has_issues.store(false, Ordering::Release);
        self.show_button.store(false, Ordering::Release);
        self.set_status(status);
    }
}

/// Clears the running flag and signals waiters when a cycle ends, even if
/// the cycle panicked.
struct CycleGuard {
    inner: Arc<Inner>,
    done: watch::Sender<bool>,
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.inner.running.store(false, Ordering::Release);
        self.done.send_replace(true);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
