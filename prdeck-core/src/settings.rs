//! Settings persistence
//!
//! The dashboard saves a snapshot of its filters and selections to the
//! backend (`/settings/filter_settings`) so the next session can restore them.
//!
//! Saves are debounced: every change re-arms a single timer, and only the
//! last snapshot of a burst is written. Nothing is saved until the restore
//! sequence has latched, so restoring a snapshot never writes it back.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::api::{DashboardApi, FILTER_SETTINGS_KEY};
use crate::error::Result;
use crate::filters::{FilterQuery, FilterSettings};

/// What gets persisted between sessions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSettingsSnapshot {
    #[serde(default)]
    pub filters: FilterSettings,
    #[serde(default)]
    pub selected_account_login: Option<String>,
    #[serde(default)]
    pub selected_repo_full_name: Option<String>,
}

/// Runs the most recently scheduled job after a quiet period.
///
/// Scheduling a new job aborts the pending one.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `job` after the delay unless another job is scheduled first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            job.await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Drop the pending job, if any.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    /// Whether a job is waiting for its delay to elapse (or running).
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Owns the persisted snapshot lifecycle: load, debounced save, restore latch.
pub struct SettingsStore {
    api: Arc<dyn DashboardApi>,
    debouncer: Debouncer,
    restored: AtomicBool,
    skip_next_save: AtomicBool,
    last_query: Mutex<Option<FilterQuery>>,
}

impl SettingsStore {
    pub fn new(api: Arc<dyn DashboardApi>, debounce: Duration) -> Self {
        Self {
            api,
            debouncer: Debouncer::new(debounce),
            restored: AtomicBool::new(false),
            skip_next_save: AtomicBool::new(false),
            last_query: Mutex::new(None),
        }
    }

    /// Fetch the saved snapshot. A missing key, a failed request or an
    /// unreadable payload all mean there is nothing to restore.
    pub async fn load_snapshot(&self) -> Option<PersistedSettingsSnapshot> {
        let value = match self.api.get_setting(FILTER_SETTINGS_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::debug!("No saved filter settings");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load saved filter settings");
                return None;
            }
        };

        match serde_json::from_value(value) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable filter settings");
                None
            }
        }
    }

    /// Write `snapshot` immediately.
    pub async fn save_now(&self, snapshot: &PersistedSettingsSnapshot) -> Result<()> {
        let value = serde_json::to_value(snapshot)?;
        self.api.save_setting(FILTER_SETTINGS_KEY, &value).await
    }

    /// Remove the saved snapshot.
    pub async fn clear(&self) -> Result<()> {
        self.debouncer.cancel();
        self.api.delete_setting(FILTER_SETTINGS_KEY).await
    }

    /// One-way latch: after this, changes are saved.
    pub fn mark_restored(&self) {
        if !self.restored.swap(true, Ordering::SeqCst) {
            tracing::info!("Settings restore complete, autosave enabled");
        }
    }

    pub fn is_restored(&self) -> bool {
        self.restored.load(Ordering::SeqCst)
    }

    /// Suppress the save that the next change would schedule.
    pub fn skip_next_save(&self) {
        self.skip_next_save.store(true, Ordering::SeqCst);
    }

    /// Called after every filter or selection change.
    ///
    /// Returns true when a save was scheduled.
    pub fn on_change(&self, snapshot: PersistedSettingsSnapshot) -> bool {
        if self.skip_next_save.swap(false, Ordering::SeqCst) {
            tracing::debug!("Skipping save for restored settings");
            return false;
        }
        if !self.is_restored() {
            return false;
        }

        let api = Arc::clone(&self.api);
        self.debouncer.schedule(async move {
            let value = match serde_json::to_value(&snapshot) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to serialize filter settings");
                    return;
                }
            };
            match api.save_setting(FILTER_SETTINGS_KEY, &value).await {
                Ok(()) => tracing::debug!("Filter settings saved"),
                Err(e) => tracing::warn!(error = %e, "Failed to save filter settings"),
            }
        });
        true
    }

    /// Derive the PR query for `filters`, returning it only if it differs
    /// from the last derived query.
    pub fn query_if_changed(&self, filters: &FilterSettings) -> Option<FilterQuery> {
        let query = filters.to_query();
        let mut last = self.last_query.lock().unwrap_or_else(PoisonError::into_inner);
        if last.as_ref() == Some(&query) {
            return None;
        }
        *last = Some(query.clone());
        Some(query)
    }

    /// Forget the memoized query so the next derivation counts as a change.
    pub fn reset_query(&self) {
        *self.last_query.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn save_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn cancel_pending_save(&self) {
        self.debouncer.cancel();
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field("restored", &self.is_restored())
            .field("debouncer", &self.debouncer)
            .finish()
    }
}
