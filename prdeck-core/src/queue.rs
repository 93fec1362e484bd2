//! Merge queue with optimistic updates
//!
//! Queue mutations change local state first, then tell the backend in a
//! background task, then re-fetch the whole queue ([`MergeQueue::reconcile_queue`]).
//! The re-fetch runs whether the write succeeded or not, so a failed write
//! is undone by the server's answer rather than by local rollback.
//!
//! Each mutation returns the [`JoinHandle`] of its background task; callers
//! that need the settled state (tests, the CLI) can await it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;

use crate::api::DashboardApi;
use crate::columns::QueueColumn;
use crate::error::Result;
use crate::slice::ListSlice;
use crate::types::{MergeQueueItem, QueueKey, QueueNote, QueuePr};

#[derive(Debug, Default)]
struct QueueState {
    items: ListSlice<MergeQueueItem, QueueColumn>,
    notes: HashMap<QueueKey, ListSlice<QueueNote>>,
}

impl QueueState {
    fn adjust_notes_count(&mut self, key: &QueueKey, delta: i64) {
        self.items.update(|items| {
            if let Some(item) = items.iter_mut().find(|i| i.matches(key.number, &key.repo)) {
                let count = i64::from(item.notes_count) + delta;
                item.notes_count = u32::try_from(count.max(0)).unwrap_or(u32::MAX);
            }
        });
    }
}

/// The personal merge queue and its per-item notes.
#[derive(Clone)]
pub struct MergeQueue {
    api: Arc<dyn DashboardApi>,
    state: Arc<Mutex<QueueState>>,
}

impl MergeQueue {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(QueueState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the queue slice.
    pub fn with_items<R>(
        &self,
        f: impl FnOnce(&ListSlice<MergeQueueItem, QueueColumn>) -> R,
    ) -> R {
        f(&self.lock().items)
    }

    pub fn items(&self) -> Vec<MergeQueueItem> {
        self.lock().items.data().to_vec()
    }

    pub fn is_in_queue(&self, number: u64, repo: &str) -> bool {
        self.lock().items.data().iter().any(|i| i.matches(number, repo))
    }

    pub fn set_sort(&self, column: QueueColumn) {
        self.lock().items.set_sort(column);
    }

    pub fn set_page(&self, page: usize) {
        self.lock().items.set_page(page);
    }

    /// Initial load; same as a reconcile.
    pub async fn load(&self) {
        self.reconcile_queue().await;
    }

    /// Replace local queue state with the backend's.
    pub async fn reconcile_queue(&self) {
        reconcile(&self.api, &self.state).await;
    }

    /// Queue `pr`. Returns `None` when it is already queued.
    pub fn add(&self, pr: QueuePr) -> Option<JoinHandle<()>> {
        {
            let mut state = self.lock();
            if state.items.data().iter().any(|i| i.matches(pr.number, &pr.repo)) {
                tracing::debug!(key = %pr.key(), "PR already queued");
                return None;
            }
            let placeholder = MergeQueueItem::placeholder(&pr);
            state.items.update(|items| items.push(placeholder));
        }

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        Some(tokio::spawn(async move {
            match api.add_to_queue(&pr).await {
                Ok(item) => tracing::info!(key = %item.key(), "Added to merge queue"),
                Err(e) => {
                    tracing::warn!(key = %pr.key(), error = %e, "Failed to add to merge queue")
                }
            }
            reconcile(&api, &state).await;
        }))
    }

    /// Dequeue a PR. Returns `None` when it is not queued.
    pub fn remove(&self, number: u64, repo: &str) -> Option<JoinHandle<()>> {
        let key = QueueKey::new(number, repo);
        {
            let mut state = self.lock();
            if !state.items.data().iter().any(|i| i.matches(number, repo)) {
                return None;
            }
            state.items.update(|items| items.retain(|i| !i.matches(number, repo)));
            state.notes.remove(&key);
        }

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        Some(tokio::spawn(async move {
            match api.remove_from_queue(key.number, &key.repo).await {
                Ok(()) => tracing::info!(%key, "Removed from merge queue"),
                Err(e) => tracing::warn!(%key, error = %e, "Failed to remove from merge queue"),
            }
            reconcile(&api, &state).await;
        }))
    }

    /// Replace the queue order. Entries missing from `order` keep their
    /// relative order after the listed ones.
    pub fn reorder(&self, order: Vec<QueueKey>) -> JoinHandle<()> {
        let full_order = {
            let mut state = self.lock();
            state.items.update(|items| apply_order(items, &order));
            state.items.data().iter().map(MergeQueueItem::key).collect::<Vec<_>>()
        };

        let api = Arc::clone(&self.api);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if let Err(e) = api.reorder_queue(&full_order).await {
                tracing::warn!(error = %e, "Failed to reorder merge queue");
            }
            reconcile(&api, &state).await;
        })
    }

    /// Move the item at `from` to `to` (positions in queue order).
    pub fn move_item(&self, from: usize, to: usize) -> Option<JoinHandle<()>> {
        let mut order: Vec<QueueKey> = self
            .lock()
            .items
            .data()
            .iter()
            .map(MergeQueueItem::key)
            .collect();
        if from >= order.len() || to >= order.len() {
            return None;
        }
        let key = order.remove(from);
        order.insert(to, key);
        Some(self.reorder(order))
    }

    // ============================================
    // Notes
    // ============================================

    pub fn notes(&self, key: &QueueKey) -> Vec<QueueNote> {
        self.lock()
            .notes
            .get(key)
            .map(|slice| slice.data().to_vec())
            .unwrap_or_default()
    }

    pub fn notes_error(&self, key: &QueueKey) -> Option<String> {
        self.lock()
            .notes
            .get(key)
            .and_then(|slice| slice.error().map(str::to_string))
    }

    pub async fn load_notes(&self, key: &QueueKey) {
        let token = self.lock().notes.entry(key.clone()).or_default().begin();
        let result = self.api.queue_notes(key.number, &key.repo).await;
        if let Err(e) = &result {
            tracing::warn!(%key, error = %e, "Failed to load queue notes");
        }
        self.lock()
            .notes
            .entry(key.clone())
            .or_default()
            .finish(token, result);
    }

    pub async fn add_note(&self, key: &QueueKey, content: &str) -> Result<QueueNote> {
        let note = match self.api.add_queue_note(key.number, &key.repo, content).await {
            Ok(note) => note,
            Err(e) => {
                tracing::warn!(%key, error = %e, "Failed to add queue note");
                return Err(e);
            }
        };

        let mut state = self.lock();
        let added = note.clone();
        state
            .notes
            .entry(key.clone())
            .or_default()
            .update(|notes| notes.push(added));
        state.adjust_notes_count(key, 1);
        Ok(note)
    }

    pub async fn delete_note(&self, key: &QueueKey, note_id: i64) -> Result<()> {
        if let Err(e) = self.api.delete_queue_note(note_id).await {
            tracing::warn!(%key, note_id, error = %e, "Failed to delete queue note");
            return Err(e);
        }

        let mut state = self.lock();
        if let Some(slice) = state.notes.get_mut(key) {
            slice.update(|notes| notes.retain(|n| n.id != note_id));
        }
        state.adjust_notes_count(key, -1);
        Ok(())
    }
}

impl std::fmt::Debug for MergeQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeQueue")
            .field("items", &self.lock().items.len())
            .finish()
    }
}

async fn reconcile(api: &Arc<dyn DashboardApi>, state: &Arc<Mutex<QueueState>>) {
    let token = state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .items
        .begin();

    let result = api.merge_queue().await;
    match &result {
        Ok(items) => tracing::debug!(count = items.len(), "Merge queue reconciled"),
        Err(e) => tracing::warn!(error = %e, "Failed to fetch merge queue"),
    }

    state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .items
        .finish(token, result);
}

/// Reorder `items` to follow `order`; unlisted items keep their relative
/// order after the listed ones.
fn apply_order(items: &mut Vec<MergeQueueItem>, order: &[QueueKey]) {
    let rank: HashMap<&QueueKey, usize> = order.iter().enumerate().map(|(i, k)| (k, i)).collect();
    let mut keyed: Vec<(usize, MergeQueueItem)> = items
        .drain(..)
        .map(|item| {
            let position = rank.get(&item.key()).copied().unwrap_or(usize::MAX);
            (position, item)
        })
        .collect();
    keyed.sort_by_key(|(position, _)| *position);
    items.extend(keyed.into_iter().map(|(_, item)| item));
}
