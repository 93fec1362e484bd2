//! Active code-review jobs and their poller
//!
//! Review jobs run on the backend for minutes. While at least one job is
//! `running`, a background task re-fetches `GET /reviews` every poll
//! interval; once none are running the task stops. Scheduling is level
//! triggered: [`ReviewTracker::reschedule`] runs after every state change and
//! only looks at whether anything is running right now.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::api::DashboardApi;
use crate::error::{Error, Result};
use crate::slice::ListSlice;
use crate::types::{
    parse_review_key, ActiveReview, InlineCommentsResult, NewCommitsCheck, ReviewSection,
    StartReviewRequest, StartReviewResponse,
};

/// Default interval between polls while a review is running
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

struct Inner {
    api: Arc<dyn DashboardApi>,
    poll_interval: Duration,
    reviews: Mutex<ListSlice<ActiveReview>>,
    /// Placeholders for starts whose `POST /reviews` has not answered yet
    starting: Mutex<HashMap<String, ActiveReview>>,
    poller: Mutex<Option<JoinHandle<()>>>,
    recovered: AtomicBool,
}

impl Inner {
    fn reviews(&self) -> MutexGuard<'_, ListSlice<ActiveReview>> {
        self.reviews.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn starting(&self) -> MutexGuard<'_, HashMap<String, ActiveReview>> {
        self.starting.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn any_running(&self) -> bool {
        self.reviews().data().iter().any(ActiveReview::is_running)
    }

    /// Fetch the full job list into state. Returns whether any job is running.
    async fn refresh(&self) -> bool {
        let token = self.reviews().begin();
        let result = self.api.active_reviews().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Failed to fetch active reviews");
        }
        let mut reviews = self.reviews();
        if reviews.finish(token, result) {
            // The backend may not list a job until its start request returns.
            let starting = self.starting();
            reviews.update(|list| {
                for (key, placeholder) in starting.iter() {
                    if !list.iter().any(|r| &r.key == key) {
                        list.push(placeholder.clone());
                    }
                }
            });
        }
        drop(reviews);
        self.any_running()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let poller = self.poller.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = poller.take() {
            handle.abort();
        }
    }
}

/// Tracks backend review jobs keyed `owner/repo/number`.
#[derive(Clone)]
pub struct ReviewTracker {
    inner: Arc<Inner>,
}

impl ReviewTracker {
    pub fn new(api: Arc<dyn DashboardApi>, poll_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                poll_interval,
                reviews: Mutex::new(ListSlice::new()),
                starting: Mutex::new(HashMap::new()),
                poller: Mutex::new(None),
                recovered: AtomicBool::new(false),
            }),
        }
    }

    pub fn reviews(&self) -> Vec<ActiveReview> {
        self.inner.reviews().data().to_vec()
    }

    pub fn get(&self, key: &str) -> Option<ActiveReview> {
        self.inner
            .reviews()
            .data()
            .iter()
            .find(|r| r.key == key)
            .cloned()
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.get(key).is_some_and(|r| r.is_running())
    }

    pub fn running_count(&self) -> usize {
        self.inner
            .reviews()
            .data()
            .iter()
            .filter(|r| r.is_running())
            .count()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.reviews().error().map(str::to_string)
    }

    pub fn poll_interval(&self) -> Duration {
        self.inner.poll_interval
    }

    /// Whether the poll task is armed.
    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Pick up jobs that were already running before this session.
    /// Only the first call fetches.
    pub async fn recover(&self) {
        if self.inner.recovered.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::info!("Recovering active reviews");
        self.refresh().await;
    }

    /// Re-fetch all jobs now.
    pub async fn refresh(&self) {
        self.inner.refresh().await;
        self.reschedule();
    }

    /// Arm the poller if anything is running, tear it down otherwise.
    pub fn reschedule(&self) {
        let running = self.inner.any_running();
        let mut poller = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let armed = poller.as_ref().is_some_and(|h| !h.is_finished());
        match (running, armed) {
            (true, false) => {
                tracing::debug!(interval = ?self.inner.poll_interval, "Arming review poller");
                *poller = Some(spawn_poller(
                    Arc::downgrade(&self.inner),
                    self.inner.poll_interval,
                ));
            }
            (false, true) => {
                tracing::debug!("Tearing down review poller");
                if let Some(handle) = poller.take() {
                    handle.abort();
                }
            }
            _ => {}
        }
    }

    /// Start a review. A `running` entry is shown right away and removed
    /// again if the backend refuses (e.g. a review is already in progress).
    ///
    /// Until the backend answers, refreshes that do not list the job yet
    /// keep the placeholder.
    pub async fn start(&self, request: StartReviewRequest) -> Result<StartReviewResponse> {
        let key = request.key();
        {
            let mut reviews = self.inner.reviews();
            if reviews.data().iter().any(|r| r.key == key && r.is_running()) {
                return Err(Error::Conflict(format!(
                    "Review already in progress for {key}"
                )));
            }
            let placeholder = ActiveReview::starting(&request);
            self.inner
                .starting()
                .insert(key.clone(), placeholder.clone());
            // A refresh already in flight predates this job.
            reviews.invalidate();
            reviews.update(|list| {
                list.retain(|r| r.key != key);
                list.push(placeholder);
            });
        }
        self.reschedule();

        let result = self.inner.api.start_review(&request).await;
        let placeholder = self.inner.starting().remove(&key);

        match result {
            Ok(response) => {
                tracing::info!(%key, followup = response.is_followup, "Review started");
                self.inner.reviews().update(|list| {
                    match list.iter_mut().find(|r| r.key == key) {
                        Some(entry) => {
                            entry.review_file = response.review_file.clone();
                            entry.is_followup = response.is_followup;
                        }
                        None => {
                            let mut entry =
                                placeholder.unwrap_or_else(|| ActiveReview::starting(&request));
                            entry.review_file = response.review_file.clone();
                            entry.is_followup = response.is_followup;
                            list.push(entry);
                        }
                    }
                });
                self.reschedule();
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "Failed to start review");
                self.inner
                    .reviews()
                    .update(|list| list.retain(|r| r.key != key));
                self.reschedule();
                Err(e)
            }
        }
    }

    /// Cancel a job on the backend, then drop it locally.
    pub async fn cancel(&self, key: &str) -> Result<()> {
        let (owner, repo, number) = parse_review_key(key)
            .ok_or_else(|| Error::NotFound(format!("malformed review key: {key}")))?;

        match self.inner.api.cancel_review(owner, repo, number).await {
            Ok(()) => tracing::info!(key, "Review cancelled"),
            // Already gone on the backend; forget it here too.
            Err(Error::NotFound(_)) => tracing::debug!(key, "Review unknown to backend"),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to cancel review");
                return Err(e);
            }
        }

        self.inner
            .reviews()
            .update(|list| list.retain(|r| r.key != key));
        self.reschedule();
        Ok(())
    }

    /// Fetch one job's status and merge it into state.
    pub async fn status(&self, key: &str) -> Result<ActiveReview> {
        let (owner, repo, number) = parse_review_key(key)
            .ok_or_else(|| Error::NotFound(format!("malformed review key: {key}")))?;

        let mut status = self.inner.api.review_status(owner, repo, number).await?;
        // The status endpoint omits the key parts.
        status.owner = owner.to_string();
        status.repo = repo.to_string();
        status.pr_number = number;

        let merged = status.clone();
        self.inner.reviews().update(|list| {
            match list.iter_mut().find(|r| r.key == merged.key) {
                // Never move a finished job back to running.
                Some(entry) if entry.status.is_terminal() && !merged.status.is_terminal() => {}
                Some(entry) => *entry = merged,
                None => list.push(merged),
            }
        });
        self.reschedule();
        Ok(status)
    }

    pub async fn post_inline_comments(
        &self,
        review_id: i64,
        section: ReviewSection,
    ) -> Result<InlineCommentsResult> {
        let result = self
            .inner
            .api
            .post_inline_comments(review_id, section)
            .await?;
        tracing::info!(
            review_id,
            ?section,
            posted = result.issues_posted,
            "Posted inline review comments"
        );
        Ok(result)
    }

    pub async fn check_new_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<NewCommitsCheck> {
        self.inner.api.check_new_commits(owner, repo, number).await
    }
}

impl std::fmt::Debug for ReviewTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewTracker")
            .field("running", &self.running_count())
            .field("polling", &self.is_polling())
            .finish()
    }
}

/// Poll until nothing is running or the tracker is gone.
fn spawn_poller(inner: Weak<Inner>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;
            let Some(inner) = inner.upgrade() else {
                break;
            };
            if !inner.refresh().await {
                tracing::debug!("No running reviews, poller exiting");
                break;
            }
        }
    })
}
