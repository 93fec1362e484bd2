//! Dashboard coordinator
//!
//! [`Dashboard`] owns every resource slice and wires them to the current
//! account/repo selection and PR filters:
//!
//! - selecting an account loads its repos
//! - selecting a repo loads its PRs, then divergence and review scores
//! - a filter change refetches PRs only when the derived query changed
//! - every selection or filter change is offered to the settings store,
//!   which autosaves once the startup restore has latched
//!
//! Slice state sits behind a `std::sync::Mutex` that is never held across
//! an `.await`; each fetch takes a request token before awaiting and hands
//! it back afterwards so late responses cannot overwrite newer ones.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::{JoinHandle, JoinSet};

use crate::api::DashboardApi;
use crate::columns::{
    DeveloperColumn, HistoryColumn, LifecycleColumn, PrColumn, ReviewerColumn, WorkflowRunColumn,
};
use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::filters::{FilterField, FilterQuery, FilterSettings, FilterValue};
use crate::queue::MergeQueue;
use crate::restore::{RestoreAction, RestoreSequencer};
use crate::reviews::ReviewTracker;
use crate::settings::{PersistedSettingsSnapshot, SettingsStore};
use crate::slice::{ListSlice, ValueSlice};
use crate::types::{
    split_full_name, Account, CacheMeta, CodeActivity, ContributorTimeSeries, DeveloperStats,
    Divergence, DivergenceRequest, FilterOptions, HistoryQuery, LifecycleMetrics, LifecyclePr,
    PullRequest, QueuePr, Repository, ReviewDetail, ReviewHistoryEntry, ReviewResponsiveness,
    ReviewScore, ReviewStats, ReviewerStats, StartReviewRequest, StartReviewResponse, Workflow,
    WorkflowRun, WorkflowRunFilters, WorkflowStats,
};

/// Weeks of history requested for code activity by default
pub const DEFAULT_ACTIVITY_WEEKS: u32 = 52;

/// All resource slices shown by the dashboard.
#[derive(Debug)]
pub struct DashboardState {
    pub accounts: ListSlice<Account>,
    pub repos: ListSlice<Repository>,
    pub prs: ListSlice<PullRequest, PrColumn>,
    pub divergence: ValueSlice<HashMap<u64, Divergence>>,
    pub review_scores: ValueSlice<HashMap<u64, ReviewScore>>,
    /// Choices for the filter panel of the selected repo
    pub filter_options: ValueSlice<FilterOptions>,

    pub developer_stats: ListSlice<DeveloperStats, DeveloperColumn>,
    pub developer_cache: CacheMeta,
    pub code_activity: ValueSlice<CodeActivity>,
    /// Lifecycle summary; its PR table lives in `lifecycle_prs`
    pub lifecycle: ValueSlice<LifecycleMetrics>,
    pub lifecycle_prs: ListSlice<LifecyclePr, LifecycleColumn>,
    /// Responsiveness summary; its leaderboard lives in `reviewers`
    pub responsiveness: ValueSlice<ReviewResponsiveness>,
    pub reviewers: ListSlice<ReviewerStats, ReviewerColumn>,
    pub contributors: ListSlice<ContributorTimeSeries>,

    pub workflow_runs: ListSlice<WorkflowRun, WorkflowRunColumn>,
    pub workflow_stats: WorkflowStats,
    pub workflows: Vec<Workflow>,

    pub history: ListSlice<ReviewHistoryEntry, HistoryColumn>,
    pub review_stats: ValueSlice<ReviewStats>,
    /// All reviews of one PR in the selected repo
    pub pr_history: ListSlice<ReviewHistoryEntry, HistoryColumn>,
}

impl DashboardState {
    fn new(page_size: usize) -> Self {
        Self {
            accounts: ListSlice::with_page_size(page_size),
            repos: ListSlice::with_page_size(page_size),
            prs: ListSlice::with_page_size(page_size),
            divergence: ValueSlice::new(),
            review_scores: ValueSlice::new(),
            filter_options: ValueSlice::new(),
            developer_stats: ListSlice::with_page_size(page_size),
            developer_cache: CacheMeta::default(),
            code_activity: ValueSlice::new(),
            lifecycle: ValueSlice::new(),
            lifecycle_prs: ListSlice::with_page_size(page_size),
            responsiveness: ValueSlice::new(),
            reviewers: ListSlice::with_page_size(page_size),
            contributors: ListSlice::with_page_size(page_size),
            workflow_runs: ListSlice::with_page_size(page_size),
            workflow_stats: WorkflowStats::default(),
            workflows: Vec::new(),
            history: ListSlice::with_page_size(page_size),
            review_stats: ValueSlice::new(),
            pr_history: ListSlice::with_page_size(page_size),
        }
    }

    /// Drop everything scoped to the selected repo.
    fn clear_repo_scoped(&mut self) {
        self.prs.clear();
        self.divergence.clear();
        self.review_scores.clear();
        self.filter_options.clear();
        self.pr_history.clear();
        self.developer_stats.clear();
        self.developer_cache = CacheMeta::default();
        self.code_activity.clear();
        self.lifecycle.clear();
        self.lifecycle_prs.clear();
        self.responsiveness.clear();
        self.reviewers.clear();
        self.contributors.clear();
        self.workflow_runs.clear();
        self.workflow_stats = WorkflowStats::default();
        self.workflows.clear();
    }
}

#[derive(Debug, Clone, Default)]
struct Selection {
    account: Option<String>,
    repo: Option<String>,
    filters: FilterSettings,
}

impl Selection {
    fn snapshot(&self) -> PersistedSettingsSnapshot {
        PersistedSettingsSnapshot {
            filters: self.filters.clone(),
            selected_account_login: self.account.clone(),
            selected_repo_full_name: self.repo.clone(),
        }
    }

    fn owner_repo(&self) -> Option<(String, String)> {
        let full_name = self.repo.as_deref()?;
        let (owner, name) = split_full_name(full_name)?;
        Some((owner.to_string(), name.to_string()))
    }
}

fn pull_request_url(owner: &str, repo: &str, number: u64) -> String {
    format!("https://github.com/{owner}/{repo}/pull/{number}")
}

/// Fetch label, branch, contributor, milestone and team choices for a repo.
/// A list that fails to load is logged and left empty.
pub async fn fetch_filter_options(
    api: &dyn DashboardApi,
    owner: &str,
    repo: &str,
) -> FilterOptions {
    let (contributors, labels, branches, milestones, teams) = tokio::join!(
        api.repo_contributors(owner, repo),
        api.labels(owner, repo),
        api.branches(owner, repo),
        api.milestones(owner, repo),
        api.teams(owner, repo),
    );
    log_failure("contributors", &contributors);
    log_failure("labels", &labels);
    log_failure("branches", &branches);
    log_failure("milestones", &milestones);
    log_failure("teams", &teams);

    FilterOptions {
        contributors: contributors.unwrap_or_default(),
        labels: labels.unwrap_or_default(),
        branches: branches.unwrap_or_default(),
        milestones: milestones.unwrap_or_default(),
        teams: teams.unwrap_or_default(),
    }
}

fn log_failure<T>(what: &str, result: &Result<T>) {
    if let Err(e) = result {
        tracing::warn!(error = %e, "Failed to load {}", what);
    }
}

/// Coordinates slices, selection, filters, settings, queue and reviews.
pub struct Dashboard {
    api: Arc<dyn DashboardApi>,
    config: SyncConfig,
    settings: SettingsStore,
    queue: MergeQueue,
    reviews: ReviewTracker,
    state: Mutex<DashboardState>,
    selection: Mutex<Selection>,
    restore: Mutex<RestoreSequencer>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn DashboardApi>, config: SyncConfig) -> Self {
        Self {
            settings: SettingsStore::new(Arc::clone(&api), config.settings_debounce()),
            queue: MergeQueue::new(Arc::clone(&api)),
            reviews: ReviewTracker::new(Arc::clone(&api), config.review_poll_interval()),
            state: Mutex::new(DashboardState::new(config.page_size)),
            selection: Mutex::new(Selection::default()),
            restore: Mutex::new(RestoreSequencer::new()),
            api,
            config,
        }
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn selection(&self) -> MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn restore(&self) -> MutexGuard<'_, RestoreSequencer> {
        self.restore.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================
    // Accessors
    // ============================================

    /// Read slice state.
    pub fn view<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.state())
    }

    /// Change view-only slice state (sort, page).
    pub fn update_view(&self, f: impl FnOnce(&mut DashboardState)) {
        f(&mut self.state());
    }

    pub fn queue(&self) -> &MergeQueue {
        &self.queue
    }

    pub fn reviews(&self) -> &ReviewTracker {
        &self.reviews
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn selected_account(&self) -> Option<String> {
        self.selection().account.clone()
    }

    pub fn selected_repo(&self) -> Option<String> {
        self.selection().repo.clone()
    }

    pub fn filters(&self) -> FilterSettings {
        self.selection().filters.clone()
    }

    pub fn is_restored(&self) -> bool {
        self.settings.is_restored()
    }

    // ============================================
    // Startup
    // ============================================

    /// First mount: load the saved snapshot, then accounts, active reviews
    /// and the merge queue. The restore sequence continues from the
    /// account list as it arrives.
    pub async fn mount(&self) {
        let snapshot = self.settings.load_snapshot().await;
        let actions = self.restore().snapshot_loaded(snapshot);
        self.run_restore(actions).await;

        tokio::join!(
            self.load_accounts(),
            self.reviews.recover(),
            self.queue.load()
        );
    }

    /// Carry out restore actions in order.
    async fn run_restore(&self, actions: Vec<RestoreAction>) {
        let mut pending: VecDeque<RestoreAction> = actions.into();
        while let Some(action) = pending.pop_front() {
            tracing::debug!(?action, "Restore step");
            match action {
                RestoreAction::SelectAccount(login) => {
                    pending.extend(self.select_account_inner(&login).await);
                }
                RestoreAction::SelectRepo(full_name) => {
                    // PRs are fetched once the filters are applied
                    self.selection().repo = Some(full_name);
                    self.state().clear_repo_scoped();
                    self.settings.reset_query();
                }
                RestoreAction::Settle => {
                    tokio::time::sleep(self.config.restore_filter_delay()).await;
                }
                RestoreAction::ApplyFilters(filters) => {
                    self.settings.skip_next_save();
                    self.apply_filters(filters).await;
                }
                RestoreAction::Latch => self.settings.mark_restored(),
            }
        }
    }

    pub async fn load_accounts(&self) {
        let token = self.state().accounts.begin();
        let result = self.api.accounts().await;
        log_failure("accounts", &result);

        let loaded = result.as_ref().ok().cloned();
        if !self.state().accounts.finish(token, result) {
            return;
        }
        let actions = match loaded {
            Some(accounts) => {
                tracing::info!(count = accounts.len(), "Accounts loaded");
                self.restore().accounts_loaded(&accounts)
            }
            None => self.restore().abandon(),
        };
        self.run_restore(actions).await;
    }

    // ============================================
    // Selection
    // ============================================

    /// Select an account and load its repos.
    pub async fn select_account(&self, login: &str) {
        let mut actions = Vec::new();
        {
            let mut restore = self.restore();
            if !restore.is_done() && restore.pending_account() != Some(login) {
                actions.extend(restore.abandon());
            }
        }
        self.run_restore(actions).await;

        let actions = self.select_account_inner(login).await;
        self.run_restore(actions).await;
    }

    async fn select_account_inner(&self, login: &str) -> Vec<RestoreAction> {
        let snapshot = {
            let mut selection = self.selection();
            selection.account = Some(login.to_string());
            selection.repo = None;
            selection.snapshot()
        };
        {
            let mut state = self.state();
            state.repos.clear();
            state.clear_repo_scoped();
        }
        self.settings.on_change(snapshot);

        let token = self.state().repos.begin();
        let result = self
            .api
            .repos(login, self.config.repo_list_limit)
            .await;
        log_failure("repos", &result);

        let loaded = result.as_ref().ok().cloned();
        if !self.state().repos.finish(token, result) {
            return Vec::new();
        }
        match loaded {
            Some(repos) => {
                tracing::info!(account = login, count = repos.len(), "Repos loaded");
                self.restore().repos_loaded(login, &repos)
            }
            None => self.restore().abandon(),
        }
    }

    /// Select a repo (`owner/name`) and load its PRs.
    pub async fn select_repo(&self, full_name: &str) -> Result<()> {
        if split_full_name(full_name).is_none() {
            return Err(Error::NotFound(format!("not an owner/name repo: {full_name}")));
        }

        let snapshot = {
            let mut selection = self.selection();
            selection.repo = Some(full_name.to_string());
            selection.snapshot()
        };
        self.state().clear_repo_scoped();
        self.settings.on_change(snapshot.clone());

        self.settings.reset_query();
        if let Some(query) = self.settings.query_if_changed(&snapshot.filters) {
            self.load_prs(query).await;
        }
        Ok(())
    }

    // ============================================
    // Filters
    // ============================================

    /// Change one filter field.
    pub async fn set_filter(
        &self,
        field: FilterField,
        value: impl Into<FilterValue>,
    ) -> Result<()> {
        let snapshot = {
            let mut selection = self.selection();
            selection.filters.set(field, value)?;
            selection.snapshot()
        };
        self.after_filter_change(snapshot).await;
        Ok(())
    }

    /// Replace all filters at once.
    pub async fn apply_filters(&self, filters: FilterSettings) {
        let snapshot = {
            let mut selection = self.selection();
            selection.filters = filters;
            selection.snapshot()
        };
        self.after_filter_change(snapshot).await;
    }

    pub async fn reset_filters(&self) {
        self.apply_filters(FilterSettings::default()).await;
    }

    async fn after_filter_change(&self, snapshot: PersistedSettingsSnapshot) {
        let query = self.settings.query_if_changed(&snapshot.filters);
        self.settings.on_change(snapshot);
        match query {
            Some(query) => self.load_prs(query).await,
            None => tracing::debug!("Filter change left the PR query unchanged"),
        }
    }

    /// Refetch PRs with the current filters.
    pub async fn refresh_prs(&self) {
        let query = self.selection().filters.to_query();
        self.load_prs(query).await;
    }

    // ============================================
    // Pull requests
    // ============================================

    async fn load_prs(&self, query: FilterQuery) {
        let Some((owner, repo)) = self.selection().owner_repo() else {
            return;
        };

        let token = self.state().prs.begin();
        let result = self.api.pull_requests(&owner, &repo, &query).await;
        log_failure("pull requests", &result);

        let loaded = result.as_ref().ok().cloned();
        let applied = self.state().prs.finish(token, result);
        if let (true, Some(prs)) = (applied, loaded) {
            tracing::info!(repo = %format!("{owner}/{repo}"), count = prs.len(), "PRs loaded");
            tokio::join!(
                self.load_divergence(&owner, &repo, &prs),
                self.load_review_scores(&owner, &repo, &prs)
            );
        }
    }

    async fn load_divergence(&self, owner: &str, repo: &str, prs: &[PullRequest]) {
        let requests: Vec<DivergenceRequest> = prs
            .iter()
            .filter(|pr| pr.is_open())
            .map(DivergenceRequest::from)
            .collect();
        if requests.is_empty() {
            self.state().divergence.set_data(HashMap::new());
            return;
        }

        let token = self.state().divergence.begin();
        let result = self.api.divergence(owner, repo, &requests).await;
        log_failure("divergence", &result);
        self.state().divergence.finish(token, result);
    }

    async fn load_review_scores(&self, owner: &str, repo: &str, prs: &[PullRequest]) {
        let token = self.state().review_scores.begin();

        let mut lookups = JoinSet::new();
        for pr in prs {
            let api = Arc::clone(&self.api);
            let (owner, repo, number) = (owner.to_string(), repo.to_string(), pr.number);
            lookups.spawn(async move { (number, api.review_score(&owner, &repo, number).await) });
        }

        let mut scores = HashMap::new();
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((number, Ok(Some(score)))) => {
                    scores.insert(number, score);
                }
                Ok((_, Ok(None))) => {}
                Ok((number, Err(e))) => {
                    tracing::debug!(number, error = %e, "Review score lookup failed");
                }
                Err(e) => tracing::warn!(error = %e, "Review score task failed"),
            }
        }

        self.state()
            .review_scores
            .finish(token, Ok::<_, Error>(scores));
    }

    /// Load filter panel choices for the selected repo.
    pub async fn load_filter_options(&self) {
        let Some((owner, repo)) = self.selection().owner_repo() else {
            return;
        };
        let token = self.state().filter_options.begin();
        let options = fetch_filter_options(self.api.as_ref(), &owner, &repo).await;
        self.state()
            .filter_options
            .finish(token, Ok::<_, Error>(options));
    }

    // ============================================
    // Analytics
    // ============================================

    pub async fn load_developer_stats(&self, refresh: bool) {
        let Some((owner, repo)) = self.selection().owner_repo() else {
            return;
        };
        let token = self.state().developer_stats.begin();
        let result = self.api.developer_stats(&owner, &repo, refresh).await;
        log_failure("developer stats", &result);

        let mut state = self.state();
        match result {
            Ok(report) => {
                if state.developer_stats.finish(token, Ok::<_, Error>(report.stats)) {
                    state.developer_cache = report.cache;
                }
            }
            Err(e) => {
                state.developer_stats.finish(token, Err::<Vec<DeveloperStats>, _>(e));
            }
        }
    }

    pub async fn load_code_activity(&self, weeks: u32, refresh: bool) {
        let Some((owner, repo)) = self.selection().owner_repo() else {
            return;
        };
        let token = self.state().code_activity.begin();
        let result = self.api.code_activity(&owner, &repo, weeks, refresh).await;
        log_failure("code activity", &result);
        self.state().code_activity.finish(token, result);
    }

    pub async fn load_lifecycle_metrics(&self, refresh: bool) {
        let Some((owner, repo)) = self.selection().owner_repo() else {
            return;
        };
        let token = self.state().lifecycle.begin();
        let result = self.api.lifecycle_metrics(&owner, &repo, refresh).await;
        log_failure("lifecycle metrics", &result);

        let mut state = self.state();
        match result {
            Ok(mut metrics) => {
                let table = std::mem::take(&mut metrics.pr_table);
                if state.lifecycle.finish(token, Ok::<_, Error>(metrics)) {
                    state.lifecycle_prs.set_data(table);
                }
            }
            Err(e) => {
                state.lifecycle.finish(token, Err::<LifecycleMetrics, _>(e));
            }
        }
    }

    pub async fn load_review_responsiveness(&self, refresh: bool) {
        let Some((owner, repo)) = self.selection().owner_repo() else {
            return;
        };
        let token = self.state().responsiveness.begin();
        let result = self
            .api
            .review_responsiveness(&owner, &repo, refresh)
            .await;
        log_failure("review responsiveness", &result);

        let mut state = self.state();
        match result {
            Ok(mut report) => {
                let leaderboard = std::mem::take(&mut report.leaderboard);
                if state.responsiveness.finish(token, Ok::<_, Error>(report)) {
                    state.reviewers.set_data(leaderboard);
                }
            }
            Err(e) => {
                state
                    .responsiveness
                    .finish(token, Err::<ReviewResponsiveness, _>(e));
            }
        }
    }

    pub async fn load_contributors(&self, refresh: bool) {
        let Some((owner, repo)) = self.selection().owner_repo() else {
            return;
        };
        let token = self.state().contributors.begin();
        let result = self.api.contributor_timeseries(&owner, &repo, refresh).await;
        log_failure("contributors", &result);
        self.state().contributors.finish(token, result);
    }

    pub async fn load_workflow_runs(&self, filters: &WorkflowRunFilters, refresh: bool) {
        let Some((owner, repo)) = self.selection().owner_repo() else {
            return;
        };
        let token = self.state().workflow_runs.begin();
        let result = self
            .api
            .workflow_runs(&owner, &repo, filters, refresh)
            .await;
        log_failure("workflow runs", &result);

        let mut state = self.state();
        match result {
            Ok(report) => {
                if state.workflow_runs.finish(token, Ok::<_, Error>(report.runs)) {
                    state.workflow_stats = report.stats;
                    state.workflows = report.workflows;
                }
            }
            Err(e) => {
                state.workflow_runs.finish(token, Err::<Vec<WorkflowRun>, _>(e));
            }
        }
    }

    // ============================================
    // Review history
    // ============================================

    pub async fn load_review_history(&self, query: &HistoryQuery) {
        let token = self.state().history.begin();
        let result = self.api.review_history(query).await;
        log_failure("review history", &result);
        self.state().history.finish(token, result);
    }

    pub async fn load_review_stats(&self) {
        let token = self.state().review_stats.begin();
        let result = self.api.review_stats().await;
        log_failure("review stats", &result);
        self.state().review_stats.finish(token, result);
    }

    pub async fn review_detail(&self, review_id: i64) -> Result<ReviewDetail> {
        self.api.review_detail(review_id).await
    }

    /// Load every stored review of one PR in the selected repo.
    pub async fn load_pr_history(&self, number: u64) {
        let Some((owner, repo)) = self.selection().owner_repo() else {
            return;
        };
        let token = self.state().pr_history.begin();
        let result = self.api.pr_review_history(&owner, &repo, number).await;
        log_failure("PR review history", &result);
        self.state().pr_history.finish(token, result);
    }

    // ============================================
    // PR actions
    // ============================================

    fn find_pr(&self, number: u64) -> Option<PullRequest> {
        self.state()
            .prs
            .data()
            .iter()
            .find(|pr| pr.number == number)
            .cloned()
    }

    /// Add or remove a PR of the selected repo from the merge queue.
    pub fn toggle_queue(&self, number: u64) -> Option<JoinHandle<()>> {
        let repo = self.selected_repo()?;
        if self.queue.is_in_queue(number, &repo) {
            self.queue.remove(number, &repo)
        } else {
            let pr = self.find_pr(number)?;
            self.queue.add(QueuePr::from_pull_request(&pr, &repo))
        }
    }

    /// Start a review of a PR in the selected repo.
    pub async fn review_pr(&self, number: u64, followup: bool) -> Result<StartReviewResponse> {
        let repo = self
            .selected_repo()
            .ok_or_else(|| Error::NotFound("no repository selected".to_string()))?;
        self.review_pr_in(&repo, number, None, followup).await
    }

    /// Start a review of any PR, loaded or not.
    ///
    /// Title, author and the previous review come from the loaded PR list
    /// when `full_name` is the selected repo. Otherwise the previous review
    /// is looked up on the backend and `url` defaults to the GitHub PR page.
    /// A follow-up links to the latest known review of that PR.
    pub async fn review_pr_in(
        &self,
        full_name: &str,
        number: u64,
        url: Option<String>,
        followup: bool,
    ) -> Result<StartReviewResponse> {
        let (owner, repo) = split_full_name(full_name)
            .ok_or_else(|| Error::NotFound(format!("not an owner/name repo: {full_name}")))?;

        let selected = self.selected_repo().as_deref() == Some(full_name);
        let pr = if selected { self.find_pr(number) } else { None };

        let previous_review_id = if !followup {
            None
        } else {
            match self.loaded_score_id(selected, number) {
                Some(id) => Some(id),
                None => match self.api.review_score(owner, repo, number).await {
                    Ok(score) => score.map(|s| s.id),
                    Err(e) => {
                        // The backend falls back to the latest review itself.
                        tracing::debug!(number, error = %e, "Previous review lookup failed");
                        None
                    }
                },
            }
        };

        let url = url
            .or_else(|| pr.as_ref().map(|pr| pr.url.clone()))
            .unwrap_or_else(|| pull_request_url(owner, repo, number));

        let request = StartReviewRequest {
            number,
            url,
            owner: owner.to_string(),
            repo: repo.to_string(),
            title: pr.as_ref().map(|pr| pr.title.clone()),
            author: pr.as_ref().map(|pr| pr.author_login().to_string()),
            is_followup: followup,
            previous_review_id,
        };
        self.reviews.start(request).await
    }

    fn loaded_score_id(&self, selected: bool, number: u64) -> Option<i64> {
        if !selected {
            return None;
        }
        self.state()
            .review_scores
            .data()
            .and_then(|scores| scores.get(&number))
            .map(|score| score.id)
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let selection = self.selection();
        f.debug_struct("Dashboard")
            .field("account", &selection.account)
            .field("repo", &selection.repo)
            .field("restored", &self.settings.is_restored())
            .finish()
    }
}
