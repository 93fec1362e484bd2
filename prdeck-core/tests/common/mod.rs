//! In-memory dashboard backend for integration tests.
//!
//! Records every call so tests can assert on what the sync layer asked for.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use prdeck_core::api::{DashboardApi, FILTER_SETTINGS_KEY};
use prdeck_core::filters::FilterQuery;
use prdeck_core::types::*;
use prdeck_core::{Error, Result};
use serde_json::{json, Value};

#[derive(Default)]
pub struct FakeState {
    pub calls: Vec<String>,
    pub accounts: Vec<Account>,
    pub repos: HashMap<String, Vec<Repository>>,
    pub prs: Vec<PullRequest>,
    pub pr_queries: Vec<FilterQuery>,
    /// Delay applied to successive `pull_requests` calls, popped in order
    pub pr_delays: VecDeque<Duration>,
    /// Delay applied to successive `accounts` calls; the list is read
    /// before sleeping
    pub account_delays: VecDeque<Duration>,
    pub queue: Vec<MergeQueueItem>,
    pub next_queue_id: i64,
    pub fail_queue_writes: bool,
    pub notes: HashMap<QueueKey, Vec<QueueNote>>,
    pub reviews: Vec<ActiveReview>,
    /// Every accepted start request, in order
    pub started: Vec<StartReviewRequest>,
    /// How long `start_review` takes before the job is registered
    pub start_delay: Option<Duration>,
    pub settings: HashMap<String, Value>,
    pub saved: Vec<Value>,
    pub fail_accounts: bool,
    pub fail_branches: bool,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        prdeck_core::logging::init_test();
        Arc::new(Self::default())
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    fn record(&self, call: impl Into<String>) {
        self.state().calls.push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    pub fn pr_queries(&self) -> Vec<FilterQuery> {
        self.state().pr_queries.clone()
    }

    pub fn saved(&self) -> Vec<Value> {
        self.state().saved.clone()
    }

    pub fn set_review_status(&self, key: &str, status: ReviewStatus) {
        let mut state = self.state();
        if let Some(review) = state.reviews.iter_mut().find(|r| r.key == key) {
            review.status = status;
        }
    }
}

pub fn account(login: &str) -> Account {
    serde_json::from_value(json!({ "login": login, "type": "org" })).unwrap()
}

pub fn repo(owner: &str, name: &str) -> Repository {
    serde_json::from_value(json!({ "name": name, "owner": { "login": owner } })).unwrap()
}

pub fn pull_request(number: u64, author: &str) -> PullRequest {
    serde_json::from_value(json!({
        "number": number,
        "title": format!("PR {number}"),
        "url": format!("https://github.com/acme/widgets/pull/{number}"),
        "author": { "login": author },
        "state": "OPEN",
        "headRefName": format!("feature-{number}"),
        "baseRefName": "main",
    }))
    .unwrap()
}

pub fn queue_pr(number: u64, repo: &str) -> QueuePr {
    QueuePr {
        number,
        repo: repo.to_string(),
        title: format!("PR {number}"),
        url: format!("https://github.com/{repo}/pull/{number}"),
        author: "alice".to_string(),
        additions: 10,
        deletions: 2,
    }
}

pub fn review_request(owner: &str, repo: &str, number: u64) -> StartReviewRequest {
    StartReviewRequest {
        number,
        url: format!("https://github.com/{owner}/{repo}/pull/{number}"),
        owner: owner.to_string(),
        repo: repo.to_string(),
        title: Some(format!("PR {number}")),
        author: Some("alice".to_string()),
        is_followup: false,
        previous_review_id: None,
    }
}

fn server_item(id: i64, pr: &QueuePr) -> MergeQueueItem {
    let mut item = MergeQueueItem::placeholder(pr);
    item.id = QueueItemId::Server(id);
    item
}

fn not_found(what: &str) -> Error {
    Error::NotFound(what.to_string())
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn accounts(&self) -> Result<Vec<Account>> {
        self.record("accounts");
        let (result, delay) = {
            let mut state = self.state();
            let result = if state.fail_accounts {
                Err(Error::Api {
                    status: 500,
                    message: "accounts unavailable".to_string(),
                })
            } else {
                Ok(state.accounts.clone())
            };
            (result, state.account_delays.pop_front())
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }

    async fn repos(&self, owner: &str, _limit: u32) -> Result<Vec<Repository>> {
        self.record(format!("repos {owner}"));
        Ok(self.state().repos.get(owner).cloned().unwrap_or_default())
    }

    async fn repo_contributors(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        self.record(format!("options contributors {owner}/{repo}"));
        let mut logins: Vec<String> = self
            .state()
            .prs
            .iter()
            .map(|pr| pr.author_login().to_string())
            .collect();
        logins.dedup();
        Ok(logins)
    }

    async fn labels(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        self.record(format!("options labels {owner}/{repo}"));
        Ok(vec!["bug".to_string(), "ui".to_string()])
    }

    async fn branches(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        self.record(format!("options branches {owner}/{repo}"));
        if self.state().fail_branches {
            return Err(Error::Api {
                status: 500,
                message: "branches unavailable".to_string(),
            });
        }
        Ok(vec!["main".to_string(), "release".to_string()])
    }

    async fn milestones(&self, owner: &str, repo: &str) -> Result<Vec<Milestone>> {
        self.record(format!("options milestones {owner}/{repo}"));
        Ok(vec![serde_json::from_value(json!({
            "number": 3,
            "title": "v1.0",
            "state": "open",
        }))?])
    }

    async fn teams(&self, owner: &str, repo: &str) -> Result<Vec<Team>> {
        self.record(format!("options teams {owner}/{repo}"));
        Ok(vec![serde_json::from_value(json!({ "slug": "core", "name": "Core" }))?])
    }

    async fn pull_requests(
        &self,
        owner: &str,
        repo: &str,
        query: &FilterQuery,
    ) -> Result<Vec<PullRequest>> {
        self.record(format!("prs {owner}/{repo}"));
        let delay = {
            let mut state = self.state();
            state.pr_queries.push(query.clone());
            state.pr_delays.pop_front()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let prs = self.state().prs.clone();
        Ok(match query.get("author") {
            Some(author) => prs
                .into_iter()
                .filter(|pr| pr.author_login() == author)
                .collect(),
            None => prs,
        })
    }

    async fn divergence(
        &self,
        owner: &str,
        repo: &str,
        prs: &[DivergenceRequest],
    ) -> Result<HashMap<u64, Divergence>> {
        self.record(format!("divergence {owner}/{repo}"));
        Ok(prs
            .iter()
            .map(|pr| {
                (
                    pr.number,
                    Divergence {
                        status: Some("behind".to_string()),
                        ahead_by: 1,
                        behind_by: pr.number,
                    },
                )
            })
            .collect())
    }

    async fn review_score(
        &self,
        _owner: &str,
        _repo: &str,
        number: u64,
    ) -> Result<Option<ReviewScore>> {
        // Even-numbered PRs have been reviewed before.
        if number % 2 != 0 {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(json!({
            "id": 1000 + number as i64,
            "score": 7.5,
        }))?))
    }

    async fn developer_stats(
        &self,
        _owner: &str,
        _repo: &str,
        _refresh: bool,
    ) -> Result<DeveloperStatsReport> {
        Ok(serde_json::from_value(json!({
            "stats": [
                { "login": "alice", "commits": 12, "prs_merged": 3 },
                { "login": "bob", "commits": 30, "prs_merged": 1 }
            ],
            "last_updated": "2024-05-01T00:00:00Z",
            "cached": true
        }))?)
    }

    async fn code_activity(
        &self,
        _owner: &str,
        _repo: &str,
        _weeks: u32,
        _refresh: bool,
    ) -> Result<CodeActivity> {
        Ok(serde_json::from_value(json!({ "summary": { "total_commits": 42 } }))?)
    }

    async fn lifecycle_metrics(
        &self,
        _owner: &str,
        _repo: &str,
        _refresh: bool,
    ) -> Result<LifecycleMetrics> {
        Ok(serde_json::from_value(json!({
            "median_time_to_merge": 20.5,
            "pr_table": [
                { "number": 1, "time_to_merge_hours": 48.0 },
                { "number": 2, "time_to_merge_hours": 2.0 }
            ]
        }))?)
    }

    async fn review_responsiveness(
        &self,
        _owner: &str,
        _repo: &str,
        _refresh: bool,
    ) -> Result<ReviewResponsiveness> {
        Ok(serde_json::from_value(json!({
            "leaderboard": [{ "reviewer": "carol", "total_reviews": 9 }],
            "prs_awaiting_review": 4
        }))?)
    }

    async fn contributor_timeseries(
        &self,
        _owner: &str,
        _repo: &str,
        _refresh: bool,
    ) -> Result<Vec<ContributorTimeSeries>> {
        Ok(Vec::new())
    }

    async fn workflow_runs(
        &self,
        _owner: &str,
        _repo: &str,
        _filters: &WorkflowRunFilters,
        _refresh: bool,
    ) -> Result<WorkflowRunsReport> {
        Ok(serde_json::from_value(json!({
            "runs": [{ "id": 7, "conclusion": "success" }],
            "stats": { "total_runs": 1, "pass_rate": 100.0 },
            "workflows": [{ "id": 3, "name": "CI" }]
        }))?)
    }

    async fn merge_queue(&self) -> Result<Vec<MergeQueueItem>> {
        self.record("queue");
        Ok(self.state().queue.clone())
    }

    async fn add_to_queue(&self, pr: &QueuePr) -> Result<MergeQueueItem> {
        self.record(format!("queue add {}", pr.key()));
        let mut state = self.state();
        if state.fail_queue_writes {
            return Err(Error::Api {
                status: 500,
                message: "queue write failed".to_string(),
            });
        }
        state.next_queue_id += 1;
        let item = server_item(state.next_queue_id, pr);
        state.queue.push(item.clone());
        Ok(item)
    }

    async fn remove_from_queue(&self, number: u64, repo: &str) -> Result<()> {
        self.record(format!("queue remove {repo}#{number}"));
        let mut state = self.state();
        if state.fail_queue_writes {
            return Err(Error::Api {
                status: 500,
                message: "queue write failed".to_string(),
            });
        }
        state.queue.retain(|i| !i.matches(number, repo));
        Ok(())
    }

    async fn reorder_queue(&self, order: &[QueueKey]) -> Result<()> {
        self.record("queue reorder");
        let mut state = self.state();
        let mut reordered = Vec::new();
        for key in order {
            if let Some(item) = state.queue.iter().find(|i| i.key() == *key) {
                reordered.push(item.clone());
            }
        }
        state.queue = reordered;
        Ok(())
    }

    async fn queue_notes(&self, number: u64, repo: &str) -> Result<Vec<QueueNote>> {
        let key = QueueKey::new(number, repo);
        Ok(self.state().notes.get(&key).cloned().unwrap_or_default())
    }

    async fn add_queue_note(&self, number: u64, repo: &str, content: &str) -> Result<QueueNote> {
        let mut state = self.state();
        let id = state.notes.values().map(Vec::len).sum::<usize>() as i64 + 1;
        let note = QueueNote {
            id,
            content: content.to_string(),
            created_at: None,
        };
        state
            .notes
            .entry(QueueKey::new(number, repo))
            .or_default()
            .push(note.clone());
        if let Some(item) = state.queue.iter_mut().find(|i| i.matches(number, repo)) {
            item.notes_count += 1;
        }
        Ok(note)
    }

    async fn delete_queue_note(&self, note_id: i64) -> Result<()> {
        let mut state = self.state();
        for notes in state.notes.values_mut() {
            notes.retain(|n| n.id != note_id);
        }
        Ok(())
    }

    async fn active_reviews(&self) -> Result<Vec<ActiveReview>> {
        self.record("reviews");
        Ok(self.state().reviews.clone())
    }

    async fn start_review(&self, request: &StartReviewRequest) -> Result<StartReviewResponse> {
        self.record(format!("review start {}", request.key()));
        let delay = self.state().start_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state();
        let key = request.key();
        if state.reviews.iter().any(|r| r.key == key && r.is_running()) {
            return Err(Error::Conflict(format!("Review already in progress for {key}")));
        }
        state.reviews.retain(|r| r.key != key);
        state.reviews.push(ActiveReview::starting(request));
        state.started.push(request.clone());
        Ok(StartReviewResponse {
            key,
            status: ReviewStatus::Running,
            review_file: Some(format!("/tmp/review-{}.md", request.number)),
            is_followup: request.is_followup,
        })
    }

    async fn cancel_review(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        let key = review_key(owner, repo, number);
        self.record(format!("review cancel {key}"));
        let mut state = self.state();
        let before = state.reviews.len();
        state.reviews.retain(|r| r.key != key);
        if state.reviews.len() == before {
            return Err(not_found("review"));
        }
        Ok(())
    }

    async fn review_status(&self, owner: &str, repo: &str, number: u64) -> Result<ActiveReview> {
        let key = review_key(owner, repo, number);
        let mut review = self
            .state()
            .reviews
            .iter()
            .find(|r| r.key == key)
            .cloned()
            .ok_or_else(|| not_found("review"))?;
        // Mirror the backend, which leaves these out.
        review.owner.clear();
        review.repo.clear();
        review.pr_number = 0;
        Ok(review)
    }

    async fn post_inline_comments(
        &self,
        _review_id: i64,
        _section: ReviewSection,
    ) -> Result<InlineCommentsResult> {
        Err(not_found("review"))
    }

    async fn check_new_commits(
        &self,
        _owner: &str,
        _repo: &str,
        _number: u64,
    ) -> Result<NewCommitsCheck> {
        Err(not_found("review"))
    }

    async fn review_history(&self, _query: &HistoryQuery) -> Result<Vec<ReviewHistoryEntry>> {
        Ok(Vec::new())
    }

    async fn review_detail(&self, _review_id: i64) -> Result<ReviewDetail> {
        Err(not_found("review"))
    }

    async fn pr_review_history(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ReviewHistoryEntry>> {
        self.record(format!("history {owner}/{repo}#{number}"));
        // Same rule as `review_score`: even PRs were reviewed, twice.
        if number % 2 != 0 {
            return Ok(Vec::new());
        }
        let base = 1000 + number as i64;
        Ok(serde_json::from_value(json!([
            {
                "id": base,
                "pr_number": number,
                "repo": format!("{owner}/{repo}"),
                "score": 7.5,
                "is_followup": true,
                "parent_review_id": base - 500,
                "content": "## Follow-up\nLooks good now.",
            },
            {
                "id": base - 500,
                "pr_number": number,
                "repo": format!("{owner}/{repo}"),
                "score": 4.0,
                "content": "## Review\nMissing tests.",
            },
        ]))?)
    }

    async fn review_stats(&self) -> Result<ReviewStats> {
        Ok(ReviewStats::default())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<Value>> {
        self.record(format!("setting get {key}"));
        Ok(self.state().settings.get(key).cloned())
    }

    async fn save_setting(&self, key: &str, value: &Value) -> Result<()> {
        self.record(format!("setting save {key}"));
        let mut state = self.state();
        if key == FILTER_SETTINGS_KEY {
            state.saved.push(value.clone());
        }
        state.settings.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete_setting(&self, key: &str) -> Result<()> {
        self.record(format!("setting delete {key}"));
        self.state().settings.remove(key);
        Ok(())
    }
}
