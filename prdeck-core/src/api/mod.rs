//! Dashboard backend interface
//!
//! [`DashboardApi`] is everything the sync layer needs from the REST backend.
//! [`ApiClient`] implements it over HTTP; tests substitute an in-memory fake.

mod client;
pub mod wire;

pub use client::ApiClient;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::filters::FilterQuery;
use crate::types::{
    Account, ActiveReview, CodeActivity, ContributorTimeSeries, DeveloperStatsReport, Divergence,
    DivergenceRequest, HistoryQuery, InlineCommentsResult, LifecycleMetrics, MergeQueueItem,
    Milestone, NewCommitsCheck, PullRequest, QueueKey, QueueNote, QueuePr, Repository, ReviewDetail,
    ReviewHistoryEntry, ReviewResponsiveness, ReviewScore, ReviewSection, ReviewStats,
    StartReviewRequest, StartReviewResponse, Team, WorkflowRunFilters, WorkflowRunsReport,
};

/// Key under which the filter snapshot is stored in backend settings
pub const FILTER_SETTINGS_KEY: &str = "filter_settings";

#[async_trait]
pub trait DashboardApi: Send + Sync {
    // Accounts and repositories

    async fn accounts(&self) -> Result<Vec<Account>>;

    async fn repos(&self, owner: &str, limit: u32) -> Result<Vec<Repository>>;

    // Filter panel options

    /// Contributor logins
    async fn repo_contributors(&self, owner: &str, repo: &str) -> Result<Vec<String>>;

    async fn labels(&self, owner: &str, repo: &str) -> Result<Vec<String>>;

    async fn branches(&self, owner: &str, repo: &str) -> Result<Vec<String>>;

    async fn milestones(&self, owner: &str, repo: &str) -> Result<Vec<Milestone>>;

    /// Empty rather than an error for repos without teams.
    async fn teams(&self, owner: &str, repo: &str) -> Result<Vec<Team>>;

    // Pull requests

    async fn pull_requests(
        &self,
        owner: &str,
        repo: &str,
        query: &FilterQuery,
    ) -> Result<Vec<PullRequest>>;

    /// Ahead/behind counts keyed by PR number. PRs the backend could not
    /// compare are absent from the map.
    async fn divergence(
        &self,
        owner: &str,
        repo: &str,
        prs: &[DivergenceRequest],
    ) -> Result<HashMap<u64, Divergence>>;

    /// Latest stored review score, `None` when the PR was never reviewed.
    async fn review_score(&self, owner: &str, repo: &str, number: u64)
        -> Result<Option<ReviewScore>>;

    // Analytics

    async fn developer_stats(
        &self,
        owner: &str,
        repo: &str,
        refresh: bool,
    ) -> Result<DeveloperStatsReport>;

    async fn code_activity(
        &self,
        owner: &str,
        repo: &str,
        weeks: u32,
        refresh: bool,
    ) -> Result<CodeActivity>;

    async fn lifecycle_metrics(
        &self,
        owner: &str,
        repo: &str,
        refresh: bool,
    ) -> Result<LifecycleMetrics>;

    async fn review_responsiveness(
        &self,
        owner: &str,
        repo: &str,
        refresh: bool,
    ) -> Result<ReviewResponsiveness>;

    async fn contributor_timeseries(
        &self,
        owner: &str,
        repo: &str,
        refresh: bool,
    ) -> Result<Vec<ContributorTimeSeries>>;

    async fn workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        filters: &WorkflowRunFilters,
        refresh: bool,
    ) -> Result<WorkflowRunsReport>;

    // Merge queue

    async fn merge_queue(&self) -> Result<Vec<MergeQueueItem>>;

    async fn add_to_queue(&self, pr: &QueuePr) -> Result<MergeQueueItem>;

    async fn remove_from_queue(&self, number: u64, repo: &str) -> Result<()>;

    /// Replace the queue order with `order`.
    async fn reorder_queue(&self, order: &[QueueKey]) -> Result<()>;

    async fn queue_notes(&self, number: u64, repo: &str) -> Result<Vec<QueueNote>>;

    async fn add_queue_note(&self, number: u64, repo: &str, content: &str) -> Result<QueueNote>;

    async fn delete_queue_note(&self, note_id: i64) -> Result<()>;

    // Code reviews

    async fn active_reviews(&self) -> Result<Vec<ActiveReview>>;

    async fn start_review(&self, request: &StartReviewRequest) -> Result<StartReviewResponse>;

    async fn cancel_review(&self, owner: &str, repo: &str, number: u64) -> Result<()>;

    async fn review_status(&self, owner: &str, repo: &str, number: u64) -> Result<ActiveReview>;

    async fn post_inline_comments(
        &self,
        review_id: i64,
        section: ReviewSection,
    ) -> Result<InlineCommentsResult>;

    async fn check_new_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<NewCommitsCheck>;

    // Review history

    async fn review_history(&self, query: &HistoryQuery) -> Result<Vec<ReviewHistoryEntry>>;

    async fn review_detail(&self, review_id: i64) -> Result<ReviewDetail>;

    /// Every stored review of one PR, newest first, with content.
    async fn pr_review_history(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ReviewHistoryEntry>>;

    async fn review_stats(&self) -> Result<ReviewStats>;

    // Settings

    /// Stored value for `key`, `None` when the key was never saved.
    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>>;

    async fn save_setting(&self, key: &str, value: &serde_json::Value) -> Result<()>;

    async fn delete_setting(&self, key: &str) -> Result<()>;
}
