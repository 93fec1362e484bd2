//! Core domain types for prdeck
//!
//! These types mirror the JSON payloads of the dashboard backend. Field names
//! follow the wire format (the backend mixes camelCase for PR and queue data
//! with snake_case for reviews and analytics), so serde renames are per type.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Account** | A user or organization login that owns repositories |
//! | **Repository** | An `owner/name` pair hosting pull requests |
//! | **Merge queue** | A personal, ordered list of PRs the human intends to merge |
//! | **Active review** | A code review job running on the backend, keyed `owner/repo/number` |
//! | **Divergence** | Ahead/behind commit counts of a PR branch against its base |

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================
// Accounts and repositories
// ============================================

/// Whether an account is the authenticated user or an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    #[default]
    User,
    Org,
}

/// A login that can own repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: AccountKind,
    #[serde(default)]
    pub is_personal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// A repository as listed for an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub name: String,
    pub owner: RepositoryOwner,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Repository {
    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }
}

/// Splits `owner/name` into its two halves.
pub fn split_full_name(full_name: &str) -> Option<(&str, &str)> {
    let (owner, name) = full_name.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner, name))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Choices offered by the PR filter panel for one repository.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterOptions {
    pub contributors: Vec<String>,
    pub labels: Vec<String>,
    pub branches: Vec<String>,
    pub milestones: Vec<Milestone>,
    /// Empty for personal repositories
    pub teams: Vec<Team>,
}

// ============================================
// Pull requests
// ============================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// A pull request row from the PR list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub author: Option<Actor>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub merged_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    #[serde(default)]
    pub head_ref_name: String,
    #[serde(default)]
    pub base_ref_name: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<Actor>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
    #[serde(default)]
    pub review_decision: Option<String>,
    #[serde(default)]
    pub review_status: Option<String>,
    #[serde(default)]
    pub ci_status: Option<String>,
}

impl PullRequest {
    pub fn author_login(&self) -> &str {
        self.author.as_ref().map(|a| a.login.as_str()).unwrap_or("")
    }

    pub fn is_open(&self) -> bool {
        self.state.eq_ignore_ascii_case("open")
    }
}

/// Branch comparison for one PR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    #[serde(default)]
    pub status: Option<String>,
    pub ahead_by: u64,
    pub behind_by: u64,
}

/// One entry of a divergence request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivergenceRequest {
    pub number: u64,
    pub base: String,
    pub head: String,
}

impl From<&PullRequest> for DivergenceRequest {
    fn from(pr: &PullRequest) -> Self {
        Self {
            number: pr.number,
            base: pr.base_ref_name.clone(),
            head: pr.head_ref_name.clone(),
        }
    }
}

/// Latest review score for a PR, as shown next to PR rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewScore {
    pub id: i64,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub review_timestamp: Option<String>,
    #[serde(default)]
    pub is_followup: bool,
    #[serde(default)]
    pub head_commit_sha: Option<String>,
    #[serde(default)]
    pub inline_comments_posted: bool,
}

// ============================================
// Merge queue
// ============================================

/// Identity of a queue entry: PR number within an `owner/name` repo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueueKey {
    pub number: u64,
    pub repo: String,
}

impl QueueKey {
    pub fn new(number: u64, repo: impl Into<String>) -> Self {
        Self {
            number,
            repo: repo.into(),
        }
    }
}

impl fmt::Display for QueueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

/// Backend row id, or a local id for an item that has not been confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueueItemId {
    Server(i64),
    Pending(Uuid),
}

impl QueueItemId {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueueItemId::Pending(_))
    }
}

/// A PR in the merge queue with its denormalized snapshot and review linkage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeQueueItem {
    pub id: QueueItemId,
    pub number: u64,
    pub repo: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub added_at: Option<String>,
    #[serde(default)]
    pub notes_count: u32,
    #[serde(default)]
    pub pr_state: Option<String>,
    #[serde(default)]
    pub has_new_commits: bool,
    #[serde(default)]
    pub last_reviewed_sha: Option<String>,
    #[serde(default)]
    pub current_sha: Option<String>,
    #[serde(default)]
    pub has_review: bool,
    #[serde(default)]
    pub review_score: Option<f64>,
    #[serde(default)]
    pub review_id: Option<i64>,
    #[serde(default)]
    pub inline_comments_posted: bool,
    #[serde(default)]
    pub major_concerns_posted: bool,
    #[serde(default)]
    pub minor_issues_posted: bool,
    #[serde(default)]
    pub critical_posted_count: Option<u32>,
    #[serde(default)]
    pub critical_found_count: Option<u32>,
    #[serde(default)]
    pub major_posted_count: Option<u32>,
    #[serde(default)]
    pub major_found_count: Option<u32>,
    #[serde(default)]
    pub minor_posted_count: Option<u32>,
    #[serde(default)]
    pub minor_found_count: Option<u32>,
}

impl MergeQueueItem {
    /// Local placeholder inserted before the backend confirms an add.
    pub fn placeholder(pr: &QueuePr) -> Self {
        Self {
            id: QueueItemId::Pending(Uuid::new_v4()),
            number: pr.number,
            repo: pr.repo.clone(),
            title: pr.title.clone(),
            url: pr.url.clone(),
            author: pr.author.clone(),
            additions: pr.additions,
            deletions: pr.deletions,
            added_at: Some(chrono::Utc::now().to_rfc3339()),
            notes_count: 0,
            pr_state: None,
            has_new_commits: false,
            last_reviewed_sha: None,
            current_sha: None,
            has_review: false,
            review_score: None,
            review_id: None,
            inline_comments_posted: false,
            major_concerns_posted: false,
            minor_issues_posted: false,
            critical_posted_count: None,
            critical_found_count: None,
            major_posted_count: None,
            major_found_count: None,
            minor_posted_count: None,
            minor_found_count: None,
        }
    }

    pub fn key(&self) -> QueueKey {
        QueueKey::new(self.number, self.repo.clone())
    }

    pub fn matches(&self, number: u64, repo: &str) -> bool {
        self.number == number && self.repo == repo
    }
}

/// Payload for adding a PR to the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuePr {
    pub number: u64,
    pub repo: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub additions: u64,
    pub deletions: u64,
}

impl QueuePr {
    pub fn from_pull_request(pr: &PullRequest, repo: &str) -> Self {
        Self {
            number: pr.number,
            repo: repo.to_string(),
            title: pr.title.clone(),
            url: pr.url.clone(),
            author: pr.author_login().to_string(),
            additions: pr.additions,
            deletions: pr.deletions,
        }
    }

    pub fn key(&self) -> QueueKey {
        QueueKey::new(self.number, self.repo.clone())
    }
}

/// A sticky note attached to a queue item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueNote {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ============================================
// Code reviews
// ============================================

/// Lifecycle of a backend review job. `Running` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Running,
    Completed,
    Failed,
}

impl ReviewStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReviewStatus::Running)
    }
}

/// Key of an active review: `owner/repo/prNumber`.
pub fn review_key(owner: &str, repo: &str, number: u64) -> String {
    format!("{owner}/{repo}/{number}")
}

/// Splits a review key back into owner, repo and PR number.
pub fn parse_review_key(key: &str) -> Option<(&str, &str, u64)> {
    let mut parts = key.splitn(3, '/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    let number = parts.next()?.parse().ok()?;
    Some((owner, repo, number))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveReview {
    pub key: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub pr_number: u64,
    pub status: ReviewStatus,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub pr_url: Option<String>,
    #[serde(default)]
    pub review_file: Option<String>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub error_output: Option<String>,
    #[serde(default)]
    pub is_followup: bool,
}

impl ActiveReview {
    /// Local entry shown while a start request is in flight.
    pub fn starting(request: &StartReviewRequest) -> Self {
        Self {
            key: request.key(),
            owner: request.owner.clone(),
            repo: request.repo.clone(),
            pr_number: request.number,
            status: ReviewStatus::Running,
            started_at: Some(chrono::Utc::now().to_rfc3339()),
            completed_at: None,
            pr_url: Some(request.url.clone()),
            review_file: None,
            exit_code: None,
            error_output: None,
            is_followup: request.is_followup,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == ReviewStatus::Running
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartReviewRequest {
    pub number: u64,
    pub url: String,
    pub owner: String,
    pub repo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub is_followup: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_review_id: Option<i64>,
}

impl StartReviewRequest {
    pub fn key(&self) -> String {
        review_key(&self.owner, &self.repo, self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartReviewResponse {
    pub key: String,
    pub status: ReviewStatus,
    #[serde(default)]
    pub review_file: Option<String>,
    #[serde(default)]
    pub is_followup: bool,
}

/// Section of a review whose issues get posted as inline comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSection {
    #[default]
    Critical,
    Major,
    Minor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineCommentsResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub issues_posted: u32,
    #[serde(default)]
    pub issues_found: u32,
    #[serde(default)]
    pub file_level_errors: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCommitsCheck {
    pub has_new_commits: bool,
    #[serde(default)]
    pub last_reviewed_sha: Option<String>,
    #[serde(default)]
    pub current_sha: Option<String>,
}

// ============================================
// Review history
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewHistoryEntry {
    pub id: i64,
    pub pr_number: u64,
    pub repo: String,
    #[serde(default)]
    pub pr_title: Option<String>,
    #[serde(default)]
    pub pr_author: Option<String>,
    #[serde(default)]
    pub pr_url: Option<String>,
    #[serde(default)]
    pub review_timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub is_followup: bool,
    #[serde(default)]
    pub parent_review_id: Option<i64>,
    #[serde(default)]
    pub head_commit_sha: Option<String>,
    #[serde(default)]
    pub inline_comments_posted: bool,
    #[serde(default)]
    pub pr_state: Option<String>,
    /// Only present on per-PR history listings
    #[serde(default)]
    pub content: Option<String>,
}

/// A single stored review with its full content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDetail {
    pub id: i64,
    pub pr_number: u64,
    pub repo: String,
    #[serde(default)]
    pub pr_title: Option<String>,
    #[serde(default)]
    pub pr_author: Option<String>,
    #[serde(default)]
    pub pr_url: Option<String>,
    #[serde(default)]
    pub review_timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_followup: bool,
    #[serde(default)]
    pub parent_review_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total: u64,
    #[serde(default)]
    pub by_status: HashMap<String, u64>,
    #[serde(default)]
    pub by_repo: HashMap<String, u64>,
    #[serde(default)]
    pub average_score: Option<f64>,
    #[serde(default)]
    pub followup_count: u64,
}

/// Query for the review history listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryQuery {
    pub repo: Option<String>,
    pub author: Option<String>,
    pub pr_number: Option<u64>,
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl HistoryQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(repo) = self.repo.as_deref().filter(|s| !s.is_empty()) {
            params.push(("repo", repo.to_string()));
        }
        if let Some(author) = self.author.as_deref().filter(|s| !s.is_empty()) {
            params.push(("author", author.to_string()));
        }
        if let Some(number) = self.pr_number {
            params.push(("pr_number", number.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search", search.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset", offset.to_string()));
        }
        params
    }
}

// ============================================
// Analytics
// ============================================

/// Cache bookkeeping attached to analytics payloads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CacheMeta {
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub stale: bool,
    #[serde(default)]
    pub refreshing: bool,
}

/// Per-developer aggregates for a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperStats {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub commits: u64,
    #[serde(default)]
    pub lines_added: u64,
    #[serde(default)]
    pub lines_deleted: u64,
    #[serde(default)]
    pub prs_authored: u64,
    #[serde(default)]
    pub prs_merged: u64,
    #[serde(default)]
    pub prs_closed: u64,
    #[serde(default)]
    pub prs_open: u64,
    #[serde(default)]
    pub reviews_given: u64,
    #[serde(default)]
    pub approvals: u64,
    #[serde(default)]
    pub changes_requested: u64,
    #[serde(default)]
    pub avg_pr_score: Option<f64>,
    #[serde(default)]
    pub reviewed_pr_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeveloperStatsReport {
    pub stats: Vec<DeveloperStats>,
    #[serde(flatten)]
    pub cache: CacheMeta,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CodeActivitySummary {
    #[serde(default)]
    pub total_commits: u64,
    #[serde(default)]
    pub avg_weekly_commits: f64,
    #[serde(default)]
    pub total_additions: u64,
    #[serde(default)]
    pub total_deletions: u64,
    #[serde(default)]
    pub peak_week: Option<String>,
    #[serde(default)]
    pub peak_commits: u64,
    #[serde(default)]
    pub owner_percentage: Option<f64>,
}

/// Weekly commit and churn series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeActivity {
    #[serde(default)]
    pub weekly_commits: Vec<serde_json::Value>,
    #[serde(default)]
    pub code_changes: Vec<serde_json::Value>,
    #[serde(default)]
    pub owner_commits: Vec<serde_json::Value>,
    #[serde(default)]
    pub community_commits: Vec<serde_json::Value>,
    #[serde(default)]
    pub summary: Option<CodeActivitySummary>,
    #[serde(flatten)]
    pub cache: CacheMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StalePr {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub age_days: f64,
}

/// One row of the lifecycle table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecyclePr {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub time_to_first_review_hours: Option<f64>,
    #[serde(default)]
    pub time_to_merge_hours: Option<f64>,
    #[serde(default)]
    pub first_reviewer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleMetrics {
    #[serde(default)]
    pub median_time_to_merge: Option<f64>,
    #[serde(default)]
    pub avg_time_to_merge: Option<f64>,
    #[serde(default)]
    pub median_time_to_first_review: Option<f64>,
    #[serde(default)]
    pub avg_time_to_first_review: Option<f64>,
    #[serde(default)]
    pub stale_prs: Vec<StalePr>,
    #[serde(default)]
    pub stale_count: u64,
    #[serde(default)]
    pub distribution: serde_json::Value,
    #[serde(default)]
    pub pr_table: Vec<LifecyclePr>,
    #[serde(flatten)]
    pub cache: CacheMeta,
}

/// Leaderboard row of review responsiveness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerStats {
    pub reviewer: String,
    #[serde(default)]
    pub avg_response_time_hours: Option<f64>,
    #[serde(default)]
    pub median_response_time_hours: Option<f64>,
    #[serde(default)]
    pub total_reviews: u64,
    #[serde(default)]
    pub approvals: u64,
    #[serde(default)]
    pub changes_requested: u64,
    #[serde(default)]
    pub approval_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewBottleneck {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub wait_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponsiveness {
    #[serde(default)]
    pub leaderboard: Vec<ReviewerStats>,
    #[serde(default)]
    pub bottlenecks: Vec<ReviewBottleneck>,
    #[serde(default)]
    pub avg_team_response_hours: Option<f64>,
    #[serde(default)]
    pub fastest_reviewer: Option<serde_json::Value>,
    #[serde(default)]
    pub prs_awaiting_review: u64,
    #[serde(flatten)]
    pub cache: CacheMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorWeek {
    pub week: String,
    #[serde(default)]
    pub commits: u64,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// Weekly activity series for one contributor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorTimeSeries {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub weeks: Vec<ContributorWeek>,
}

// ============================================
// CI workflows
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub head_branch: Option<String>,
    #[serde(default)]
    pub run_attempt: Option<u32>,
    #[serde(default)]
    pub run_number: Option<u64>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub actor_login: Option<String>,
    #[serde(default)]
    pub workflow_id: Option<u64>,
    #[serde(default)]
    pub duration_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowTotals {
    pub total: u64,
    pub failures: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowStats {
    #[serde(default)]
    pub total_runs: u64,
    #[serde(default)]
    pub all_time_total: u64,
    #[serde(default)]
    pub pass_rate: f64,
    #[serde(default)]
    pub avg_duration: u64,
    #[serde(default)]
    pub failure_count: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub runs_by_workflow: HashMap<String, WorkflowTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRunsReport {
    #[serde(default)]
    pub runs: Vec<WorkflowRun>,
    #[serde(default)]
    pub stats: WorkflowStats,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

/// Server-side filters for workflow runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowRunFilters {
    pub workflow_id: Option<u64>,
    pub branch: Option<String>,
    pub event: Option<String>,
    pub conclusion: Option<String>,
    pub status: Option<String>,
}

impl WorkflowRunFilters {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.workflow_id {
            params.push(("workflow_id", id.to_string()));
        }
        let text = [
            ("branch", &self.branch),
            ("event", &self.event),
            ("conclusion", &self.conclusion),
            ("status", &self.status),
        ];
        for (name, value) in text {
            if let Some(value) = value.as_deref().filter(|s| !s.is_empty()) {
                params.push((name, value.to_string()));
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_name() {
        assert_eq!(split_full_name("acme/widgets"), Some(("acme", "widgets")));
        assert_eq!(split_full_name("acme"), None);
        assert_eq!(split_full_name("acme/"), None);
        assert_eq!(split_full_name("a/b/c"), None);
    }

    #[test]
    fn test_review_key_parsing() {
        let key = review_key("acme", "widgets", 42);
        assert_eq!(key, "acme/widgets/42");
        assert_eq!(parse_review_key(&key), Some(("acme", "widgets", 42)));
        assert_eq!(parse_review_key("acme/widgets/x"), None);
    }

    #[test]
    fn test_queue_item_deserializes_server_id() {
        let json = r#"{
            "id": 7, "number": 12, "repo": "acme/widgets", "title": "Fix",
            "url": "https://example.com/pr/12", "author": "alice",
            "notesCount": 2, "reviewScore": 8.5, "hasNewCommits": true
        }"#;
        let item: MergeQueueItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, QueueItemId::Server(7));
        assert_eq!(item.notes_count, 2);
        assert_eq!(item.review_score, Some(8.5));
        assert!(item.has_new_commits);
    }

    #[test]
    fn test_placeholder_has_zeroed_review_linkage() {
        let pr = QueuePr {
            number: 3,
            repo: "acme/widgets".to_string(),
            title: "Add thing".to_string(),
            url: "https://example.com/pr/3".to_string(),
            author: "bob".to_string(),
            additions: 10,
            deletions: 2,
        };
        let item = MergeQueueItem::placeholder(&pr);
        assert!(item.id.is_pending());
        assert_eq!(item.notes_count, 0);
        assert_eq!(item.review_id, None);
        assert!(!item.has_review);
        assert!(item.matches(3, "acme/widgets"));
    }

    #[test]
    fn test_developer_stats_report_flattens_cache_meta() {
        let json = r#"{
            "stats": [{"login": "alice", "commits": 4}],
            "cached": true,
            "stale": true,
            "refreshing": false
        }"#;
        let report: DeveloperStatsReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.stats[0].commits, 4);
        assert!(report.cache.cached);
        assert!(report.cache.stale);
    }
}
