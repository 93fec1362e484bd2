//! HTTP client for the dashboard backend
//!
//! All endpoints live under one base URL (e.g. `http://127.0.0.1:5050/api`).
//! Non-success responses carry `{"error": "..."}` bodies which are turned
//! into [`Error`] values by [`Error::from_status`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::filters::FilterQuery;
use crate::types::{
    Account, ActiveReview, CodeActivity, ContributorTimeSeries, DeveloperStatsReport, Divergence,
    DivergenceRequest, HistoryQuery, InlineCommentsResult, LifecycleMetrics, MergeQueueItem,
    Milestone, NewCommitsCheck, PullRequest, QueueKey, QueueNote, QueuePr, Repository, ReviewDetail,
    ReviewHistoryEntry, ReviewResponsiveness, ReviewScore, ReviewSection, ReviewStats,
    StartReviewRequest, StartReviewResponse, Team, WorkflowRunFilters, WorkflowRunsReport,
};

use super::wire::{
    AccountsEnvelope, ActiveReviewsEnvelope, BranchesEnvelope, ContributorsEnvelope,
    DivergenceBody, DivergenceEnvelope, HistoryEnvelope, InlineCommentsBody, LabelsEnvelope,
    MilestonesEnvelope, NoteBody, NoteEnvelope, NotesEnvelope, PrsEnvelope, QueueEnvelope,
    QueueItemEnvelope, ReorderBody, RepoContributorsEnvelope, ReposEnvelope, ReviewCheckEnvelope,
    ReviewEnvelope, ReviewStatsEnvelope, SettingBody, SettingEnvelope, TeamsEnvelope,
};
use super::DashboardApi;

type Params = Vec<(&'static str, String)>;

fn refresh_param(refresh: bool) -> Params {
    if refresh {
        vec![("refresh", "true".to_string())]
    } else {
        Vec::new()
    }
}

fn seg(s: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(s)
}

/// HTTP implementation of [`DashboardApi`]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from the `[server]` config section.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("server.base_url is required".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and fail on any non-success status.
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::from_status(status.as_u16(), &body))
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<T> {
        tracing::debug!(path, "GET");
        let request = self.http_client.get(self.url(path)).query(params);
        Ok(self.send(request).await?.json().await?)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
        body: &B,
    ) -> Result<T> {
        tracing::debug!(path, "POST");
        let request = self
            .http_client
            .post(self.url(path))
            .query(params)
            .json(body);
        Ok(self.send(request).await?.json().await?)
    }

    async fn delete(&self, path: &str, params: &[(&'static str, String)]) -> Result<()> {
        tracing::debug!(path, "DELETE");
        let request = self.http_client.delete(self.url(path)).query(params);
        self.send(request).await?;
        Ok(())
    }

    fn repo_path(owner: &str, repo: &str, tail: &str) -> String {
        format!("/repos/{}/{}/{}", seg(owner), seg(repo), tail)
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn accounts(&self) -> Result<Vec<Account>> {
        let env: AccountsEnvelope = self.get("/orgs", &[]).await?;
        Ok(env.accounts)
    }

    async fn repos(&self, owner: &str, limit: u32) -> Result<Vec<Repository>> {
        let params = vec![("owner", owner.to_string()), ("limit", limit.to_string())];
        let env: ReposEnvelope = self.get("/repos", &params).await?;
        Ok(env.repos)
    }

    async fn repo_contributors(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let env: RepoContributorsEnvelope = self
            .get(&Self::repo_path(owner, repo, "contributors"), &[])
            .await?;
        Ok(env.contributors)
    }

    async fn labels(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let env: LabelsEnvelope = self
            .get(&Self::repo_path(owner, repo, "labels"), &[])
            .await?;
        Ok(env.labels)
    }

    async fn branches(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let env: BranchesEnvelope = self
            .get(&Self::repo_path(owner, repo, "branches"), &[])
            .await?;
        Ok(env.branches)
    }

    async fn milestones(&self, owner: &str, repo: &str) -> Result<Vec<Milestone>> {
        let env: MilestonesEnvelope = self
            .get(&Self::repo_path(owner, repo, "milestones"), &[])
            .await?;
        Ok(env.milestones)
    }

    async fn teams(&self, owner: &str, repo: &str) -> Result<Vec<Team>> {
        match self
            .get::<TeamsEnvelope>(&Self::repo_path(owner, repo, "teams"), &[])
            .await
        {
            Ok(env) => Ok(env.teams),
            Err(Error::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn pull_requests(
        &self,
        owner: &str,
        repo: &str,
        query: &FilterQuery,
    ) -> Result<Vec<PullRequest>> {
        let env: PrsEnvelope = self
            .get(&Self::repo_path(owner, repo, "prs"), query.pairs())
            .await?;
        Ok(env.prs)
    }

    async fn divergence(
        &self,
        owner: &str,
        repo: &str,
        prs: &[DivergenceRequest],
    ) -> Result<HashMap<u64, Divergence>> {
        let env: DivergenceEnvelope = self
            .post(
                &Self::repo_path(owner, repo, "prs/divergence"),
                &[],
                &DivergenceBody { prs },
            )
            .await?;
        Ok(env.into_map())
    }

    async fn review_score(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Option<ReviewScore>> {
        let path = format!("/review-history/check/{}/{}/{}", seg(owner), seg(repo), number);
        let env: ReviewCheckEnvelope = self.get(&path, &[]).await?;
        Ok(env.latest_review.filter(|_| env.has_review))
    }

    async fn developer_stats(
        &self,
        owner: &str,
        repo: &str,
        refresh: bool,
    ) -> Result<DeveloperStatsReport> {
        self.get(&Self::repo_path(owner, repo, "stats"), &refresh_param(refresh))
            .await
    }

    async fn code_activity(
        &self,
        owner: &str,
        repo: &str,
        weeks: u32,
        refresh: bool,
    ) -> Result<CodeActivity> {
        let mut params = vec![("weeks", weeks.to_string())];
        params.extend(refresh_param(refresh));
        self.get(&Self::repo_path(owner, repo, "code-activity"), &params)
            .await
    }

    async fn lifecycle_metrics(
        &self,
        owner: &str,
        repo: &str,
        refresh: bool,
    ) -> Result<LifecycleMetrics> {
        self.get(
            &Self::repo_path(owner, repo, "lifecycle-metrics"),
            &refresh_param(refresh),
        )
        .await
    }

    async fn review_responsiveness(
        &self,
        owner: &str,
        repo: &str,
        refresh: bool,
    ) -> Result<ReviewResponsiveness> {
        self.get(
            &Self::repo_path(owner, repo, "review-responsiveness"),
            &refresh_param(refresh),
        )
        .await
    }

    async fn contributor_timeseries(
        &self,
        owner: &str,
        repo: &str,
        refresh: bool,
    ) -> Result<Vec<ContributorTimeSeries>> {
        let env: ContributorsEnvelope = self
            .get(
                &Self::repo_path(owner, repo, "contributor-timeseries"),
                &refresh_param(refresh),
            )
            .await?;
        Ok(env.contributors)
    }

    async fn workflow_runs(
        &self,
        owner: &str,
        repo: &str,
        filters: &WorkflowRunFilters,
        refresh: bool,
    ) -> Result<WorkflowRunsReport> {
        let mut params = filters.to_params();
        params.extend(refresh_param(refresh));
        self.get(&Self::repo_path(owner, repo, "workflow-runs"), &params)
            .await
    }

    async fn merge_queue(&self) -> Result<Vec<MergeQueueItem>> {
        let env: QueueEnvelope = self.get("/merge-queue", &[]).await?;
        Ok(env.queue)
    }

    async fn add_to_queue(&self, pr: &QueuePr) -> Result<MergeQueueItem> {
        let env: QueueItemEnvelope = self.post("/merge-queue", &[], pr).await?;
        Ok(env.item)
    }

    async fn remove_from_queue(&self, number: u64, repo: &str) -> Result<()> {
        self.delete(
            &format!("/merge-queue/{}", number),
            &[("repo", repo.to_string())],
        )
        .await
    }

    async fn reorder_queue(&self, order: &[QueueKey]) -> Result<()> {
        let _: serde_json::Value = self
            .post("/merge-queue/reorder", &[], &ReorderBody { order })
            .await?;
        Ok(())
    }

    async fn queue_notes(&self, number: u64, repo: &str) -> Result<Vec<QueueNote>> {
        let env: NotesEnvelope = self
            .get(
                &format!("/merge-queue/{}/notes", number),
                &[("repo", repo.to_string())],
            )
            .await?;
        Ok(env.notes)
    }

    async fn add_queue_note(&self, number: u64, repo: &str, content: &str) -> Result<QueueNote> {
        let env: NoteEnvelope = self
            .post(
                &format!("/merge-queue/{}/notes", number),
                &[("repo", repo.to_string())],
                &NoteBody { content },
            )
            .await?;
        Ok(env.note)
    }

    async fn delete_queue_note(&self, note_id: i64) -> Result<()> {
        self.delete(&format!("/merge-queue/notes/{}", note_id), &[])
            .await
    }

    async fn active_reviews(&self) -> Result<Vec<ActiveReview>> {
        let env: ActiveReviewsEnvelope = self.get("/reviews", &[]).await?;
        Ok(env.reviews)
    }

    async fn start_review(&self, request: &StartReviewRequest) -> Result<StartReviewResponse> {
        tracing::info!(key = %request.key(), followup = request.is_followup, "Starting review");
        self.post("/reviews", &[], request).await
    }

    async fn cancel_review(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        self.delete(
            &format!("/reviews/{}/{}/{}", seg(owner), seg(repo), number),
            &[],
        )
        .await
    }

    async fn review_status(&self, owner: &str, repo: &str, number: u64) -> Result<ActiveReview> {
        self.get(
            &format!("/reviews/{}/{}/{}/status", seg(owner), seg(repo), number),
            &[],
        )
        .await
    }

    async fn post_inline_comments(
        &self,
        review_id: i64,
        section: ReviewSection,
    ) -> Result<InlineCommentsResult> {
        self.post(
            &format!("/reviews/{}/post-inline-comments", review_id),
            &[],
            &InlineCommentsBody { section },
        )
        .await
    }

    async fn check_new_commits(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<NewCommitsCheck> {
        self.get(
            &format!(
                "/reviews/check-new-commits/{}/{}/{}",
                seg(owner),
                seg(repo),
                number
            ),
            &[],
        )
        .await
    }

    async fn review_history(&self, query: &HistoryQuery) -> Result<Vec<ReviewHistoryEntry>> {
        let env: HistoryEnvelope = self.get("/review-history", &query.to_params()).await?;
        Ok(env.reviews)
    }

    async fn review_detail(&self, review_id: i64) -> Result<ReviewDetail> {
        let env: ReviewEnvelope = self
            .get(&format!("/review-history/{}", review_id), &[])
            .await?;
        Ok(env.review)
    }

    async fn pr_review_history(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ReviewHistoryEntry>> {
        let path = format!("/review-history/pr/{}/{}/{}", seg(owner), seg(repo), number);
        let env: HistoryEnvelope = self.get(&path, &[]).await?;
        Ok(env.reviews)
    }

    async fn review_stats(&self) -> Result<ReviewStats> {
        let env: ReviewStatsEnvelope = self.get("/review-history/stats", &[]).await?;
        Ok(env.stats)
    }

    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>> {
        match self
            .get::<SettingEnvelope>(&format!("/settings/{}", seg(key)), &[])
            .await
        {
            Ok(env) => Ok(Some(env.value)),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn save_setting(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let _: serde_json::Value = self
            .post(&format!("/settings/{}", seg(key)), &[], &SettingBody { value })
            .await?;
        Ok(())
    }

    async fn delete_setting(&self, key: &str) -> Result<()> {
        match self.delete(&format!("/settings/{}", seg(key)), &[]).await {
            Err(Error::NotFound(_)) => Ok(()),
            other => other,
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
