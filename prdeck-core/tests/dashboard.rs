//! Integration tests for the dashboard coordinator
//!
//! These run the sync layer against the in-memory backend in `common/` with
//! tokio's paused clock, so debounce and settle delays are deterministic.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{account, pull_request, repo, FakeApi};
use prdeck_core::api::FILTER_SETTINGS_KEY;
use prdeck_core::columns::LifecycleColumn;
use prdeck_core::config::SyncConfig;
use prdeck_core::{Dashboard, FilterField, PrState};
use serde_json::json;

fn dashboard(api: &Arc<FakeApi>) -> Dashboard {
    Dashboard::new(api.clone(), SyncConfig::default())
}

fn seed_acme(api: &FakeApi) {
    let mut state = api.state();
    state.accounts = vec![account("me"), account("acme")];
    state
        .repos
        .insert("acme".to_string(), vec![repo("acme", "api"), repo("acme", "widgets")]);
    state.prs = vec![pull_request(1, "alice"), pull_request(2, "bob")];
}

// ============================================
// Selection and filters
// ============================================

#[tokio::test(start_paused = true)]
async fn test_select_account_repo_then_filter() {
    let api = FakeApi::new();
    {
        let mut state = api.state();
        state.accounts = vec![account("alpha"), account("beta")];
        state.repos.insert("beta".to_string(), vec![repo("beta", "proj")]);
        state.prs = vec![pull_request(1, "alice"), pull_request(2, "bob")];
    }
    let dashboard = dashboard(&api);

    dashboard.mount().await;
    assert!(dashboard.is_restored());
    assert_eq!(dashboard.view(|s| s.accounts.len()), 2);
    // Nothing saved means nothing selected
    assert_eq!(dashboard.selected_account(), None);
    assert_eq!(api.count_calls("repos"), 0);

    dashboard.select_account("beta").await;
    assert_eq!(api.count_calls("repos beta"), 1);
    assert_eq!(dashboard.view(|s| s.repos.len()), 1);

    dashboard.select_repo("beta/proj").await.unwrap();
    let queries = api.pr_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].len(), 2);
    assert_eq!(queries[0].get("state"), Some("open"));
    assert_eq!(queries[0].get("limit"), Some("100"));
    assert_eq!(dashboard.view(|s| s.prs.len()), 2);

    dashboard.set_filter(FilterField::Author, "alice").await.unwrap();
    let queries = api.pr_queries();
    assert_eq!(queries.len(), 2);
    assert_eq!(queries[1].get("author"), Some("alice"));
    assert_eq!(dashboard.view(|s| s.prs.len()), 1);

    tokio::time::sleep(Duration::from_millis(900)).await;
    assert!(api.saved().is_empty(), "save fired before the debounce elapsed");

    tokio::time::sleep(Duration::from_millis(200)).await;
    let saved = api.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["selectedAccountLogin"], "beta");
    assert_eq!(saved[0]["selectedRepoFullName"], "beta/proj");
    assert_eq!(saved[0]["filters"]["author"], "alice");
}

#[tokio::test(start_paused = true)]
async fn test_unchanged_query_does_not_refetch() {
    let api = FakeApi::new();
    seed_acme(&api);
    let dashboard = dashboard(&api);
    dashboard.select_account("acme").await;
    dashboard.select_repo("acme/widgets").await.unwrap();

    dashboard.set_filter(FilterField::Author, "alice").await.unwrap();
    dashboard.set_filter(FilterField::Author, "alice").await.unwrap();
    // sortDirection alone is not sent without sortBy
    dashboard
        .set_filter(FilterField::SortDirection, "asc")
        .await
        .unwrap();

    assert_eq!(api.pr_queries().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_filter_is_rejected() {
    let api = FakeApi::new();
    seed_acme(&api);
    let dashboard = dashboard(&api);
    dashboard.select_account("acme").await;
    dashboard.select_repo("acme/widgets").await.unwrap();

    assert!(dashboard.set_filter(FilterField::State, "reopened").await.is_err());
    assert!(dashboard.set_filter(FilterField::Limit, 7u32).await.is_err());
    assert_eq!(dashboard.filters().state, PrState::Open);
    assert_eq!(api.pr_queries().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_prs_load_divergence_and_scores() {
    let api = FakeApi::new();
    seed_acme(&api);
    let dashboard = dashboard(&api);
    dashboard.select_account("acme").await;
    dashboard.select_repo("acme/widgets").await.unwrap();

    let (divergence, scores) = dashboard.view(|s| {
        (
            s.divergence.data().cloned().unwrap_or_default(),
            s.review_scores.data().cloned().unwrap_or_default(),
        )
    });
    assert_eq!(divergence.len(), 2);
    assert_eq!(divergence[&2].behind_by, 2);
    // Only PR 2 was ever reviewed
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[&2].id, 1002);
}

#[tokio::test(start_paused = true)]
async fn test_switching_account_clears_repo_data() {
    let api = FakeApi::new();
    seed_acme(&api);
    let dashboard = dashboard(&api);
    dashboard.select_account("acme").await;
    dashboard.select_repo("acme/widgets").await.unwrap();
    assert_eq!(dashboard.view(|s| s.prs.len()), 2);

    dashboard.select_account("me").await;
    assert_eq!(dashboard.selected_repo(), None);
    assert_eq!(dashboard.view(|s| s.prs.len()), 0);
    assert!(dashboard.view(|s| s.divergence.data().is_none()));
    assert_eq!(dashboard.view(|s| s.repos.len()), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_pr_response_is_discarded() {
    let api = FakeApi::new();
    seed_acme(&api);
    let dashboard = dashboard(&api);
    dashboard.select_account("acme").await;
    dashboard.select_repo("acme/widgets").await.unwrap();

    // The first request answers after the second one
    api.state().pr_delays = [Duration::from_millis(300), Duration::ZERO].into();

    let (slow, fast) = tokio::join!(
        dashboard.set_filter(FilterField::Author, "alice"),
        async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            dashboard.set_filter(FilterField::Author, "bob").await
        }
    );
    slow.unwrap();
    fast.unwrap();

    let authors: Vec<String> = dashboard.view(|s| {
        s.prs
            .data()
            .iter()
            .map(|pr| pr.author_login().to_string())
            .collect()
    });
    assert_eq!(authors, vec!["bob".to_string()]);
    assert!(!dashboard.view(|s| s.prs.is_loading()));
}

// ============================================
// Restore
// ============================================

#[tokio::test(start_paused = true)]
async fn test_restore_applies_snapshot_without_saving() {
    let api = FakeApi::new();
    seed_acme(&api);
    api.state().settings.insert(
        FILTER_SETTINGS_KEY.to_string(),
        json!({
            "filters": { "author": "alice" },
            "selectedAccountLogin": "acme",
            "selectedRepoFullName": "acme/widgets"
        }),
    );
    let dashboard = dashboard(&api);

    dashboard.mount().await;

    assert!(dashboard.is_restored());
    assert_eq!(dashboard.selected_account().as_deref(), Some("acme"));
    assert_eq!(dashboard.selected_repo().as_deref(), Some("acme/widgets"));
    assert_eq!(dashboard.filters().author, "alice");

    // PRs fetched once, already with the restored filters
    let queries = api.pr_queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].get("author"), Some("alice"));
    assert_eq!(dashboard.view(|s| s.prs.len()), 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(api.saved().is_empty());

    // User changes after the restore are saved
    dashboard.set_filter(FilterField::Author, "bob").await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let saved = api.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0]["filters"]["author"], "bob");
}

#[tokio::test(start_paused = true)]
async fn test_stale_account_list_does_not_drive_restore() {
    let api = FakeApi::new();
    seed_acme(&api);
    api.state().settings.insert(
        FILTER_SETTINGS_KEY.to_string(),
        json!({ "filters": {}, "selectedAccountLogin": "acme" }),
    );
    api.state().account_delays =
        [Duration::from_millis(300), Duration::from_millis(500)].into();
    let dashboard = dashboard(&api);

    tokio::join!(dashboard.mount(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        // acme is gone by the time the newer request is made
        api.state().accounts = vec![account("me")];
        dashboard.load_accounts().await;
    });

    assert!(dashboard.is_restored());
    assert_eq!(dashboard.selected_account(), None);
    assert_eq!(api.count_calls("repos"), 0);
    let logins: Vec<String> =
        dashboard.view(|s| s.accounts.data().iter().map(|a| a.login.clone()).collect());
    assert_eq!(logins, vec!["me"]);
}

#[tokio::test(start_paused = true)]
async fn test_restore_with_vanished_repo_keeps_account() {
    let api = FakeApi::new();
    seed_acme(&api);
    api.state().settings.insert(
        FILTER_SETTINGS_KEY.to_string(),
        json!({
            "filters": { "author": "alice" },
            "selectedAccountLogin": "acme",
            "selectedRepoFullName": "acme/deleted"
        }),
    );
    let dashboard = dashboard(&api);

    dashboard.mount().await;

    assert!(dashboard.is_restored());
    assert_eq!(dashboard.selected_account().as_deref(), Some("acme"));
    assert_eq!(dashboard.selected_repo(), None);
    assert!(api.pr_queries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_account_load_latches_restore() {
    let api = FakeApi::new();
    api.state().fail_accounts = true;
    let dashboard = dashboard(&api);

    dashboard.mount().await;

    assert!(dashboard.is_restored());
    assert!(dashboard.view(|s| s.accounts.error().is_some()));
    assert_eq!(api.count_calls("queue"), 1);
    assert_eq!(api.count_calls("reviews"), 1);
}

// ============================================
// Analytics and actions
// ============================================

#[tokio::test(start_paused = true)]
async fn test_analytics_tables_are_split_out() {
    let api = FakeApi::new();
    seed_acme(&api);
    let dashboard = dashboard(&api);
    dashboard.select_account("acme").await;
    dashboard.select_repo("acme/widgets").await.unwrap();

    dashboard.load_developer_stats(false).await;
    dashboard.load_lifecycle_metrics(false).await;
    dashboard.load_review_responsiveness(false).await;
    dashboard.load_workflow_runs(&Default::default(), false).await;

    dashboard.update_view(|s| s.lifecycle_prs.set_sort(LifecycleColumn::TimeToMerge));
    dashboard.view(|s| {
        assert_eq!(s.developer_stats.len(), 2);
        assert!(s.developer_cache.cached);

        let metrics = s.lifecycle.data().unwrap();
        assert!(metrics.pr_table.is_empty());
        let order: Vec<u64> = s.lifecycle_prs.view().iter().map(|pr| pr.number).collect();
        assert_eq!(order, vec![1, 2]);

        assert_eq!(s.reviewers.len(), 1);
        assert_eq!(s.responsiveness.data().unwrap().prs_awaiting_review, 4);

        assert_eq!(s.workflow_runs.len(), 1);
        assert_eq!(s.workflows.len(), 1);
        assert_eq!(s.workflow_stats.total_runs, 1);
    });
}

#[tokio::test(start_paused = true)]
async fn test_analytics_without_repo_do_nothing() {
    let api = FakeApi::new();
    let dashboard = dashboard(&api);
    dashboard.load_developer_stats(true).await;
    assert!(dashboard.view(|s| s.developer_stats.is_empty() && !s.developer_stats.is_loading()));
}

#[tokio::test(start_paused = true)]
async fn test_filter_options_tolerate_one_failed_list() {
    let api = FakeApi::new();
    seed_acme(&api);
    api.state().fail_branches = true;
    let dashboard = dashboard(&api);

    dashboard.load_filter_options().await;
    assert_eq!(api.count_calls("options"), 0);

    dashboard.select_account("acme").await;
    dashboard.select_repo("acme/widgets").await.unwrap();
    dashboard.load_filter_options().await;
    assert_eq!(api.count_calls("options"), 5);

    let options = dashboard.view(|s| s.filter_options.data().cloned()).unwrap();
    assert_eq!(options.labels, vec!["bug", "ui"]);
    assert_eq!(options.contributors, vec!["alice", "bob"]);
    assert!(options.branches.is_empty());
    assert_eq!(options.milestones[0].title, "v1.0");
    assert_eq!(options.teams[0].slug, "core");
    assert!(dashboard.view(|s| s.filter_options.error().is_none()));

    // Repo-scoped: gone after switching accounts
    dashboard.select_account("me").await;
    assert!(dashboard.view(|s| s.filter_options.data().is_none()));
}

#[tokio::test(start_paused = true)]
async fn test_pr_history_lists_every_review() {
    let api = FakeApi::new();
    seed_acme(&api);
    let dashboard = dashboard(&api);
    dashboard.select_account("acme").await;
    dashboard.select_repo("acme/widgets").await.unwrap();

    dashboard.load_pr_history(2).await;
    let history = dashboard.view(|s| s.pr_history.data().to_vec());
    assert_eq!(history.len(), 2);
    assert!(history[0].is_followup);
    assert_eq!(history[0].parent_review_id, Some(history[1].id));
    assert!(history[1].content.as_deref().unwrap().contains("Missing tests"));

    dashboard.load_pr_history(1).await;
    assert!(dashboard.view(|s| s.pr_history.is_empty()));
    assert_eq!(api.count_calls("history acme/widgets#"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_toggle_queue_round_trip() {
    let api = FakeApi::new();
    seed_acme(&api);
    let dashboard = dashboard(&api);
    dashboard.select_account("acme").await;
    dashboard.select_repo("acme/widgets").await.unwrap();

    let handle = dashboard.toggle_queue(1).unwrap();
    assert!(dashboard.queue().is_in_queue(1, "acme/widgets"));
    handle.await.unwrap();
    assert!(dashboard.queue().is_in_queue(1, "acme/widgets"));
    assert_eq!(api.state().queue.len(), 1);

    dashboard.toggle_queue(1).unwrap().await.unwrap();
    assert!(!dashboard.queue().is_in_queue(1, "acme/widgets"));
    assert!(api.state().queue.is_empty());

    // PRs that are not loaded cannot be queued
    assert!(dashboard.toggle_queue(99).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_followup_review_links_previous_review() {
    let api = FakeApi::new();
    seed_acme(&api);
    let dashboard = dashboard(&api);
    dashboard.select_account("acme").await;
    dashboard.select_repo("acme/widgets").await.unwrap();

    let response = dashboard.review_pr(2, true).await.unwrap();
    assert!(response.is_followup);
    assert!(dashboard.reviews().is_running("acme/widgets/2"));

    let started = api
        .state()
        .reviews
        .iter()
        .find(|r| r.key == "acme/widgets/2")
        .cloned();
    assert!(started.is_some_and(|r| r.is_followup));
    let request = api.state().started[0].clone();
    assert_eq!(request.previous_review_id, Some(1002));
    assert_eq!(request.title.as_deref(), Some("PR 2"));
}

#[tokio::test(start_paused = true)]
async fn test_review_of_pr_outside_loaded_list() {
    let api = FakeApi::new();
    seed_acme(&api);
    let dashboard = dashboard(&api);

    // Nothing selected: no repo to default to
    assert!(dashboard.review_pr(42, false).await.is_err());

    dashboard
        .review_pr_in("acme/widgets", 42, None, true)
        .await
        .unwrap();
    dashboard
        .review_pr_in(
            "acme/api",
            9,
            Some("https://ghe.example.com/acme/api/pull/9".to_string()),
            false,
        )
        .await
        .unwrap();

    let started = api.state().started.clone();
    assert_eq!(started.len(), 2);
    assert_eq!(started[0].url, "https://github.com/acme/widgets/pull/42");
    // Looked up on the backend since no PR list is loaded
    assert_eq!(started[0].previous_review_id, Some(1042));
    assert_eq!(started[0].title, None);
    assert_eq!(started[1].url, "https://ghe.example.com/acme/api/pull/9");
    assert_eq!(started[1].previous_review_id, None);
    assert!(dashboard.reviews().is_running("acme/api/9"));

    assert!(dashboard.review_pr_in("widgets", 1, None, false).await.is_err());
}
