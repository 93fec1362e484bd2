//! Terminal output: plain tables, or JSON with `--json`.

use std::collections::HashMap;

use anyhow::Result;
use prdeck_core::types::{
    Account, ActiveReview, CacheMeta, DeveloperStats, Divergence, FilterOptions,
    LifecycleMetrics, MergeQueueItem, PullRequest, QueueNote, Repository, ReviewHistoryEntry,
    ReviewScore, ReviewerStats, WorkflowRun, WorkflowStats,
};
use prdeck_core::Config;
use serde::Serialize;

const TITLE_WIDTH: usize = 50;

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let cut: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{cut}...")
}

fn hours(value: Option<f64>) -> String {
    value.map(|h| format!("{h:.1}h")).unwrap_or_else(|| "-".to_string())
}

pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn json_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// JSON mode prints `value`; table mode runs `table`.
    fn emit<T: Serialize + ?Sized>(&self, value: &T, table: impl FnOnce()) -> Result<()> {
        if self.json {
            return self.json_value(value);
        }
        table();
        Ok(())
    }

    pub fn config(&self, config: &Config) -> Result<()> {
        let value = serde_json::json!({
            "configPath": Config::config_path(),
            "logPath": config.log_path(),
            "baseUrl": config.server.base_url,
            "timeoutSecs": config.server.timeout_secs,
            "reviewPollIntervalMs": config.sync.review_poll_interval_ms,
            "settingsDebounceMs": config.sync.settings_debounce_ms,
            "pageSize": config.sync.page_size,
            "logLevel": config.logging.level,
            "logRotation": format!("{:?}", config.logging.rotation).to_lowercase(),
        });
        self.emit(&value, || {
            println!("Config file:   {}", Config::config_path().display());
            println!("Log file:      {}", config.log_path().display());
            println!("Backend:       {}", config.server.base_url);
            println!("Timeout:       {}s", config.server.timeout_secs);
            println!("Review poll:   {}ms", config.sync.review_poll_interval_ms);
            println!("Save debounce: {}ms", config.sync.settings_debounce_ms);
            println!(
                "Log level:     {} (rotated {:?})",
                config.logging.level, config.logging.rotation
            );
        })
    }

    pub fn accounts(&self, accounts: &[Account]) -> Result<()> {
        self.emit(accounts, || {
            for account in accounts {
                println!(
                    "{:<30} {:?}{}",
                    account.login,
                    account.kind,
                    if account.is_personal { " (you)" } else { "" }
                );
            }
        })
    }

    pub fn repos(&self, repos: &[Repository]) -> Result<()> {
        self.emit(repos, || {
            for repo in repos {
                println!(
                    "{:<45} {}",
                    repo.full_name(),
                    if repo.is_private { "private" } else { "public" }
                );
            }
            println!("\n{} repositories", repos.len());
        })
    }

    pub fn prs(&self, prs: &[&PullRequest]) -> Result<()> {
        self.emit(prs, || {
            for pr in prs {
                println!(
                    "#{:<6} {:<w$} {:<16} +{}/-{}{}",
                    pr.number,
                    truncate(&pr.title, TITLE_WIDTH),
                    pr.author_login(),
                    pr.additions,
                    pr.deletions,
                    if pr.is_draft { "  draft" } else { "" },
                    w = TITLE_WIDTH
                );
            }
            println!("\n{} pull requests", prs.len());
        })
    }

    pub fn prs_detail(
        &self,
        prs: &[&PullRequest],
        divergence: Option<&HashMap<u64, Divergence>>,
        scores: Option<&HashMap<u64, ReviewScore>>,
    ) -> Result<()> {
        if self.json {
            return self.json_value(&serde_json::json!({
                "prs": prs,
                "divergence": divergence,
                "scores": scores,
            }));
        }
        for pr in prs {
            let behind = divergence
                .and_then(|d| d.get(&pr.number))
                .map(|d| format!("{} behind, {} ahead", d.behind_by, d.ahead_by))
                .unwrap_or_else(|| "-".to_string());
            let score = scores
                .and_then(|s| s.get(&pr.number))
                .and_then(|s| s.score)
                .map(|s| format!("{s:.1}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "#{:<6} {:<w$} {:<16} {:<24} score {}",
                pr.number,
                truncate(&pr.title, TITLE_WIDTH),
                pr.author_login(),
                behind,
                score,
                w = TITLE_WIDTH
            );
        }
        Ok(())
    }

    pub fn queue(&self, items: &[MergeQueueItem]) -> Result<()> {
        self.emit(items, || {
            if items.is_empty() {
                println!("Merge queue is empty.");
                return;
            }
            for (position, item) in items.iter().enumerate() {
                let mut flags = Vec::new();
                if item.has_new_commits {
                    flags.push("new commits".to_string());
                }
                if let Some(score) = item.review_score {
                    flags.push(format!("score {score:.1}"));
                }
                if item.notes_count > 0 {
                    flags.push(format!("{} notes", item.notes_count));
                }
                println!(
                    "{:>3}. {}#{:<6} {:<w$} {}",
                    position + 1,
                    item.repo,
                    item.number,
                    truncate(&item.title, TITLE_WIDTH),
                    flags.join(", "),
                    w = TITLE_WIDTH
                );
            }
        })
    }

    pub fn notes(&self, notes: &[QueueNote]) -> Result<()> {
        self.emit(notes, || {
            for note in notes {
                println!(
                    "[{}] {} {}",
                    note.id,
                    note.created_at.as_deref().unwrap_or(""),
                    note.content
                );
            }
        })
    }

    pub fn reviews(&self, reviews: &[ActiveReview]) -> Result<()> {
        self.emit(reviews, || {
            if reviews.is_empty() {
                println!("No review jobs.");
            }
            for review in reviews {
                println!(
                    "{:<40} {:<10} {}",
                    review.key,
                    format!("{:?}", review.status),
                    review.started_at.as_deref().unwrap_or("")
                );
            }
        })
    }

    pub fn history(&self, entries: &[ReviewHistoryEntry]) -> Result<()> {
        self.emit(entries, || {
            for entry in entries {
                println!(
                    "{:<6} {}#{:<6} {:<w$} {}{}",
                    entry.id,
                    entry.repo,
                    entry.pr_number,
                    truncate(entry.pr_title.as_deref().unwrap_or(""), TITLE_WIDTH),
                    entry
                        .score
                        .map(|s| format!("{s:.1}"))
                        .unwrap_or_else(|| "-".to_string()),
                    if entry.is_followup { " (follow-up)" } else { "" },
                    w = TITLE_WIDTH
                );
            }
        })
    }

    pub fn filter_options(&self, options: &FilterOptions) -> Result<()> {
        self.emit(options, || {
            println!("authors:    {}", options.contributors.join(", "));
            println!("labels:     {}", options.labels.join(", "));
            println!("branches:   {}", options.branches.join(", "));
            let milestones: Vec<String> = options
                .milestones
                .iter()
                .map(|m| format!("{} (#{})", m.title, m.number))
                .collect();
            println!("milestones: {}", milestones.join(", "));
            let teams: Vec<&str> = options.teams.iter().map(|t| t.slug.as_str()).collect();
            println!("teams:      {}", teams.join(", "));
        })
    }

    pub fn developers(&self, stats: &[DeveloperStats], cache: &CacheMeta) -> Result<()> {
        self.emit(stats, || {
            println!(
                "{:<24} {:>8} {:>10} {:>10} {:>8} {:>8}",
                "developer", "commits", "added", "deleted", "merged", "reviews"
            );
            for dev in stats {
                println!(
                    "{:<24} {:>8} {:>10} {:>10} {:>8} {:>8}",
                    dev.login,
                    dev.commits,
                    dev.lines_added,
                    dev.lines_deleted,
                    dev.prs_merged,
                    dev.reviews_given
                );
            }
            if let Some(updated) = cache.last_updated.as_deref() {
                println!("\nUpdated {updated}{}", if cache.stale { " (stale)" } else { "" });
            }
        })
    }

    pub fn lifecycle(&self, metrics: &LifecycleMetrics) -> Result<()> {
        self.emit(metrics, || {
            println!(
                "Time to merge:        median {}, avg {}",
                hours(metrics.median_time_to_merge),
                hours(metrics.avg_time_to_merge)
            );
            println!(
                "Time to first review: median {}, avg {}",
                hours(metrics.median_time_to_first_review),
                hours(metrics.avg_time_to_first_review)
            );
            println!("Stale PRs:            {}", metrics.stale_count);
            for pr in &metrics.stale_prs {
                println!(
                    "  #{:<6} {:<w$} {:.0} days",
                    pr.number,
                    truncate(pr.title.as_deref().unwrap_or(""), TITLE_WIDTH),
                    pr.age_days,
                    w = TITLE_WIDTH
                );
            }
        })
    }

    pub fn reviewers(&self, reviewers: &[ReviewerStats]) -> Result<()> {
        self.emit(reviewers, || {
            for reviewer in reviewers {
                println!(
                    "{:<24} {:>5} reviews  median {:>8}  approvals {:.0}%",
                    reviewer.reviewer,
                    reviewer.total_reviews,
                    hours(reviewer.median_response_time_hours),
                    reviewer.approval_rate
                );
            }
        })
    }

    pub fn workflow_runs(&self, runs: &[WorkflowRun], stats: &WorkflowStats) -> Result<()> {
        self.emit(runs, || {
            for run in runs {
                println!(
                    "{:<12} {:<30} {:<20} {:<10} {}",
                    run.id,
                    truncate(run.name.as_deref().unwrap_or(""), 30),
                    run.head_branch.as_deref().unwrap_or(""),
                    run.conclusion
                        .as_deref()
                        .or(run.status.as_deref())
                        .unwrap_or(""),
                    run.duration_seconds
                        .map(|s| format!("{s}s"))
                        .unwrap_or_default()
                );
            }
            println!(
                "\n{} runs, {:.0}% passing, {} failures",
                stats.total_runs, stats.pass_rate, stats.failure_count
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long pull request title", 10), "a long ...");
        assert_eq!(truncate("ünïcödé titles", 8).chars().count(), 8);
    }

    #[test]
    fn test_hours() {
        assert_eq!(hours(Some(3.5)), "3.5h");
        assert_eq!(hours(None), "-");
    }
}
