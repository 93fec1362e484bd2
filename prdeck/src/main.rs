//! prdeck - pull request dashboard client
//!
//! Talks to the dashboard backend to list accounts, repos and pull requests,
//! manage the merge queue and run code reviews from the terminal.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Logs: $XDG_STATE_HOME/prdeck/prdeck.log (~/.local/state/prdeck/prdeck.log)
//! - Config: $XDG_CONFIG_HOME/prdeck/config.toml (~/.config/prdeck/config.toml)

mod print;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use prdeck_core::columns::PrColumn;
use prdeck_core::dashboard::{fetch_filter_options, DEFAULT_ACTIVITY_WEEKS};
use prdeck_core::sort::SortDirection;
use prdeck_core::types::{
    split_full_name, HistoryQuery, QueueKey, QueuePr, ReviewSection, WorkflowRunFilters,
};
use prdeck_core::{ApiClient, Config, Dashboard, DashboardApi, FilterField, FilterSettings};

use crate::print::Output;

#[derive(Parser)]
#[command(name = "prdeck")]
#[command(about = "Pull request dashboard client")]
#[command(version)]
struct Cli {
    /// Backend API base URL (overrides config)
    #[arg(long, global = true)]
    api: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Log to stderr too (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the resolved configuration
    Config,
    /// List accounts (user and organizations)
    Accounts,
    /// List repositories of an account
    Repos { account: String },
    /// List pull requests of a repository
    Prs(PrArgs),
    /// Labels, branches, people, milestones and teams to filter PRs by
    Options {
        /// Repository as owner/name
        repo: String,
    },
    /// Repository analytics
    Stats {
        /// Repository as owner/name
        repo: String,
        #[command(subcommand)]
        report: StatsReport,
        /// Bypass the backend cache
        #[arg(long, global = true)]
        refresh: bool,
    },
    /// Manage the merge queue
    #[command(subcommand)]
    Queue(QueueCommand),
    /// Start, watch and cancel code reviews
    #[command(subcommand)]
    Reviews(ReviewCommand),
    /// Past reviews
    History {
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// Every review of one PR, with content (needs --repo)
        #[arg(long, requires = "repo")]
        pr: Option<u64>,
        #[arg(long, default_value = "50")]
        limit: u32,
        /// Show aggregate stats instead of the list
        #[arg(long)]
        stats: bool,
    },
    /// Saved dashboard settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Args)]
struct PrArgs {
    /// Repository as owner/name
    repo: String,
    /// open, closed, merged or all
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    assignee: Option<String>,
    /// Repeat for several labels
    #[arg(long = "label")]
    labels: Vec<String>,
    #[arg(long)]
    base: Option<String>,
    #[arg(long)]
    search: Option<String>,
    /// 10, 25, 50 or 100
    #[arg(long)]
    limit: Option<u32>,
    /// Column to sort the table by
    #[arg(long)]
    sort: Option<PrColumn>,
    #[arg(long)]
    asc: bool,
    /// Also show branch divergence and review scores
    #[arg(short, long)]
    detail: bool,
}

#[derive(Subcommand)]
enum StatsReport {
    Developers,
    Activity {
        #[arg(long, default_value_t = DEFAULT_ACTIVITY_WEEKS)]
        weeks: u32,
    },
    Lifecycle,
    Reviewers,
    Contributors,
    Workflows {
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        conclusion: Option<String>,
    },
}

#[derive(Subcommand)]
enum QueueCommand {
    /// Show the queue in order
    List,
    /// Queue a pull request
    Add { repo: String, number: u64 },
    /// Dequeue a pull request
    Remove { repo: String, number: u64 },
    /// Move an entry to a new position (1-based)
    Move { from: usize, to: usize },
    /// Put the queue in this order; unlisted entries follow
    Reorder {
        /// Entries as owner/name#number
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Show or add notes on a queued pull request
    Notes {
        repo: String,
        number: u64,
        #[arg(long)]
        add: Option<String>,
        #[arg(long)]
        delete: Option<i64>,
    },
}

#[derive(Subcommand)]
enum ReviewCommand {
    /// Show review jobs
    List,
    /// Start a review of a pull request
    Start {
        repo: String,
        number: u64,
        /// Follow up on the previous review
        #[arg(long)]
        followup: bool,
        /// PR page to review (defaults to the github.com URL)
        #[arg(long)]
        url: Option<String>,
        /// Wait for the review to finish
        #[arg(short, long)]
        watch: bool,
    },
    /// Wait for a running review to finish
    Watch { key: String },
    /// Cancel a running review
    Cancel { key: String },
    /// Post a stored review's issues as inline PR comments
    Post {
        review_id: i64,
        #[arg(long, value_enum, default_value = "critical")]
        section: SectionArg,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SectionArg {
    Critical,
    Major,
    Minor,
}

impl From<SectionArg> for ReviewSection {
    fn from(section: SectionArg) -> Self {
        match section {
            SectionArg::Critical => ReviewSection::Critical,
            SectionArg::Major => ReviewSection::Major,
            SectionArg::Minor => ReviewSection::Minor,
        }
    }
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the saved snapshot
    Show,
    /// Delete the saved snapshot
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(api) = cli.api.clone() {
        config.server.base_url = api;
    }
    if let Some(level) = prdeck_core::logging::verbosity_level(cli.verbose) {
        config.logging.stderr_level = Some(level.to_string());
    }

    // Initialize logging
    let _log_guard =
        prdeck_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!(base_url = %config.server.base_url, "prdeck starting");

    let out = Output::new(cli.json);
    let api = Arc::new(ApiClient::new(&config.server).context("failed to create API client")?);
    let dashboard = Dashboard::new(api.clone(), config.sync.clone());

    match cli.command {
        Command::Config => out.config(&config),
        Command::Accounts => {
            let accounts = api.accounts().await.context("failed to load accounts")?;
            out.accounts(&accounts)
        }
        Command::Repos { account } => {
            let repos = api
                .repos(&account, config.sync.repo_list_limit)
                .await
                .with_context(|| format!("failed to load repos of {account}"))?;
            out.repos(&repos)
        }
        Command::Prs(args) => prs(&dashboard, &out, args).await,
        Command::Options { repo } => {
            let (owner, name) = parse_repo(&repo)?;
            let options = fetch_filter_options(api.as_ref(), owner, name).await;
            out.filter_options(&options)
        }
        Command::Stats {
            repo,
            report,
            refresh,
        } => stats(api.as_ref(), &out, &repo, report, refresh).await,
        Command::Queue(command) => queue(&dashboard, api.as_ref(), &out, command).await,
        Command::Reviews(command) => review(&dashboard, &out, command).await,
        Command::History {
            repo,
            author,
            search,
            pr,
            limit,
            stats,
        } => {
            if let (Some(number), Some(repo)) = (pr, repo.as_deref()) {
                let (owner, name) = parse_repo(repo)?;
                let reviews = api
                    .pr_review_history(owner, name, number)
                    .await
                    .with_context(|| format!("failed to load reviews of {repo}#{number}"))?;
                return out.history(&reviews);
            }
            if stats {
                let stats = api.review_stats().await.context("failed to load review stats")?;
                return out.json_value(&stats);
            }
            let query = HistoryQuery {
                repo,
                author,
                search,
                limit: Some(limit),
                ..Default::default()
            };
            dashboard.load_review_history(&query).await;
            dashboard.view(|s| match s.history.error() {
                Some(e) => bail!("failed to load review history: {e}"),
                None => out.history(s.history.data()),
            })
        }
        Command::Settings(SettingsCommand::Show) => {
            match dashboard.settings().load_snapshot().await {
                Some(snapshot) => out.json_value(&snapshot),
                None => {
                    println!("No saved settings.");
                    Ok(())
                }
            }
        }
        Command::Settings(SettingsCommand::Clear) => {
            dashboard
                .settings()
                .clear()
                .await
                .context("failed to clear saved settings")?;
            println!("Saved settings cleared.");
            Ok(())
        }
    }
}

fn parse_repo(full_name: &str) -> Result<(&str, &str)> {
    split_full_name(full_name)
        .with_context(|| format!("expected owner/name, got '{full_name}'"))
}

fn parse_queue_entry(entry: &str) -> Result<QueueKey> {
    let (repo, number) = entry
        .rsplit_once('#')
        .with_context(|| format!("expected owner/name#number, got '{entry}'"))?;
    parse_repo(repo)?;
    let number = number
        .parse()
        .with_context(|| format!("invalid PR number in '{entry}'"))?;
    Ok(QueueKey::new(number, repo))
}

async fn prs(dashboard: &Dashboard, out: &Output, args: PrArgs) -> Result<()> {
    parse_repo(&args.repo)?;

    let mut filters = FilterSettings::default();
    if let Some(state) = args.state {
        filters.set(FilterField::State, state)?;
    }
    if let Some(limit) = args.limit {
        filters.set(FilterField::Limit, limit)?;
    }
    for (field, value) in [
        (FilterField::Author, args.author),
        (FilterField::Assignee, args.assignee),
        (FilterField::Base, args.base),
        (FilterField::Search, args.search),
    ] {
        if let Some(value) = value {
            filters.set(field, value)?;
        }
    }
    if !args.labels.is_empty() {
        filters.set(FilterField::Labels, args.labels)?;
    }

    // Filters first so the PR list is fetched once, for the final query.
    dashboard.apply_filters(filters).await;
    dashboard.select_repo(&args.repo).await?;

    if let Some(column) = args.sort {
        let direction = if args.asc {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        };
        dashboard.update_view(|s| s.prs.set_sort_explicit(column, direction));
    }

    dashboard.view(|s| {
        if let Some(e) = s.prs.error() {
            bail!("failed to load pull requests: {e}");
        }
        let rows = s.prs.sorted();
        if args.detail {
            out.prs_detail(&rows, s.divergence.data(), s.review_scores.data())
        } else {
            out.prs(&rows)
        }
    })
}

async fn stats(
    api: &dyn DashboardApi,
    out: &Output,
    repo: &str,
    report: StatsReport,
    refresh: bool,
) -> Result<()> {
    let (owner, name) = parse_repo(repo)?;

    match report {
        StatsReport::Developers => {
            let report = api
                .developer_stats(owner, name, refresh)
                .await
                .context("failed to load developer stats")?;
            out.developers(&report.stats, &report.cache)
        }
        StatsReport::Activity { weeks } => {
            let activity = api
                .code_activity(owner, name, weeks, refresh)
                .await
                .context("failed to load code activity")?;
            out.json_value(&activity)
        }
        StatsReport::Lifecycle => {
            let metrics = api
                .lifecycle_metrics(owner, name, refresh)
                .await
                .context("failed to load lifecycle metrics")?;
            out.lifecycle(&metrics)
        }
        StatsReport::Reviewers => {
            let report = api
                .review_responsiveness(owner, name, refresh)
                .await
                .context("failed to load review responsiveness")?;
            out.reviewers(&report.leaderboard)
        }
        StatsReport::Contributors => {
            let contributors = api
                .contributor_timeseries(owner, name, refresh)
                .await
                .context("failed to load contributors")?;
            out.json_value(&contributors)
        }
        StatsReport::Workflows { branch, conclusion } => {
            let filters = WorkflowRunFilters {
                branch,
                conclusion,
                ..Default::default()
            };
            let report = api
                .workflow_runs(owner, name, &filters, refresh)
                .await
                .context("failed to load workflow runs")?;
            out.workflow_runs(&report.runs, &report.stats)
        }
    }
}

async fn queue(
    dashboard: &Dashboard,
    api: &dyn DashboardApi,
    out: &Output,
    command: QueueCommand,
) -> Result<()> {
    let queue = dashboard.queue();
    queue.load().await;
    if let Some(e) = queue.with_items(|slice| slice.error().map(str::to_string)) {
        bail!("failed to load merge queue: {e}");
    }

    match command {
        QueueCommand::List => {}
        QueueCommand::Add { repo, number } => {
            let (owner, name) = parse_repo(&repo)?;
            let query = FilterSettings {
                state: prdeck_core::PrState::All,
                ..Default::default()
            }
            .to_query();
            let pr = api
                .pull_requests(owner, name, &query)
                .await
                .context("failed to load pull requests")?
                .into_iter()
                .find(|pr| pr.number == number)
                .with_context(|| format!("no PR #{number} in {repo}"))?;
            if let Some(handle) = queue.add(QueuePr::from_pull_request(&pr, &repo)) {
                handle.await?;
            }
        }
        QueueCommand::Remove { repo, number } => match queue.remove(number, &repo) {
            Some(handle) => handle.await?,
            None => bail!("{repo}#{number} is not queued"),
        },
        QueueCommand::Move { from, to } => {
            let handle = queue
                .move_item(from.saturating_sub(1), to.saturating_sub(1))
                .context("position out of range")?;
            handle.await?;
        }
        QueueCommand::Reorder { entries } => {
            let order = entries
                .iter()
                .map(|entry| parse_queue_entry(entry))
                .collect::<Result<Vec<_>>>()?;
            queue.reorder(order).await?;
        }
        QueueCommand::Notes {
            repo,
            number,
            add,
            delete,
        } => {
            let key = QueueKey::new(number, repo);
            if let Some(content) = add {
                queue.add_note(&key, &content).await?;
            }
            if let Some(note_id) = delete {
                queue.delete_note(&key, note_id).await?;
            }
            queue.load_notes(&key).await;
            if let Some(e) = queue.notes_error(&key) {
                bail!("failed to load notes: {e}");
            }
            return out.notes(&queue.notes(&key));
        }
    }

    out.queue(&queue.items())
}

async fn review(dashboard: &Dashboard, out: &Output, command: ReviewCommand) -> Result<()> {
    let reviews = dashboard.reviews();
    match command {
        ReviewCommand::List => {
            reviews.refresh().await;
            if let Some(e) = reviews.error() {
                bail!("failed to load reviews: {e}");
            }
            out.reviews(&reviews.reviews())
        }
        ReviewCommand::Start {
            repo,
            number,
            followup,
            url,
            watch,
        } => {
            parse_repo(&repo)?;
            let response = dashboard
                .review_pr_in(&repo, number, url, followup)
                .await
                .with_context(|| format!("failed to start review of {repo}#{number}"))?;
            println!("Review started: {}", response.key);
            if watch {
                watch_review(dashboard, &response.key).await?;
            }
            Ok(())
        }
        ReviewCommand::Watch { key } => watch_review(dashboard, &key).await,
        ReviewCommand::Cancel { key } => {
            reviews
                .cancel(&key)
                .await
                .with_context(|| format!("failed to cancel {key}"))?;
            println!("Review cancelled: {key}");
            Ok(())
        }
        ReviewCommand::Post { review_id, section } => {
            let result = reviews.post_inline_comments(review_id, section.into()).await?;
            out.json_value(&result)
        }
    }
}

async fn watch_review(dashboard: &Dashboard, key: &str) -> Result<()> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {elapsed} {msg}")
            .context("invalid progress template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(format!("reviewing {key}"));

    let interval = dashboard.reviews().poll_interval();
    let review = loop {
        let review = dashboard
            .reviews()
            .status(key)
            .await
            .with_context(|| format!("failed to fetch status of {key}"))?;
        if review.status.is_terminal() {
            break review;
        }
        tokio::time::sleep(interval).await;
    };
    pb.finish_and_clear();

    println!(
        "Review {}: {:?}{}",
        key,
        review.status,
        review
            .review_file
            .as_deref()
            .map(|f| format!(" ({f})"))
            .unwrap_or_default()
    );
    if let Some(error) = review.error_output.as_deref().filter(|e| !e.is_empty()) {
        eprintln!("{error}");
    }
    Ok(())
}
