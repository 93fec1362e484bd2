//! Sortable columns for each table-shaped resource

use std::str::FromStr;

use crate::sort::{SortColumn, SortValue};
use crate::types::{
    DeveloperStats, LifecyclePr, MergeQueueItem, PullRequest, ReviewHistoryEntry, ReviewerStats,
    WorkflowRun,
};

/// Declares a column enum with its front-end names and a `FromStr` impl.
macro_rules! columns {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|c| c.label() == s)
                    .ok_or_else(|| format!("unknown column for {}: {s}", stringify!($name)))
            }
        }
    };
}

fn opt_text(value: Option<&str>) -> Option<SortValue> {
    value.filter(|s| !s.is_empty()).map(SortValue::text)
}

columns!(PrColumn {
    Number => "number",
    Title => "title",
    Author => "author",
    Created => "created",
    Updated => "updated",
    Additions => "additions",
    Deletions => "deletions",
    ChangedFiles => "changed_files",
});

impl SortColumn<PullRequest> for PrColumn {
    fn name(&self) -> &'static str {
        self.label()
    }

    fn sort_key(&self, pr: &PullRequest) -> Option<SortValue> {
        match self {
            PrColumn::Number => Some(pr.number.into()),
            PrColumn::Title => Some(SortValue::text(&pr.title)),
            PrColumn::Author => opt_text(Some(pr.author_login())),
            // RFC 3339 timestamps order lexically
            PrColumn::Created => opt_text(pr.created_at.as_deref()),
            PrColumn::Updated => opt_text(pr.updated_at.as_deref()),
            PrColumn::Additions => Some(pr.additions.into()),
            PrColumn::Deletions => Some(pr.deletions.into()),
            PrColumn::ChangedFiles => Some(pr.changed_files.into()),
        }
    }
}

columns!(QueueColumn {
    AddedAt => "added_at",
    Repo => "repo",
    Score => "review_score",
    Notes => "notes_count",
});

impl SortColumn<MergeQueueItem> for QueueColumn {
    fn name(&self) -> &'static str {
        self.label()
    }

    fn sort_key(&self, item: &MergeQueueItem) -> Option<SortValue> {
        match self {
            QueueColumn::AddedAt => opt_text(item.added_at.as_deref()),
            QueueColumn::Repo => Some(SortValue::text(&item.repo)),
            QueueColumn::Score => item.review_score.map(SortValue::from),
            QueueColumn::Notes => Some(i64::from(item.notes_count).into()),
        }
    }
}

columns!(DeveloperColumn {
    Login => "login",
    Commits => "commits",
    LinesAdded => "lines_added",
    LinesDeleted => "lines_deleted",
    PrsAuthored => "prs_authored",
    PrsMerged => "prs_merged",
    ReviewsGiven => "reviews_given",
    Approvals => "approvals",
    AvgPrScore => "avg_pr_score",
});

impl SortColumn<DeveloperStats> for DeveloperColumn {
    fn name(&self) -> &'static str {
        self.label()
    }

    fn sort_key(&self, dev: &DeveloperStats) -> Option<SortValue> {
        match self {
            DeveloperColumn::Login => Some(SortValue::text(&dev.login)),
            DeveloperColumn::Commits => Some(dev.commits.into()),
            DeveloperColumn::LinesAdded => Some(dev.lines_added.into()),
            DeveloperColumn::LinesDeleted => Some(dev.lines_deleted.into()),
            DeveloperColumn::PrsAuthored => Some(dev.prs_authored.into()),
            DeveloperColumn::PrsMerged => Some(dev.prs_merged.into()),
            DeveloperColumn::ReviewsGiven => Some(dev.reviews_given.into()),
            DeveloperColumn::Approvals => Some(dev.approvals.into()),
            DeveloperColumn::AvgPrScore => dev.avg_pr_score.map(SortValue::from),
        }
    }
}

columns!(LifecycleColumn {
    Number => "number",
    Author => "author",
    Created => "created_at",
    TimeToFirstReview => "time_to_first_review_hours",
    TimeToMerge => "time_to_merge_hours",
});

impl SortColumn<LifecyclePr> for LifecycleColumn {
    fn name(&self) -> &'static str {
        self.label()
    }

    fn sort_key(&self, pr: &LifecyclePr) -> Option<SortValue> {
        match self {
            LifecycleColumn::Number => Some(pr.number.into()),
            LifecycleColumn::Author => opt_text(pr.author.as_deref()),
            LifecycleColumn::Created => opt_text(pr.created_at.as_deref()),
            LifecycleColumn::TimeToFirstReview => {
                pr.time_to_first_review_hours.map(SortValue::from)
            }
            LifecycleColumn::TimeToMerge => pr.time_to_merge_hours.map(SortValue::from),
        }
    }
}

columns!(ReviewerColumn {
    Reviewer => "reviewer",
    AvgResponse => "avg_response_time_hours",
    MedianResponse => "median_response_time_hours",
    TotalReviews => "total_reviews",
    ApprovalRate => "approval_rate",
});

impl SortColumn<ReviewerStats> for ReviewerColumn {
    fn name(&self) -> &'static str {
        self.label()
    }

    fn sort_key(&self, row: &ReviewerStats) -> Option<SortValue> {
        match self {
            ReviewerColumn::Reviewer => Some(SortValue::text(&row.reviewer)),
            ReviewerColumn::AvgResponse => row.avg_response_time_hours.map(SortValue::from),
            ReviewerColumn::MedianResponse => {
                row.median_response_time_hours.map(SortValue::from)
            }
            ReviewerColumn::TotalReviews => Some(row.total_reviews.into()),
            ReviewerColumn::ApprovalRate => Some(row.approval_rate.into()),
        }
    }
}

columns!(WorkflowRunColumn {
    Created => "created_at",
    Name => "name",
    Branch => "head_branch",
    Conclusion => "conclusion",
    Duration => "duration_seconds",
    RunNumber => "run_number",
});

impl SortColumn<WorkflowRun> for WorkflowRunColumn {
    fn name(&self) -> &'static str {
        self.label()
    }

    fn sort_key(&self, run: &WorkflowRun) -> Option<SortValue> {
        match self {
            WorkflowRunColumn::Created => opt_text(run.created_at.as_deref()),
            WorkflowRunColumn::Name => opt_text(run.name.as_deref()),
            WorkflowRunColumn::Branch => opt_text(run.head_branch.as_deref()),
            WorkflowRunColumn::Conclusion => opt_text(run.conclusion.as_deref()),
            WorkflowRunColumn::Duration => run.duration_seconds.map(SortValue::from),
            WorkflowRunColumn::RunNumber => run.run_number.map(SortValue::from),
        }
    }
}

columns!(HistoryColumn {
    Timestamp => "review_timestamp",
    Repo => "repo",
    PrNumber => "pr_number",
    Score => "score",
    Author => "pr_author",
});

impl SortColumn<ReviewHistoryEntry> for HistoryColumn {
    fn name(&self) -> &'static str {
        self.label()
    }

    fn sort_key(&self, entry: &ReviewHistoryEntry) -> Option<SortValue> {
        match self {
            HistoryColumn::Timestamp => opt_text(entry.review_timestamp.as_deref()),
            HistoryColumn::Repo => Some(SortValue::text(&entry.repo)),
            HistoryColumn::PrNumber => Some(entry.pr_number.into()),
            HistoryColumn::Score => entry.score.map(SortValue::from),
            HistoryColumn::Author => opt_text(entry.pr_author.as_deref()),
        }
    }
}
