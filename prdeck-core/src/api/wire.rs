//! Response envelopes and request bodies
//!
//! List endpoints wrap their payload in a named field (`{"prs": [...]}`),
//! so every endpoint gets a small struct naming that field.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{
    Account, ActiveReview, ContributorTimeSeries, Divergence, DivergenceRequest, MergeQueueItem,
    Milestone, PullRequest, QueueKey, QueueNote, Repository, ReviewDetail, ReviewHistoryEntry,
    ReviewScore, ReviewSection, ReviewStats, Team,
};

#[derive(Debug, Deserialize)]
pub struct AccountsEnvelope {
    pub accounts: Vec<Account>,
}

#[derive(Debug, Deserialize)]
pub struct ReposEnvelope {
    pub repos: Vec<Repository>,
}

#[derive(Debug, Deserialize)]
pub struct PrsEnvelope {
    pub prs: Vec<PullRequest>,
}

/// Keys are PR numbers rendered as strings.
#[derive(Debug, Deserialize)]
pub struct DivergenceEnvelope {
    #[serde(default)]
    pub divergence: HashMap<String, Divergence>,
}

impl DivergenceEnvelope {
    /// Re-key by PR number, dropping keys that are not numbers.
    pub fn into_map(self) -> HashMap<u64, Divergence> {
        self.divergence
            .into_iter()
            .filter_map(|(number, d)| number.parse().ok().map(|n| (n, d)))
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct DivergenceBody<'a> {
    pub prs: &'a [DivergenceRequest],
}

#[derive(Debug, Deserialize)]
pub struct ReviewCheckEnvelope {
    #[serde(default)]
    pub has_review: bool,
    #[serde(default)]
    pub latest_review: Option<ReviewScore>,
}

#[derive(Debug, Deserialize)]
pub struct ContributorsEnvelope {
    #[serde(default)]
    pub contributors: Vec<ContributorTimeSeries>,
}

/// Contributor logins of a repository (filter options, not the time series)
#[derive(Debug, Deserialize)]
pub struct RepoContributorsEnvelope {
    #[serde(default)]
    pub contributors: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LabelsEnvelope {
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BranchesEnvelope {
    #[serde(default)]
    pub branches: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MilestonesEnvelope {
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Deserialize)]
pub struct TeamsEnvelope {
    #[serde(default)]
    pub teams: Vec<Team>,
}

#[derive(Debug, Deserialize)]
pub struct QueueEnvelope {
    pub queue: Vec<MergeQueueItem>,
}

#[derive(Debug, Deserialize)]
pub struct QueueItemEnvelope {
    pub item: MergeQueueItem,
}

#[derive(Debug, Serialize)]
pub struct ReorderBody<'a> {
    pub order: &'a [QueueKey],
}

#[derive(Debug, Deserialize)]
pub struct NotesEnvelope {
    pub notes: Vec<QueueNote>,
}

#[derive(Debug, Deserialize)]
pub struct NoteEnvelope {
    pub note: QueueNote,
}

#[derive(Debug, Serialize)]
pub struct NoteBody<'a> {
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ActiveReviewsEnvelope {
    pub reviews: Vec<ActiveReview>,
}

#[derive(Debug, Serialize)]
pub struct InlineCommentsBody {
    pub section: ReviewSection,
}

#[derive(Debug, Deserialize)]
pub struct HistoryEnvelope {
    pub reviews: Vec<ReviewHistoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewEnvelope {
    pub review: ReviewDetail,
}

#[derive(Debug, Deserialize)]
pub struct ReviewStatsEnvelope {
    pub stats: ReviewStats,
}

#[derive(Debug, Deserialize)]
pub struct SettingEnvelope {
    #[serde(default)]
    pub key: Option<String>,
    pub value: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct SettingBody<'a> {
    pub value: &'a serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divergence_keys_are_parsed() {
        let json = r#"{"divergence": {
            "12": {"status": "behind", "ahead_by": 1, "behind_by": 4},
            "bogus": {"ahead_by": 0, "behind_by": 0}
        }}"#;
        let map = serde_json::from_str::<DivergenceEnvelope>(json)
            .unwrap()
            .into_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map[&12].behind_by, 4);
    }

    #[test]
    fn test_review_check_without_review() {
        let env: ReviewCheckEnvelope = serde_json::from_str(r#"{"has_review": false}"#).unwrap();
        assert!(!env.has_review);
        assert!(env.latest_review.is_none());
    }

    #[test]
    fn test_reorder_body_shape() {
        let order = vec![QueueKey::new(5, "acme/api"), QueueKey::new(2, "acme/web")];
        let json = serde_json::to_value(ReorderBody { order: &order }).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"order": [
                {"number": 5, "repo": "acme/api"},
                {"number": 2, "repo": "acme/web"}
            ]})
        );
    }
}
