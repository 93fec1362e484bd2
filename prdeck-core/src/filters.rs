//! PR list filters and their query-parameter derivation
//!
//! [`FilterSettings`] is the flat record behind the filter panel. It is
//! mutated one field at a time through [`FilterSettings::set`], replaced
//! wholesale when a saved snapshot is restored, and turned into the PR list
//! query by [`FilterSettings::to_query`].
//!
//! ## Derivation rules
//!
//! - `state` and `limit` always form the baseline of the query
//! - empty strings, empty lists and `false` flags are omitted
//! - lists are comma-joined into one value
//! - `sortDirection` is only sent alongside a non-empty `sortBy`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sort::SortDirection;

/// PR state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    #[default]
    Open,
    Closed,
    Merged,
    All,
}

impl PrState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
            PrState::Merged => "merged",
            PrState::All => "all",
        }
    }
}

impl FromStr for PrState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "open" => Ok(PrState::Open),
            "closed" => Ok(PrState::Closed),
            "merged" => Ok(PrState::Merged),
            "all" => Ok(PrState::All),
            other => Err(invalid(FilterField::State, format!("unknown state '{other}'"))),
        }
    }
}

/// Number of PRs requested per fetch. Only the sizes the backend accepts
/// can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PageLimit {
    Ten,
    TwentyFive,
    Fifty,
    #[default]
    Hundred,
}

impl PageLimit {
    pub fn get(&self) -> u32 {
        match self {
            PageLimit::Ten => 10,
            PageLimit::TwentyFive => 25,
            PageLimit::Fifty => 50,
            PageLimit::Hundred => 100,
        }
    }
}

impl TryFrom<u32> for PageLimit {
    type Error = String;

    fn try_from(n: u32) -> std::result::Result<Self, String> {
        match n {
            10 => Ok(PageLimit::Ten),
            25 => Ok(PageLimit::TwentyFive),
            50 => Ok(PageLimit::Fifty),
            100 => Ok(PageLimit::Hundred),
            other => Err(format!("limit must be one of 10, 25, 50, 100 (got {other})")),
        }
    }
}

impl From<PageLimit> for u32 {
    fn from(limit: PageLimit) -> u32 {
        limit.get()
    }
}

/// Names of every filter field, in query order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    State,
    Author,
    Assignee,
    Labels,
    Base,
    Head,
    Draft,
    Review,
    ReviewedBy,
    ReviewRequested,
    Status,
    Involves,
    Mentions,
    Commenter,
    Linked,
    Comments,
    CreatedAfter,
    CreatedBefore,
    UpdatedAfter,
    UpdatedBefore,
    MergedAfter,
    MergedBefore,
    ClosedAfter,
    ClosedBefore,
    Milestone,
    NoAssignee,
    NoLabel,
    SearchIn,
    Search,
    Reactions,
    Interactions,
    TeamReviewRequested,
    ExcludeLabels,
    ExcludeAuthor,
    ExcludeMilestone,
    SortBy,
    SortDirection,
    Limit,
}

impl FilterField {
    pub const ALL: &'static [FilterField] = &[
        FilterField::State,
        FilterField::Author,
        FilterField::Assignee,
        FilterField::Labels,
        FilterField::Base,
        FilterField::Head,
        FilterField::Draft,
        FilterField::Review,
        FilterField::ReviewedBy,
        FilterField::ReviewRequested,
        FilterField::Status,
        FilterField::Involves,
        FilterField::Mentions,
        FilterField::Commenter,
        FilterField::Linked,
        FilterField::Comments,
        FilterField::CreatedAfter,
        FilterField::CreatedBefore,
        FilterField::UpdatedAfter,
        FilterField::UpdatedBefore,
        FilterField::MergedAfter,
        FilterField::MergedBefore,
        FilterField::ClosedAfter,
        FilterField::ClosedBefore,
        FilterField::Milestone,
        FilterField::NoAssignee,
        FilterField::NoLabel,
        FilterField::SearchIn,
        FilterField::Search,
        FilterField::Reactions,
        FilterField::Interactions,
        FilterField::TeamReviewRequested,
        FilterField::ExcludeLabels,
        FilterField::ExcludeAuthor,
        FilterField::ExcludeMilestone,
        FilterField::SortBy,
        FilterField::SortDirection,
        FilterField::Limit,
    ];

    /// Query parameter name (camelCase, as the backend expects)
    pub fn name(&self) -> &'static str {
        match self {
            FilterField::State => "state",
            FilterField::Author => "author",
            FilterField::Assignee => "assignee",
            FilterField::Labels => "labels",
            FilterField::Base => "base",
            FilterField::Head => "head",
            FilterField::Draft => "draft",
            FilterField::Review => "review",
            FilterField::ReviewedBy => "reviewedBy",
            FilterField::ReviewRequested => "reviewRequested",
            FilterField::Status => "status",
            FilterField::Involves => "involves",
            FilterField::Mentions => "mentions",
            FilterField::Commenter => "commenter",
            FilterField::Linked => "linked",
            FilterField::Comments => "comments",
            FilterField::CreatedAfter => "createdAfter",
            FilterField::CreatedBefore => "createdBefore",
            FilterField::UpdatedAfter => "updatedAfter",
            FilterField::UpdatedBefore => "updatedBefore",
            FilterField::MergedAfter => "mergedAfter",
            FilterField::MergedBefore => "mergedBefore",
            FilterField::ClosedAfter => "closedAfter",
            FilterField::ClosedBefore => "closedBefore",
            FilterField::Milestone => "milestone",
            FilterField::NoAssignee => "noAssignee",
            FilterField::NoLabel => "noLabel",
            FilterField::SearchIn => "searchIn",
            FilterField::Search => "search",
            FilterField::Reactions => "reactions",
            FilterField::Interactions => "interactions",
            FilterField::TeamReviewRequested => "teamReviewRequested",
            FilterField::ExcludeLabels => "excludeLabels",
            FilterField::ExcludeAuthor => "excludeAuthor",
            FilterField::ExcludeMilestone => "excludeMilestone",
            FilterField::SortBy => "sortBy",
            FilterField::SortDirection => "sortDirection",
            FilterField::Limit => "limit",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FilterField::ALL
            .iter()
            .copied()
            .find(|field| field.name() == s)
            .ok_or_else(|| Error::InvalidFilter {
                field: s.to_string(),
                message: "unknown filter field".to_string(),
            })
    }
}

/// A value handed to [`FilterSettings::set`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    List(Vec<String>),
    Bool(bool),
    Number(u32),
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Text(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Text(s)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(v: Vec<String>) -> Self {
        FilterValue::List(v)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<u32> for FilterValue {
    fn from(n: u32) -> Self {
        FilterValue::Number(n)
    }
}

fn invalid(field: FilterField, message: impl Into<String>) -> Error {
    Error::InvalidFilter {
        field: field.name().to_string(),
        message: message.into(),
    }
}

/// The full PR filter record. Serialized camelCase inside the settings snapshot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSettings {
    pub state: PrState,
    pub author: String,
    pub assignee: String,
    pub labels: Vec<String>,
    pub base: String,
    pub head: String,
    /// `""`, `"true"` or `"false"`
    pub draft: String,
    pub review: String,
    pub reviewed_by: String,
    pub review_requested: String,
    pub status: String,
    pub involves: String,
    pub mentions: String,
    pub commenter: String,
    pub linked: String,
    pub comments: String,
    pub created_after: String,
    pub created_before: String,
    pub updated_after: String,
    pub updated_before: String,
    pub merged_after: String,
    pub merged_before: String,
    pub closed_after: String,
    pub closed_before: String,
    pub milestone: String,
    pub no_assignee: bool,
    pub no_label: bool,
    pub search_in: String,
    pub search: String,
    pub reactions: String,
    pub interactions: String,
    pub team_review_requested: String,
    pub exclude_labels: Vec<String>,
    pub exclude_author: String,
    pub exclude_milestone: String,
    pub sort_by: String,
    pub sort_direction: SortDirection,
    pub limit: PageLimit,
}

impl FilterSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn text_mut(&mut self, field: FilterField) -> Option<&mut String> {
        Some(match field {
            FilterField::Author => &mut self.author,
            FilterField::Assignee => &mut self.assignee,
            FilterField::Base => &mut self.base,
            FilterField::Head => &mut self.head,
            FilterField::Draft => &mut self.draft,
            FilterField::Review => &mut self.review,
            FilterField::ReviewedBy => &mut self.reviewed_by,
            FilterField::ReviewRequested => &mut self.review_requested,
            FilterField::Status => &mut self.status,
            FilterField::Involves => &mut self.involves,
            FilterField::Mentions => &mut self.mentions,
            FilterField::Commenter => &mut self.commenter,
            FilterField::Linked => &mut self.linked,
            FilterField::Comments => &mut self.comments,
            FilterField::CreatedAfter => &mut self.created_after,
            FilterField::CreatedBefore => &mut self.created_before,
            FilterField::UpdatedAfter => &mut self.updated_after,
            FilterField::UpdatedBefore => &mut self.updated_before,
            FilterField::MergedAfter => &mut self.merged_after,
            FilterField::MergedBefore => &mut self.merged_before,
            FilterField::ClosedAfter => &mut self.closed_after,
            FilterField::ClosedBefore => &mut self.closed_before,
            FilterField::Milestone => &mut self.milestone,
            FilterField::SearchIn => &mut self.search_in,
            FilterField::Search => &mut self.search,
            FilterField::Reactions => &mut self.reactions,
            FilterField::Interactions => &mut self.interactions,
            FilterField::TeamReviewRequested => &mut self.team_review_requested,
            FilterField::ExcludeAuthor => &mut self.exclude_author,
            FilterField::ExcludeMilestone => &mut self.exclude_milestone,
            FilterField::SortBy => &mut self.sort_by,
            _ => return None,
        })
    }

    fn text(&self, field: FilterField) -> Option<&str> {
        Some(match field {
            FilterField::Author => &self.author,
            FilterField::Assignee => &self.assignee,
            FilterField::Base => &self.base,
            FilterField::Head => &self.head,
            FilterField::Draft => &self.draft,
            FilterField::Review => &self.review,
            FilterField::ReviewedBy => &self.reviewed_by,
            FilterField::ReviewRequested => &self.review_requested,
            FilterField::Status => &self.status,
            FilterField::Involves => &self.involves,
            FilterField::Mentions => &self.mentions,
            FilterField::Commenter => &self.commenter,
            FilterField::Linked => &self.linked,
            FilterField::Comments => &self.comments,
            FilterField::CreatedAfter => &self.created_after,
            FilterField::CreatedBefore => &self.created_before,
            FilterField::UpdatedAfter => &self.updated_after,
            FilterField::UpdatedBefore => &self.updated_before,
            FilterField::MergedAfter => &self.merged_after,
            FilterField::MergedBefore => &self.merged_before,
            FilterField::ClosedAfter => &self.closed_after,
            FilterField::ClosedBefore => &self.closed_before,
            FilterField::Milestone => &self.milestone,
            FilterField::SearchIn => &self.search_in,
            FilterField::Search => &self.search,
            FilterField::Reactions => &self.reactions,
            FilterField::Interactions => &self.interactions,
            FilterField::TeamReviewRequested => &self.team_review_requested,
            FilterField::ExcludeAuthor => &self.exclude_author,
            FilterField::ExcludeMilestone => &self.exclude_milestone,
            FilterField::SortBy => &self.sort_by,
            _ => return None,
        })
    }

    /// Set one field. Fails when the value's kind does not fit the field.
    pub fn set(&mut self, field: FilterField, value: impl Into<FilterValue>) -> Result<()> {
        let value = value.into();
        match (field, value) {
            (FilterField::State, FilterValue::Text(s)) => self.state = s.parse()?,
            (FilterField::SortDirection, FilterValue::Text(s)) => {
                self.sort_direction = s
                    .parse::<SortDirection>()
                    .map_err(|e| invalid(field, e))?
            }
            (FilterField::Limit, FilterValue::Number(n)) => {
                self.limit = PageLimit::try_from(n).map_err(|e| invalid(field, e))?
            }
            (FilterField::Labels, FilterValue::List(v)) => self.labels = v,
            (FilterField::ExcludeLabels, FilterValue::List(v)) => self.exclude_labels = v,
            (FilterField::NoAssignee, FilterValue::Bool(b)) => self.no_assignee = b,
            (FilterField::NoLabel, FilterValue::Bool(b)) => self.no_label = b,
            (FilterField::Draft, FilterValue::Text(s))
                if !matches!(s.as_str(), "" | "true" | "false") =>
            {
                return Err(invalid(field, "draft must be empty, 'true' or 'false'"));
            }
            (field, FilterValue::Text(s)) => match self.text_mut(field) {
                Some(slot) => *slot = s,
                None => return Err(invalid(field, "expected a non-text value")),
            },
            (field, other) => {
                return Err(invalid(field, format!("unexpected value {other:?}")));
            }
        }
        Ok(())
    }

    /// Derive the PR list query.
    pub fn to_query(&self) -> FilterQuery {
        let mut params = vec![
            (FilterField::State.name(), self.state.as_str().to_string()),
            (FilterField::Limit.name(), self.limit.get().to_string()),
        ];

        for &field in FilterField::ALL {
            let value = match field {
                FilterField::State | FilterField::Limit => continue,
                FilterField::Labels => join(&self.labels),
                FilterField::ExcludeLabels => join(&self.exclude_labels),
                FilterField::NoAssignee => self.no_assignee.then(|| "true".to_string()),
                FilterField::NoLabel => self.no_label.then(|| "true".to_string()),
                FilterField::SortDirection => (!self.sort_by.is_empty())
                    .then(|| self.sort_direction.as_str().to_string()),
                _ => self
                    .text(field)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            };
            if let Some(value) = value {
                params.push((field.name(), value));
            }
        }

        FilterQuery(params)
    }
}

fn join(values: &[String]) -> Option<String> {
    let values: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();
    (!values.is_empty()).then(|| values.join(","))
}

/// Derived query parameters for the PR list, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterQuery(Vec<(&'static str, String)>);

impl FilterQuery {
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `key=value&...` with values URL-encoded
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_derive_only_baseline() {
        let query = FilterSettings::default().to_query();
        assert_eq!(
            query.pairs(),
            &[("state", "open".to_string()), ("limit", "100".to_string())]
        );
    }

    #[test]
    fn test_each_text_field_adds_exactly_one_param() {
        let baseline = FilterSettings::default().to_query().len();
        for &field in FilterField::ALL {
            if matches!(
                field,
                FilterField::State
                    | FilterField::Limit
                    | FilterField::Labels
                    | FilterField::ExcludeLabels
                    | FilterField::NoAssignee
                    | FilterField::NoLabel
                    | FilterField::SortDirection
                    | FilterField::Draft
            ) {
                continue;
            }
            let mut filters = FilterSettings::default();
            filters.set(field, "x").unwrap();
            let query = filters.to_query();
            let expected = if field == FilterField::SortBy { 2 } else { 1 };
            assert_eq!(query.len(), baseline + expected, "field {field}");
            assert_eq!(query.get(field.name()), Some("x"));
        }
    }

    #[test]
    fn test_lists_are_comma_joined() {
        let mut filters = FilterSettings::default();
        filters
            .set(
                FilterField::Labels,
                vec!["bug".to_string(), "ui".to_string()],
            )
            .unwrap();
        filters
            .set(FilterField::ExcludeLabels, Vec::<String>::new())
            .unwrap();
        let query = filters.to_query();
        assert_eq!(query.get("labels"), Some("bug,ui"));
        assert_eq!(query.get("excludeLabels"), None);
    }

    #[test]
    fn test_false_flags_are_omitted() {
        let mut filters = FilterSettings::default();
        filters.set(FilterField::NoLabel, true).unwrap();
        let query = filters.to_query();
        assert_eq!(query.get("noLabel"), Some("true"));
        assert_eq!(query.get("noAssignee"), None);
    }

    #[test]
    fn test_sort_direction_needs_sort_by() {
        let mut filters = FilterSettings::default();
        filters.set(FilterField::SortDirection, "asc").unwrap();
        assert_eq!(filters.to_query().get("sortDirection"), None);

        filters.set(FilterField::SortBy, "updated").unwrap();
        let query = filters.to_query();
        assert_eq!(query.get("sortBy"), Some("updated"));
        assert_eq!(query.get("sortDirection"), Some("asc"));
    }

    #[test]
    fn test_set_rejects_wrong_kind_and_bad_limit() {
        let mut filters = FilterSettings::default();
        assert!(filters.set(FilterField::Author, true).is_err());
        assert!(filters.set(FilterField::Limit, 30u32).is_err());
        assert!(filters.set(FilterField::State, "reopened").is_err());
        assert!(filters.set(FilterField::Draft, "maybe").is_err());
        filters.set(FilterField::Limit, 25u32).unwrap();
        assert_eq!(filters.limit, PageLimit::TwentyFive);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let mut filters = FilterSettings::default();
        filters.set(FilterField::Author, "alice").unwrap();
        assert_eq!(filters.to_query(), filters.clone().to_query());
    }

    #[test]
    fn test_snapshot_json_is_camel_case() {
        let mut filters = FilterSettings::default();
        filters.set(FilterField::ReviewedBy, "bob").unwrap();
        let json = serde_json::to_value(&filters).unwrap();
        assert_eq!(json["reviewedBy"], "bob");
        assert_eq!(json["limit"], 100);
        assert_eq!(json["sortDirection"], "desc");

        let partial: FilterSettings =
            serde_json::from_str(r#"{"author": "alice", "limit": 50}"#).unwrap();
        assert_eq!(partial.author, "alice");
        assert_eq!(partial.limit, PageLimit::Fifty);
        assert_eq!(partial.state, PrState::Open);
    }

    #[test]
    fn test_query_string_encodes_values() {
        let mut filters = FilterSettings::default();
        filters.set(FilterField::Search, "fix bug").unwrap();
        assert_eq!(
            filters.to_query().to_query_string(),
            "state=open&limit=100&search=fix%20bug"
        );
    }
}
