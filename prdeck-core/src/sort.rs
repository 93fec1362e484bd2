//! Client-side sorting for slice views
//!
//! Each sortable resource has a column enum implementing [`SortColumn`]; the
//! enum's `sort_key` match is the comparator table for that resource, so a
//! column that the resource does not have cannot be named at all.
//!
//! Sorting never touches slice data, only the derived view. Missing values
//! (`None` keys) always sort after present values, in both directions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sort direction for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// A comparable value extracted from a row.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl SortValue {
    pub fn text(s: &str) -> Self {
        SortValue::Text(s.to_lowercase())
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Bool(_) => 0,
            SortValue::Int(_) | SortValue::Float(_) => 1,
            SortValue::Text(_) => 2,
        }
    }

    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Int(a), SortValue::Int(b)) => a.cmp(b),
            (SortValue::Float(a), SortValue::Float(b)) => a.total_cmp(b),
            (SortValue::Int(a), SortValue::Float(b)) => (*a as f64).total_cmp(b),
            (SortValue::Float(a), SortValue::Int(b)) => a.total_cmp(&(*b as f64)),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

impl From<u64> for SortValue {
    fn from(v: u64) -> Self {
        SortValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<i64> for SortValue {
    fn from(v: i64) -> Self {
        SortValue::Int(v)
    }
}

impl From<f64> for SortValue {
    fn from(v: f64) -> Self {
        SortValue::Float(v)
    }
}

impl From<bool> for SortValue {
    fn from(v: bool) -> Self {
        SortValue::Bool(v)
    }
}

/// A named column of resource `T`.
pub trait SortColumn<T>: Copy + Eq + fmt::Debug {
    /// Column name as used by the front end
    fn name(&self) -> &'static str;

    /// Key for `item`, or `None` when the row has no value for this column
    fn sort_key(&self, item: &T) -> Option<SortValue>;
}

/// Column type for slices that have no sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unsorted {}

impl<T> SortColumn<T> for Unsorted {
    fn name(&self) -> &'static str {
        match *self {}
    }

    fn sort_key(&self, _item: &T) -> Option<SortValue> {
        match *self {}
    }
}

/// Current sort of a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState<C> {
    pub column: C,
    pub direction: SortDirection,
}

impl<C: Copy + Eq> SortState<C> {
    /// Toggle rule: same column flips direction, a new column starts descending.
    pub fn toggled(current: Option<SortState<C>>, column: C) -> SortState<C> {
        match current {
            Some(state) if state.column == column => SortState {
                column,
                direction: state.direction.flipped(),
            },
            _ => SortState {
                column,
                direction: SortDirection::Desc,
            },
        }
    }
}

/// Stable sort of `items` by `state`, with missing keys last.
pub fn sort_by_column<T, C: SortColumn<T>>(items: &mut [&T], state: SortState<C>) {
    items.sort_by(|a, b| {
        match (state.column.sort_key(a), state.column.sort_key(b)) {
            (Some(a), Some(b)) => {
                let ord = a.compare(&b);
                match state.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}
