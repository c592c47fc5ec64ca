//! Search and sort over fetched rows
//!
//! The pipeline never mutates its input: it returns references into the row
//! slice in display order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

use crate::schema::{value_text, Row};

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Placement of null cells when sorting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullOrdering {
    /// Nulls rank above every value: last ascending, first descending
    #[default]
    FollowDirection,
    /// Nulls are last in both directions
    AlwaysLast,
}

/// Column and direction the rows are ordered by
///
/// A `None` column keeps the fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: Some(column.into()),
            direction,
        }
    }

    /// Header click: flip the direction on the same column, start ascending on a new one
    pub fn toggle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = self.direction.reversed();
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Asc;
        }
    }
}

/// Filter then sort
pub fn compute<'a>(
    rows: &'a [Row],
    query: &str,
    sort: &SortState,
    nulls: NullOrdering,
) -> Vec<&'a Row> {
    let mut ordered = filter_rows(rows, query);
    if let Some(column) = sort.column.as_deref() {
        sort_rows(&mut ordered, column, sort.direction, nulls);
    }
    ordered
}

/// Keep rows with at least one value containing `query`, ignoring case
///
/// A query that is blank after trimming keeps every row. Null cells never match.
pub fn filter_rows<'a>(rows: &'a [Row], query: &str) -> Vec<&'a Row> {
    if query.trim().is_empty() {
        return rows.iter().collect();
    }

    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| {
            row.values().any(|value| {
                value_text(value).is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .collect()
}

/// Stable sort by one column; equal keys keep their relative order in both directions
pub fn sort_rows(rows: &mut [&Row], column: &str, direction: SortDirection, nulls: NullOrdering) {
    rows.sort_by(|a, b| {
        compare_values(
            a.get(column).unwrap_or(&Value::Null),
            b.get(column).unwrap_or(&Value::Null),
            direction,
            nulls,
        )
    });
}

/// Compare two cells for display order
///
/// Nulls are handled first. Remaining cells that read as numbers rank ahead of
/// text; numbers compare numerically and text with [`compare_text`].
pub fn compare_values(
    a: &Value,
    b: &Value,
    direction: SortDirection,
    nulls: NullOrdering,
) -> Ordering {
    let ordering = match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => {
            return match (nulls, direction) {
                (NullOrdering::FollowDirection, SortDirection::Desc) => Ordering::Less,
                _ => Ordering::Greater,
            }
        }
        (false, true) => {
            return match (nulls, direction) {
                (NullOrdering::FollowDirection, SortDirection::Desc) => Ordering::Greater,
                _ => Ordering::Less,
            }
        }
        (false, false) => SortKey::of(a).cmp(&SortKey::of(b)),
    };

    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Ordering key of a non-null cell
#[derive(Debug)]
enum SortKey<'a> {
    Number(f64),
    Text(Cow<'a, str>),
}

impl<'a> SortKey<'a> {
    fn of(value: &'a Value) -> Self {
        match numeric_value(value) {
            Some(number) => SortKey::Number(number),
            None => SortKey::Text(value_text(value).unwrap_or(Cow::Borrowed(""))),
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(left), SortKey::Number(right)) => left.total_cmp(right),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            (SortKey::Text(left), SortKey::Text(right)) => compare_text(left, right),
        }
    }
}

/// Numeric reading of a cell: JSON numbers and strings that parse as finite or infinite floats
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|number| !number.is_nan())
        }
        _ => None,
    }
}

/// Dictionary-style text order
///
/// Letters compare without regard to case first; strings that differ only in
/// case put the lowercase form first.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    folded.then_with(|| a.chars().map(case_key).cmp(b.chars().map(case_key)))
}

/// Lowercase before any other form of a letter, then by code point
fn case_key(c: char) -> (bool, char) {
    (!c.is_lowercase(), c)
}

/// Cell text for display, `NULL` for null
pub fn display_value(value: &Value) -> Cow<'_, str> {
    value_text(value).unwrap_or(Cow::Borrowed("NULL"))
}
