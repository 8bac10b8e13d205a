//! Enumerations and date specifications used by the query state

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

/// How the query text is interpreted by the backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, strum_macros::Display)]
pub enum SearchType {
    /// All terms must match
    #[default]
    Keywords,
    /// Best-effort relevance matching
    Relevance,
}

/// Ordering of the result list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, strum_macros::Display)]
pub enum OrderBy {
    /// Newest first
    Date,
    /// Highest score first
    #[default]
    Relevance,
}

/// Which category statistics the categorize service computes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, strum_macros::Display)]
pub enum CategorizationType {
    /// Full category tree with counts
    #[default]
    All,
    /// Only categories that have document hits
    DocumentHitsOnly,
}

/// Offset relative to "now", applied at URL-build time.
///
/// All components default to zero, so `RelativeDate { months: -2, ..Default::default() }`
/// means "two months ago".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RelativeDate {
    #[serde(default)]
    pub years: i32,
    #[serde(default)]
    pub months: i32,
    #[serde(default)]
    pub days: i64,
}

/// A date boundary for the search: either a fixed point in time or an offset
/// from the moment the request is built.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DateSpecification {
    Absolute(DateTime<Utc>),
    Relative(RelativeDate),
}

impl DateSpecification {
    /// Shorthand for a relative offset in months
    pub fn months_ago(months: u32) -> Self {
        DateSpecification::Relative(RelativeDate {
            months: -(months as i32),
            ..Default::default()
        })
    }

    /// Shorthand for a relative offset in days
    pub fn days_ago(days: u32) -> Self {
        DateSpecification::Relative(RelativeDate {
            days: -(days as i64),
            ..Default::default()
        })
    }

    /// Resolve to an absolute instant against the given "now".
    ///
    /// Relative offsets that would leave the representable range saturate at
    /// `now` rather than failing.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DateSpecification::Absolute(dt) => *dt,
            DateSpecification::Relative(rel) => {
                let total_months = i64::from(rel.years) * 12 + i64::from(rel.months);
                let shifted = if total_months >= 0 {
                    now.checked_add_months(Months::new(total_months as u32))
                } else {
                    now.checked_sub_months(Months::new((-total_months) as u32))
                };
                shifted
                    .and_then(|dt| dt.checked_add_signed(Duration::days(rel.days)))
                    .unwrap_or(now)
            }
        }
    }
}
