use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of activity as the data source reports it. The date stays in its
/// ISO `YYYY-MM-DD` string form so year buckets can be cut by prefix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContributionRecord {
    pub date: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub date: NaiveDate,
    pub count: u32,
}

/// Body returned by the contributions proxy for `?y=all`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributionsResponse {
    #[serde(default)]
    pub total: BTreeMap<String, u64>,
    #[serde(default)]
    pub contributions: Vec<ContributionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearTotal {
    pub year: i32,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSummary {
    pub max_count: u32,
    pub busiest_day: Option<NaiveDate>,
    pub active_days: usize,
    pub longest_streak: usize,
}
