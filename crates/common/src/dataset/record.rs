//! Post records materialized from dataset rows

use super::Dataset;
use crate::errors::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// One Reddit submission
///
/// Only the identifier is guaranteed; every other field is whatever the
/// upstream feature engineering left in the row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    /// Zero-based row position in the dataset
    pub row: usize,
    pub id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub created_utc: Option<String>,
    pub selftext: Option<String>,
    pub url: Option<String>,
    pub permalink: Option<String>,
    pub ups: Option<i64>,
    pub score: Option<i64>,
    pub num_comments: Option<i64>,
    pub num_crossposts: Option<i64>,
    /// Remaining non-empty columns (reliability flags, sentiment, ...)
    pub features: BTreeMap<String, String>,
}

/// Row shown in the post list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    /// One-based position in dataset order
    pub position: usize,
    pub id: String,
    pub title: String,
    pub preview: Option<String>,
}

impl PostRecord {
    pub(super) fn from_row(dataset: &Dataset, row: usize) -> Result<Self> {
        let columns = dataset.columns();
        let id_col = dataset.column(&columns.id)?;

        let text = |name: &str| {
            dataset
                .optional_column(name)
                .and_then(|col| dataset.cell(row, col))
                .map(str::to_string)
        };
        let count = |name: &str| {
            dataset
                .optional_column(name)
                .and_then(|col| dataset.cell(row, col))
                .and_then(parse_count)
        };

        let mapped = columns.all();
        let features = dataset
            .headers()
            .enumerate()
            .filter(|(_, name)| !name.is_empty() && !mapped.contains(name))
            .filter_map(|(col, name)| {
                dataset
                    .cell(row, col)
                    .map(|value| (name.to_string(), value.to_string()))
            })
            .collect();

        Ok(Self {
            row,
            id: dataset.cell(row, id_col).unwrap_or_default().to_string(),
            title: text(&columns.title),
            author: text(&columns.author),
            created_utc: text(&columns.created_utc),
            selftext: text(&columns.selftext),
            url: text(&columns.url),
            permalink: text(&columns.permalink),
            ups: count(&columns.ups),
            score: count(&columns.score),
            num_comments: count(&columns.num_comments),
            num_crossposts: count(&columns.num_crossposts),
            features,
        })
    }

    /// Link to the submission on reddit.com
    pub fn reddit_url(&self) -> Option<String> {
        self.permalink
            .as_deref()
            .map(|p| format!("https://reddit.com/{}", p.trim_start_matches('/')))
    }

    /// Link to the author's profile
    pub fn author_url(&self) -> Option<String> {
        self.author
            .as_deref()
            .map(|a| format!("https://reddit.com/user/{}", a))
    }
}

/// Counts may be written as floats by pandas ("45.0")
fn parse_count(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}
