//! Query context for the reasoning agent
//!
//! Provides:
//! - Row selection for dataset-wide questions (keyword or prefix)
//! - Bounded CSV serialization of the selected rows
//! - The instruction prompt wrapped around context and question

mod prompt;
mod retrieval;

pub use prompt::{build_prompt, DATASET_FALLBACK, POST_FALLBACK};
pub use retrieval::{create_retriever, ContextRetriever, ContextStrategy, KeywordRetriever, PrefixRetriever};

use crate::dataset::Dataset;
use crate::errors::{AppError, Result};
use serde::Serialize;

/// What the context covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// Several rows of the dataset
    Rows,
    /// Exactly one post
    SingleRow,
}

/// Bounded excerpt of the dataset embedded into a prompt
///
/// Recomputed for every question; never stored.
#[derive(Debug, Clone, Serialize)]
pub struct QueryContext {
    pub kind: ContextKind,
    /// Row positions included, in dataset order
    pub rows: Vec<usize>,
    /// Header plus rows as CSV text
    pub csv: String,
    /// Rows dropped to respect the character budget
    pub truncated_rows: usize,
}

impl QueryContext {
    /// Serialize the given rows, stopping at `max_chars`
    ///
    /// At least one row is kept even when it alone exceeds the budget.
    pub fn for_rows(dataset: &Dataset, rows: Vec<usize>, max_chars: usize) -> Result<Self> {
        let mut csv = dataset.header_csv()?;
        let mut kept = Vec::with_capacity(rows.len());

        for &row in &rows {
            let line = dataset.row_csv(row)?;
            if !kept.is_empty() && csv.len() + line.len() > max_chars {
                break;
            }
            csv.push_str(&line);
            kept.push(row);
        }

        let truncated_rows = rows.len() - kept.len();
        Ok(Self {
            kind: ContextKind::Rows,
            rows: kept,
            csv,
            truncated_rows,
        })
    }

    /// The single row matching `id`
    pub fn for_post(dataset: &Dataset, id: &str) -> Result<Self> {
        let row = dataset
            .find(id)?
            .ok_or_else(|| AppError::PostNotFound { id: id.to_string() })?;

        let mut csv = dataset.header_csv()?;
        csv.push_str(&dataset.row_csv(row)?);

        Ok(Self {
            kind: ContextKind::SingleRow,
            rows: vec![row],
            csv,
            truncated_rows: 0,
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
