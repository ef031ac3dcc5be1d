//! Dataset layer for Redscope
//!
//! Provides:
//! - The in-memory post table loaded from the feature-engineered CSV
//! - Identifier lookup and column access
//! - Post record materialization
//! - CSV serialization of row subsets for prompts

mod loader;
mod record;

pub use loader::DatasetLoader;
pub use record::{PostRecord, PostSummary};

use crate::config::ColumnMap;
use crate::errors::{AppError, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Immutable table of posts, shared read-only across sessions
#[derive(Debug)]
pub struct Dataset {
    source: String,
    headers: StringRecord,
    column_index: HashMap<String, usize>,
    rows: Vec<StringRecord>,
    id_index: HashMap<String, usize>,
    columns: ColumnMap,
}

impl Dataset {
    /// Load a dataset from a CSV file
    pub fn from_path(path: &Path, columns: ColumnMap) -> Result<Self> {
        let source = path.display().to_string();
        let file = std::fs::File::open(path).map_err(|e| AppError::DatasetLoad {
            path: source.clone(),
            message: e.to_string(),
        })?;
        Self::from_reader(file, columns, &source)
    }

    /// Parse a dataset from any CSV reader
    pub fn from_reader<R: Read>(reader: R, columns: ColumnMap, source: &str) -> Result<Self> {
        let load_error = |message: String| AppError::DatasetLoad {
            path: source.to_string(),
            message,
        };

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| load_error(e.to_string()))?
            .clone();
        if headers.is_empty() {
            return Err(load_error("missing header row".to_string()));
        }

        let column_index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record.map_err(|e| load_error(e.to_string()))?);
        }

        // First occurrence wins for detail lookup
        let mut id_index = HashMap::with_capacity(rows.len());
        let mut duplicates = 0usize;
        if let Some(&id_col) = column_index.get(&columns.id) {
            for (row, record) in rows.iter().enumerate() {
                let id = record.get(id_col).unwrap_or("").trim();
                if id.is_empty() {
                    continue;
                }
                if id_index.contains_key(id) {
                    duplicates += 1;
                } else {
                    id_index.insert(id.to_string(), row);
                }
            }
        }
        if duplicates > 0 {
            warn!(source = %source, duplicates, "Dataset contains duplicate post identifiers");
        }

        Ok(Self {
            source: source.to_string(),
            headers,
            column_index,
            rows,
            id_index,
            columns,
        })
    }

    /// Where the dataset was loaded from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in file order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter()
    }

    /// Column layout used for post fields
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Index of a column, failing if the file lacks it
    pub fn column(&self, name: &str) -> Result<usize> {
        self.column_index
            .get(name)
            .copied()
            .ok_or_else(|| AppError::MissingColumn {
                column: name.to_string(),
            })
    }

    /// Index of a column the caller can do without
    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    /// Trimmed, non-empty cell value
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Raw cell values of a row in column order
    pub fn raw_row(&self, row: usize) -> Option<&StringRecord> {
        self.rows.get(row)
    }

    /// Position of the row with the given identifier
    pub fn find(&self, id: &str) -> Result<Option<usize>> {
        self.column(&self.columns.id)?;
        Ok(self.id_index.get(id.trim()).copied())
    }

    /// Look up a post by identifier
    pub fn post_by_id(&self, id: &str) -> Result<PostRecord> {
        match self.find(id)? {
            Some(row) => self.post(row),
            None => Err(AppError::PostNotFound { id: id.to_string() }),
        }
    }

    /// Materialize the post at a row position
    pub fn post(&self, row: usize) -> Result<PostRecord> {
        if row >= self.rows.len() {
            return Err(AppError::Internal {
                message: format!("row {} out of range ({} rows)", row, self.rows.len()),
            });
        }
        PostRecord::from_row(self, row)
    }

    /// Summaries of the rows in `start..end`, clamped to the table
    pub fn summaries(&self, start: usize, end: usize, preview_chars: usize) -> Result<Vec<PostSummary>> {
        let end = end.min(self.rows.len());
        if start >= end {
            return Ok(Vec::new());
        }
        let id_col = self.column(&self.columns.id)?;
        let title_col = self.column(&self.columns.title)?;
        let selftext_col = self.optional_column(&self.columns.selftext);

        Ok((start..end)
            .map(|row| PostSummary {
                position: row + 1,
                id: self.cell(row, id_col).unwrap_or_default().to_string(),
                title: self.cell(row, title_col).unwrap_or_default().to_string(),
                preview: selftext_col
                    .and_then(|col| self.cell(row, col))
                    .map(|text| preview(text, preview_chars)),
            })
            .collect())
    }

    /// Serialize the header line as CSV
    pub fn header_csv(&self) -> Result<String> {
        encode_record(&self.headers)
    }

    /// Serialize one row as a CSV line
    pub fn row_csv(&self, row: usize) -> Result<String> {
        let record = self.rows.get(row).ok_or_else(|| AppError::Internal {
            message: format!("row {} out of range", row),
        })?;
        encode_record(record)
    }
}

/// First `max_chars` characters followed by an ellipsis
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

fn encode_record(record: &StringRecord) -> Result<String> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(record)?;
    let bytes = writer.into_inner().map_err(|e| AppError::Internal {
        message: format!("Failed to flush CSV writer: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const HEADER: &str = "id_original,title_original,author_original,created_utc_original,selftext_original,url_overridden_by_dest_original,permalink_original,ups_original,score_original,num_comments_original,num_crossposts_original,domain_unreliable,title_sentiment";

    /// Small dataset with a mix of filled and empty cells
    pub fn sample() -> Dataset {
        let csv = format!(
            "{}\n\
             a1,Senate passes budget bill,alice,2024-11-05 14:00:00,Long discussion of the budget vote,https://example.com/photo.jpg,r/politics/comments/a1/,120,118,45.0,2,False,0.2\n\
             b2,Election night thread,bob,2024-11-06 01:00:00,,https://youtu.be/abc123,r/politics/comments/b2/,3000,2990,1200,10,False,-0.1\n\
             c3,\"Quoted, title\",,2024-11-07 09:30:00,Text with budget mention,,r/neoliberal/comments/c3/,,5,,,True,\n",
            HEADER
        );
        Dataset::from_reader(csv.as_bytes(), ColumnMap::default(), "fixture").unwrap()
    }

    /// `n` generated rows
    pub fn numbered(n: usize) -> Dataset {
        let mut csv = String::from("id_original,title_original,selftext_original\n");
        for i in 0..n {
            csv.push_str(&format!("p{i},Post number {i},Body of post {i}\n"));
        }
        Dataset::from_reader(csv.as_bytes(), ColumnMap::default(), "numbered").unwrap()
    }
}
