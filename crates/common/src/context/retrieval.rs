//! Row selection for dataset-wide questions
//!
//! The whole table rarely fits a prompt, so a retriever picks which rows
//! the agent sees. Selection never reorders: the returned positions are
//! always ascending.

use crate::dataset::Dataset;
use crate::errors::{AppError, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// How context rows are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextStrategy {
    /// The first `limit` rows of the dataset
    Prefix,
    /// Rows ranked by keyword relevance to the question
    Keyword,
}

impl FromStr for ContextStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(Self::Prefix),
            "keyword" | "bm25" => Ok(Self::Keyword),
            other => Err(AppError::Configuration {
                message: format!("Unknown context strategy: {}", other),
            }),
        }
    }
}

impl fmt::Display for ContextStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix => write!(f, "prefix"),
            Self::Keyword => write!(f, "keyword"),
        }
    }
}

/// Picks the dataset rows embedded into a prompt
pub trait ContextRetriever: Send + Sync {
    /// Up to `limit` row positions, ascending
    fn select(&self, dataset: &Dataset, question: &str, limit: usize) -> Result<Vec<usize>>;

    fn strategy(&self) -> ContextStrategy;
}

/// Build the retriever for a configured strategy name
pub fn create_retriever(strategy: &str) -> Result<Box<dyn ContextRetriever>> {
    Ok(match strategy.parse::<ContextStrategy>()? {
        ContextStrategy::Prefix => Box::new(PrefixRetriever),
        ContextStrategy::Keyword => Box::new(KeywordRetriever::default()),
    })
}

/// Fixed prefix of the table
#[derive(Debug, Default, Clone, Copy)]
pub struct PrefixRetriever;

impl ContextRetriever for PrefixRetriever {
    fn select(&self, dataset: &Dataset, _question: &str, limit: usize) -> Result<Vec<usize>> {
        Ok((0..dataset.len().min(limit)).collect())
    }

    fn strategy(&self) -> ContextStrategy {
        ContextStrategy::Prefix
    }
}

/// BM25 ranking over post title and body
///
/// Falls back to the prefix when no row shares a term with the question.
#[derive(Debug, Clone)]
pub struct KeywordRetriever {
    k1: f64,
    b: f64,
}

impl Default for KeywordRetriever {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

impl KeywordRetriever {
    pub fn new(k1: f64, b: f64) -> Self {
        Self { k1, b }
    }
}

impl ContextRetriever for KeywordRetriever {
    fn select(&self, dataset: &Dataset, question: &str, limit: usize) -> Result<Vec<usize>> {
        if limit == 0 || dataset.is_empty() {
            return Ok(Vec::new());
        }

        let query: HashSet<String> = tokenize(question).collect();
        let columns: Vec<usize> = [&dataset.columns().title, &dataset.columns().selftext]
            .into_iter()
            .filter_map(|name| dataset.optional_column(name))
            .collect();

        if query.is_empty() || columns.is_empty() {
            return PrefixRetriever.select(dataset, question, limit);
        }

        // Term frequencies restricted to query terms, plus document lengths
        let mut term_freqs: Vec<HashMap<&str, usize>> = Vec::with_capacity(dataset.len());
        let mut lengths = Vec::with_capacity(dataset.len());
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();

        for row in 0..dataset.len() {
            let mut freqs: HashMap<&str, usize> = HashMap::new();
            let mut length = 0usize;
            for text in columns.iter().filter_map(|&col| dataset.cell(row, col)) {
                for token in tokenize(text) {
                    length += 1;
                    if let Some(term) = query.get(&token) {
                        *freqs.entry(term.as_str()).or_insert(0) += 1;
                    }
                }
            }
            for &term in freqs.keys() {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
            term_freqs.push(freqs);
            lengths.push(length);
        }

        if doc_freq.is_empty() {
            return PrefixRetriever.select(dataset, question, limit);
        }

        let n = dataset.len() as f64;
        let avg_len = (lengths.iter().sum::<usize>() as f64 / n).max(1.0);

        let mut scored: Vec<(usize, f64)> = term_freqs
            .iter()
            .enumerate()
            .filter(|(_, freqs)| !freqs.is_empty())
            .map(|(row, freqs)| {
                let norm = self.k1 * (1.0 - self.b + self.b * lengths[row] as f64 / avg_len);
                let score = freqs
                    .iter()
                    .map(|(term, &tf)| {
                        let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                        let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
                        let tf = tf as f64;
                        idf * tf * (self.k1 + 1.0) / (tf + norm)
                    })
                    .sum::<f64>();
                (row, score)
            })
            .collect();

        // Highest score first; earlier rows win ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let mut rows: Vec<usize> = scored.into_iter().take(limit).map(|(row, _)| row).collect();
        rows.sort_unstable();
        Ok(rows)
    }

    fn strategy(&self) -> ContextStrategy {
        ContextStrategy::Keyword
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "in", "on", "at", "to", "for",
    "of", "with", "by", "from", "and", "or", "but", "not", "this", "that", "these", "those", "it",
    "its", "as", "do", "does", "did", "has", "have", "had", "can", "could", "will", "would",
    "should", "may", "might", "what", "which", "who", "whom", "how", "why", "when", "where",
    "about", "any", "there", "their", "they", "me", "my", "i", "you", "your", "post", "posts",
];

/// Lowercased alphanumeric words, stop words removed
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 1)
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
}
