//! Request handlers

pub mod api;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod metrics;
pub mod post_details;
pub mod posts;

use redscope_common::errors::{AppError, Result};
use serde::Deserialize;
use validator::Validate;

/// Longest question accepted from a form or the API
pub const MAX_QUESTION_CHARS: u64 = 2000;

/// A question as submitted by a visitor
#[derive(Debug, Deserialize, Validate)]
pub struct Question {
    #[validate(length(min = 1, max = MAX_QUESTION_CHARS))]
    pub question: String,
}

impl Question {
    /// Trim and validate, returning the text to ask
    pub fn accept(raw: &str) -> Result<String> {
        let question = Question {
            question: raw.trim().to_string(),
        };
        question.validate().map_err(|e| AppError::Validation {
            message: e.to_string(),
        })?;
        Ok(question.question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_is_trimmed() {
        assert_eq!(Question::accept("  why?  ").unwrap(), "why?");
    }

    #[test]
    fn test_blank_question_rejected() {
        let err = Question::accept("   \n").unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_overlong_question_rejected() {
        let long = "x".repeat(MAX_QUESTION_CHARS as usize + 1);
        assert!(Question::accept(&long).is_err());
        assert!(Question::accept(&long[1..]).is_ok());
    }
}
