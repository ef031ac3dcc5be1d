//! Reasoning agent abstraction
//!
//! Provides a unified interface for answering a prepared prompt:
//! - Gemini (hosted, `generateContent`)
//! - Mock (deterministic, for tests and offline runs)

mod gemini;

pub use gemini::GeminiAgent;

use crate::config::AgentConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Trait for LLM-backed question answering
#[async_trait]
pub trait ReasoningAgent: Send + Sync {
    /// Produce an answer for a fully formatted prompt
    async fn answer(&self, prompt: &str) -> Result<String>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Failure a [`MockAgent`] can be told to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    RateLimited,
    Timeout,
    Unavailable,
}

impl MockFailure {
    fn to_error(self) -> AppError {
        match self {
            MockFailure::RateLimited => AppError::AgentRateLimited {
                message: "mock quota exhausted".to_string(),
            },
            MockFailure::Timeout => AppError::AgentTimeout { timeout_secs: 60 },
            MockFailure::Unavailable => AppError::AgentUnavailable {
                status: Some(503),
                message: "mock outage".to_string(),
            },
        }
    }
}

/// Mock agent for testing
///
/// Answers with the question it finds in the prompt, or fails on
/// selected calls. Every prompt received is kept for inspection.
#[derive(Default)]
pub struct MockAgent {
    /// One-based call numbers that fail
    failing_calls: Vec<(usize, MockFailure)>,
    prompts: Mutex<Vec<String>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the given call (one-based) with `failure`
    pub fn failing_on(mut self, call: usize, failure: MockFailure) -> Self {
        self.failing_calls.push((call, failure));
        self
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReasoningAgent for MockAgent {
    async fn answer(&self, prompt: &str) -> Result<String> {
        let call = {
            let mut prompts = self.prompts.lock().map_err(|_| AppError::Internal {
                message: "mock agent state poisoned".to_string(),
            })?;
            prompts.push(prompt.to_string());
            prompts.len()
        };

        if let Some((_, failure)) = self.failing_calls.iter().find(|(n, _)| *n == call) {
            return Err(failure.to_error());
        }

        Ok(format!("Answer to: {}", question_in(prompt)))
    }

    fn model_name(&self) -> &str {
        "mock-agent"
    }
}

/// The question section of a prompt built by `context::build_prompt`
fn question_in(prompt: &str) -> &str {
    prompt
        .rsplit_once("Question:\n")
        .map(|(_, rest)| rest)
        .and_then(|rest| rest.split_once("\n\nAnswer:"))
        .map(|(question, _)| question.trim())
        .unwrap_or_else(|| prompt.trim())
}

/// Create an agent based on configuration
///
/// Fails with a configuration error when the provider is unknown or its
/// API key is missing; callers decide whether that is fatal.
pub fn create_agent(config: &AgentConfig) -> Result<Arc<dyn ReasoningAgent>> {
    match config.provider.as_str() {
        "gemini" => {
            let key = config.api_key().ok_or_else(|| AppError::Configuration {
                message: format!(
                    "{} is not set; question answering is unavailable",
                    config.api_key_env
                ),
            })?;
            Ok(Arc::new(GeminiAgent::new(config, key)?))
        }
        "mock" => Ok(Arc::new(MockAgent::new())),
        other => Err(AppError::Configuration {
            message: format!("Unknown agent provider: {}", other),
        }),
    }
}
