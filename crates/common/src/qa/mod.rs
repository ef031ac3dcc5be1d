//! Question answering over the dataset
//!
//! Ties context selection, prompt building, the reasoning agent and the
//! session transcript together. Every accepted question leaves exactly two
//! transcript entries: the question, then an answer or an error notice.

use crate::agent::ReasoningAgent;
use crate::config::AgentConfig;
use crate::context::{build_prompt, create_retriever, ContextRetriever, QueryContext};
use crate::dataset::Dataset;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::session::{ChatScope, SessionContext, TranscriptEntry};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Notice recorded when an ask is dropped before the agent replies
pub const CANCELLED_NOTICE: &str = "The request was cancelled before an answer arrived.";

/// One question and what was recorded in reply
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub question: TranscriptEntry,
    pub response: TranscriptEntry,
    /// Dataset rows the agent was shown
    pub context_rows: usize,
}

pub struct QaService {
    agent: Option<Arc<dyn ReasoningAgent>>,
    unavailable: Option<String>,
    retriever: Box<dyn ContextRetriever>,
    context_rows: usize,
    max_context_chars: usize,
}

impl QaService {
    /// Build the service from the outcome of agent construction
    ///
    /// A failed agent does not fail the service: the reason is kept and
    /// reported by every ask. An unknown context strategy does fail.
    pub fn new(agent: Result<Arc<dyn ReasoningAgent>>, config: &AgentConfig) -> Result<Self> {
        let retriever = create_retriever(&config.context_strategy)?;
        let (agent, unavailable) = match agent {
            Ok(agent) => (Some(agent), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Ok(Self {
            agent,
            unavailable,
            retriever,
            context_rows: config.context_rows,
            max_context_chars: config.max_context_chars,
        })
    }

    pub fn is_available(&self) -> bool {
        self.agent.is_some()
    }

    /// Why questions cannot be asked, when they cannot
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.agent.as_ref().map(|a| a.model_name())
    }

    /// Build the context for a scope without touching any transcript
    pub fn context(&self, dataset: &Dataset, scope: &ChatScope, question: &str) -> Result<QueryContext> {
        match scope {
            ChatScope::Dataset => {
                let rows = self.retriever.select(dataset, question, self.context_rows)?;
                QueryContext::for_rows(dataset, rows, self.max_context_chars)
            }
            ChatScope::Post(id) => QueryContext::for_post(dataset, id),
        }
    }

    /// Answer a question and record the exchange in the session
    ///
    /// Configuration and lookup failures are returned before anything is
    /// appended. Agent failures are recorded as an error entry instead.
    pub async fn ask(
        &self,
        dataset: &Dataset,
        session: &mut SessionContext,
        scope: ChatScope,
        question: &str,
    ) -> Result<Exchange> {
        let agent = self.agent.as_ref().ok_or_else(|| AppError::Configuration {
            message: self
                .unavailable
                .clone()
                .unwrap_or_else(|| "question answering is not configured".to_string()),
        })?;

        let session_id = session.id();
        let question = question.trim();
        let context = self.context(dataset, &scope, question)?;
        if context.truncated_rows > 0 {
            info!(
                scope = scope.label(),
                kept = context.row_count(),
                dropped = context.truncated_rows,
                "Context trimmed to character budget"
            );
        }
        let prompt = build_prompt(context.kind, &context.csv, question);

        session.transcript_mut(&scope).push_user(question);
        metrics::record_transcript_append(scope.label(), "user");

        let pending = PendingResponse {
            session: &mut *session,
            scope: &scope,
            settled: false,
        };
        let result = agent.answer(&prompt).await;
        pending.settle();

        let transcript = session.transcript_mut(&scope);

        match result {
            Ok(answer) => transcript.push_assistant(answer),
            Err(e) => {
                warn!(
                    session = %session_id,
                    scope = scope.label(),
                    error = %e,
                    "Question could not be answered"
                );
                transcript.push_error(e.to_string());
            }
        }
        metrics::record_transcript_append(scope.label(), "assistant");

        let entries = transcript.entries();
        let n = entries.len();
        Ok(Exchange {
            question: entries[n - 2].clone(),
            response: entries[n - 1].clone(),
            context_rows: context.row_count(),
        })
    }
}

/// Keeps the question paired with a response if the ask future is dropped
/// while the agent call is in flight
struct PendingResponse<'a> {
    session: &'a mut SessionContext,
    scope: &'a ChatScope,
    settled: bool,
}

impl PendingResponse<'_> {
    /// The agent call resolved; the caller records the response
    fn settle(mut self) {
        self.settled = true;
    }
}

impl Drop for PendingResponse<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(
            session = %self.session.id(),
            scope = self.scope.label(),
            "Question dropped before the agent replied"
        );
        self.session.transcript_mut(self.scope).push_error(CANCELLED_NOTICE);
        metrics::record_transcript_append(self.scope.label(), "assistant");
    }
}
