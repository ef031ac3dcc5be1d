//! Gemini `generateContent` client

use super::ReasoningAgent;
use crate::config::AgentConfig;
use crate::errors::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoffBuilder;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Hosted Gemini model
pub struct GeminiAgent {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    timeout_secs: u64,
    max_retries: u32,
    retry_interval: Duration,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl GeminiAgent {
    /// Create a new Gemini agent
    pub fn new(config: &AgentConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            retry_interval: Duration::from_millis(500),
        })
    }

    #[cfg(test)]
    fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// Make request with retry on transient failures
    async fn request_with_retry(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(self.retry_interval)
            .with_max_interval(Duration::from_secs(8))
            .with_max_elapsed_time(Some(Duration::from_secs(
                self.timeout_secs * (u64::from(self.max_retries) + 1),
            )))
            .build();

        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let request = &request;

        retry(policy, move || async move {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            match self.make_request(request).await {
                Ok(answer) => Ok(answer),
                Err(e) if e.is_transient() && attempt <= self.max_retries => {
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "Agent request failed, retrying"
                    );
                    metrics::record_agent_retry(&self.model, e.kind());
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await
    }

    async fn make_request(&self, request: &GenerateRequest<'_>) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &body));
        }

        parse_answer(&body)
    }

    fn transport_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            AppError::AgentTimeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            AppError::AgentUnavailable {
                status: None,
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ReasoningAgent for GeminiAgent {
    async fn answer(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let result = self.request_with_retry(prompt).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &result {
            Ok(answer) => {
                metrics::record_agent(elapsed, &self.model, "success");
                info!(
                    model = %self.model,
                    prompt_chars = prompt.len(),
                    answer_chars = answer.len(),
                    duration_ms = (elapsed * 1000.0) as u64,
                    "Agent answered"
                );
            }
            Err(e) => {
                metrics::record_agent(elapsed, &self.model, e.kind());
                warn!(model = %self.model, error = %e, "Agent request failed");
            }
        }

        result
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Map a non-success HTTP status to an error
pub(crate) fn classify_status(status: u16, body: &str) -> AppError {
    let message = error_message(body);
    match status {
        429 => AppError::AgentRateLimited { message },
        401 | 403 => AppError::AgentAuth { status },
        400 if body.contains("API_KEY_INVALID") || body.contains("API key not valid") => {
            AppError::AgentAuth { status }
        }
        _ => AppError::AgentUnavailable {
            status: Some(status),
            message,
        },
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// Extract the answer text from a success body
pub(crate) fn parse_answer(body: &str) -> Result<String> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| AppError::AgentMalformed {
            message: format!("Failed to parse response: {}", e),
        })?;

    let candidate = match response.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked: {}", r))
                .unwrap_or_else(|| "response has no candidates".to_string());
            return Err(AppError::AgentMalformed { message: reason });
        }
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(AppError::AgentMalformed {
            message: format!("empty answer (finish reason: {})", reason),
        });
    }

    Ok(text.to_string())
}
