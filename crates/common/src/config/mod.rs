//! Configuration management for Redscope
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Dataset source and column layout
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Precomputed visualization artifacts
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Reasoning agent configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration for question endpoints
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maximum concurrent requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// Path of the feature-engineered CSV
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    /// Rows added to the post list per "load more"
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Characters of self-text shown in the post list
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Rows shown in the chat page preview table
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,

    /// Column names of the semantic post fields
    #[serde(default)]
    pub columns: ColumnMap,
}

/// Names of the CSV columns backing each post field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ColumnMap {
    #[serde(default = "col_id")]
    pub id: String,
    #[serde(default = "col_title")]
    pub title: String,
    #[serde(default = "col_author")]
    pub author: String,
    #[serde(default = "col_created")]
    pub created_utc: String,
    #[serde(default = "col_selftext")]
    pub selftext: String,
    #[serde(default = "col_url")]
    pub url: String,
    #[serde(default = "col_permalink")]
    pub permalink: String,
    #[serde(default = "col_ups")]
    pub ups: String,
    #[serde(default = "col_score")]
    pub score: String,
    #[serde(default = "col_num_comments")]
    pub num_comments: String,
    #[serde(default = "col_num_crossposts")]
    pub num_crossposts: String,
}

impl ColumnMap {
    /// All mapped column names
    pub fn all(&self) -> [&str; 11] {
        [
            &self.id,
            &self.title,
            &self.author,
            &self.created_utc,
            &self.selftext,
            &self.url,
            &self.permalink,
            &self.ups,
            &self.score,
            &self.num_comments,
            &self.num_crossposts,
        ]
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactsConfig {
    /// Root directory of the rendered charts and images
    #[serde(default = "default_artifacts_root")]
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Agent provider: gemini, mock
    #[serde(default = "default_agent_provider")]
    pub provider: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(default = "default_agent_api_base")]
    pub api_base: String,

    /// Model to use
    #[serde(default = "default_agent_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_agent_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries for transient failures
    #[serde(default = "default_agent_retries")]
    pub max_retries: u32,

    /// Row selection for the dataset chat: keyword, prefix
    #[serde(default = "default_context_strategy")]
    pub context_strategy: String,

    /// Maximum rows serialized into a dataset prompt
    #[serde(default = "default_context_rows")]
    pub context_rows: usize,

    /// Maximum characters of serialized context
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Cookie carrying the session id
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Idle time after which a session is discarded
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl_secs: u64,

    /// Live sessions kept before the least recently seen is evicted
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level filter (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,

    /// Service name for logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Questions per second across all sessions
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8501 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_max_concurrent() -> usize { 100 }
fn default_dataset_path() -> PathBuf { PathBuf::from("./cleaned_data/combined_df_after_fe_copy.csv") }
fn default_page_size() -> usize { crate::DEFAULT_PAGE_SIZE }
fn default_preview_chars() -> usize { 200 }
fn default_preview_rows() -> usize { 5 }
fn col_id() -> String { "id_original".to_string() }
fn col_title() -> String { "title_original".to_string() }
fn col_author() -> String { "author_original".to_string() }
fn col_created() -> String { "created_utc_original".to_string() }
fn col_selftext() -> String { "selftext_original".to_string() }
fn col_url() -> String { "url_overridden_by_dest_original".to_string() }
fn col_permalink() -> String { "permalink_original".to_string() }
fn col_ups() -> String { "ups_original".to_string() }
fn col_score() -> String { "score_original".to_string() }
fn col_num_comments() -> String { "num_comments_original".to_string() }
fn col_num_crossposts() -> String { "num_crossposts_original".to_string() }
fn default_artifacts_root() -> PathBuf { PathBuf::from("plots") }
fn default_agent_provider() -> String { "gemini".to_string() }
fn default_api_key_env() -> String { "GEMINI_API_KEY".to_string() }
fn default_agent_api_base() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_agent_model() -> String { crate::DEFAULT_AGENT_MODEL.to_string() }
fn default_agent_timeout() -> u64 { 60 }
fn default_agent_retries() -> u32 { 2 }
fn default_context_strategy() -> String { "keyword".to_string() }
fn default_context_rows() -> usize { 1500 }
fn default_max_context_chars() -> usize { 400_000 }
fn default_cookie_name() -> String { "redscope_session".to_string() }
fn default_idle_ttl() -> u64 { 4 * 60 * 60 }
fn default_max_sessions() -> usize { 10_000 }
fn default_log_level() -> String { "info".to_string() }
fn default_service_name() -> String { "redscope".to_string() }
fn default_rate_limit() -> u32 { 2 }
fn default_burst() -> u32 { 10 }
fn default_enabled() -> bool { true }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            page_size: default_page_size(),
            preview_chars: default_preview_chars(),
            preview_rows: default_preview_rows(),
            columns: ColumnMap::default(),
        }
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            id: col_id(),
            title: col_title(),
            author: col_author(),
            created_utc: col_created(),
            selftext: col_selftext(),
            url: col_url(),
            permalink: col_permalink(),
            ups: col_ups(),
            score: col_score(),
            num_comments: col_num_comments(),
            num_crossposts: col_num_crossposts(),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self { root: default_artifacts_root() }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: default_agent_provider(),
            api_key_env: default_api_key_env(),
            api_base: default_agent_api_base(),
            model: default_agent_model(),
            temperature: 0.0,
            timeout_secs: default_agent_timeout(),
            max_retries: default_agent_retries(),
            context_strategy: default_context_strategy(),
            context_rows: default_context_rows(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

impl AgentConfig {
    /// API key from the configured environment variable, if set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            idle_ttl_secs: default_idle_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
            service_name: default_service_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_enabled(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Get session idle TTL as Duration
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session.idle_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.dataset.page_size, 1000);
        assert_eq!(config.agent.model, "gemini-2.0-flash");
        assert_eq!(config.agent.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.dataset.columns.id, "id_original");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[dataset]\npage_size = 250\n\n[agent]\nprovider = \"mock\"").unwrap();

        let config = AppConfig::from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.dataset.page_size, 250);
        assert_eq!(config.dataset.preview_chars, 200);
        assert_eq!(config.agent.provider, "mock");
        assert_eq!(config.agent.context_rows, 1500);
        assert_eq!(config.server.port, 8501);
    }

    #[test]
    fn test_column_map_lists_every_field() {
        let columns = ColumnMap::default();
        let all = columns.all();
        assert_eq!(all.len(), 11);
        assert!(all.contains(&"num_crossposts_original"));
    }
}
