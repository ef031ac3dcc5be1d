//! Redscope web gateway
//!
//! Serves the analysis dashboard, the post browser with per-post chat,
//! the dataset chat page, and a small JSON API over the same state.

pub mod handlers;
pub mod middleware;
pub mod views;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use middleware::rate_limit::{create_rate_limiter, GlobalRateLimiter};
use redscope_common::{
    agent::ReasoningAgent,
    config::AppConfig,
    dashboard::{ArtifactStore, ARTIFACTS_URL_PREFIX},
    dataset::DatasetLoader,
    errors::Result,
    qa::QaService,
    session::SessionStore,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use views::Views;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub datasets: Arc<DatasetLoader>,
    pub sessions: Arc<SessionStore>,
    pub qa: Arc<QaService>,
    pub artifacts: ArtifactStore,
    pub views: Arc<Views>,
    pub limiter: Option<Arc<GlobalRateLimiter>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state from configuration and the outcome of agent construction
    ///
    /// A missing agent is tolerated; only template or strategy errors fail.
    pub fn new(config: AppConfig, agent: Result<Arc<dyn ReasoningAgent>>) -> Result<Self> {
        let qa = QaService::new(agent, &config.agent)?;
        let limiter = config
            .rate_limit
            .enabled
            .then(|| create_rate_limiter(config.rate_limit.requests_per_second, config.rate_limit.burst));

        Ok(Self {
            datasets: Arc::new(DatasetLoader::new(&config.dataset)),
            sessions: Arc::new(SessionStore::new(
                config.session_ttl(),
                config.session.max_sessions,
            )),
            qa: Arc::new(qa),
            artifacts: ArtifactStore::new(config.artifacts.root.clone()),
            views: Arc::new(Views::new()?),
            limiter,
            metrics: None,
            config: Arc::new(config),
        })
    }

    /// Replace the dataset source
    pub fn with_datasets(mut self, datasets: DatasetLoader) -> Self {
        self.datasets = Arc::new(datasets);
        self
    }

    /// Expose a Prometheus recorder at `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    use handlers::{api, chat, dashboard, health, metrics, post_details, posts};

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Question endpoints spend upstream quota
    let ask_routes = Router::new()
        .route("/chat/ask", post(chat::ask))
        .route("/post_details/ask", post(post_details::ask))
        .route("/api/chat", post(api::chat))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::rate_limit::rate_limit_middleware,
        ));

    // Everything that reads or mutates per-visitor state
    let session_routes = Router::new()
        .route("/", get(dashboard::index))
        .route("/posts", get(posts::list))
        .route("/posts/more", post(posts::load_more))
        .route("/post_details", get(post_details::show))
        .route("/chat", get(chat::show))
        .route("/api/posts", get(api::list_posts))
        .route("/api/posts/{id}", get(api::get_post))
        .route(
            "/api/session",
            get(api::session_snapshot).delete(api::end_session),
        )
        .merge(ask_routes)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::session::session_middleware,
        ));

    let artifacts = ServeDir::new(state.artifacts.root());

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(metrics::export))
        .merge(session_routes)
        .nest_service(ARTIFACTS_URL_PREFIX, artifacts)
        .layer(from_fn(middleware::metrics::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(ConcurrencyLimitLayer::new(state.config.server.max_concurrent_requests))
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}
