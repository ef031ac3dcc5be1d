//! Redscope server
//!
//! Loads configuration, installs logging and the Prometheus recorder,
//! builds the reasoning agent and serves the router until a shutdown
//! signal arrives.

use anyhow::Context;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use redscope_common::{
    agent::create_agent,
    config::{AppConfig, ObservabilityConfig},
    metrics::{self, AGENT_BUCKETS, LATENCY_BUCKETS, METRICS_PREFIX},
    VERSION,
};
use redscope_gateway::{create_router, AppState};
use tokio::{signal, sync::oneshot};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.observability);

    info!(
        service = %config.observability.service_name,
        "Starting Redscope v{}",
        VERSION
    );

    let handle = install_metrics().context("Failed to install metrics recorder")?;
    metrics::register_metrics();

    let agent = create_agent(&config.agent);
    match &agent {
        Ok(agent) => info!(model = agent.model_name(), "Reasoning agent ready"),
        Err(e) => warn!(error = %e, "Question answering disabled"),
    }

    let shutdown_timeout = config.shutdown_timeout();
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState::new(config, agent)?.with_metrics(handle);

    // Warm the dataset so the first visitor does not pay for parsing
    match state.datasets.get().await {
        Ok(dataset) => info!(rows = dataset.len(), source = dataset.source(), "Dataset loaded"),
        Err(e) => error!(error = %e, "Dataset unavailable; pages will report the error"),
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    let (signalled_tx, signalled_rx) = oneshot::channel();
    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = signalled_tx.send(());
    });
    let mut server = tokio::spawn(async move { serve.await });

    tokio::select! {
        result = &mut server => result??,
        _ = signalled_rx => {
            match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(result) => result??,
                Err(_) => {
                    warn!(
                        timeout_secs = shutdown_timeout.as_secs(),
                        "Open connections did not drain in time"
                    );
                    server.abort();
                }
            }
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets(LATENCY_BUCKETS)?
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_agent_duration_seconds", METRICS_PREFIX)),
            AGENT_BUCKETS,
        )?
        .install_recorder()?;
    Ok(handle)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
