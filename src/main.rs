// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use clap::Parser;
use futures::StreamExt;
use kube::{
    runtime::{controller::Action, watcher::Config, Controller},
    Api, Client, ResourceExt,
};
use namespacelabel::{
    config::{LogFormat, OperatorConfig},
    constants::{HEALTH_SERVER_PATH, METRICS_SERVER_PATH, TOKIO_WORKER_THREADS},
    context::Context,
    crd::NamespaceLabel,
    errors::NamespaceLabelError,
    metrics,
    reconcilers::{reconcile_namespacelabel, ReconcileOutcome},
    store::KubeLabelStore,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

/// State handed to every reconcile invocation by the controller
struct ControllerState {
    ctx: Arc<Context>,
    resync_interval: Duration,
    error_requeue: Duration,
}

fn main() -> Result<()> {
    let config = OperatorConfig::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("namespacelabel-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: OperatorConfig) -> Result<()> {
    init_tracing(config.log_format);

    info!("Starting NamespaceLabel controller");
    debug!(?config, "Loaded configuration");

    let policy = config.label_policy()?;
    let finalization = config.finalization()?;

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let state = Arc::new(ControllerState {
        ctx: Arc::new(Context::new(
            Arc::new(KubeLabelStore::new(client.clone())),
            finalization,
            policy,
        )),
        resync_interval: config.resync_interval(),
        error_requeue: config.error_requeue(),
    });

    tokio::select! {
        result = run_namespacelabel_controller(client, state) => {
            info!("NamespaceLabel controller stopped");
            result
        }
        result = run_metrics_server(config.metrics_addr) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
    }
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and the configured output format.
/// Format: timestamp file:line LEVEL message
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

/// Run the `NamespaceLabel` controller until a shutdown signal arrives
async fn run_namespacelabel_controller(client: Client, state: Arc<ControllerState>) -> Result<()> {
    info!("Starting NamespaceLabel controller");

    let api = Api::<NamespaceLabel>::all(client);

    Controller::new(api, Config::default())
        .shutdown_on_signal()
        .run(reconcile_namespacelabel_wrapper, error_policy, state)
        .for_each(|_| futures::future::ready(()))
        .await;

    Ok(())
}

/// Reconcile wrapper for `NamespaceLabel`
async fn reconcile_namespacelabel_wrapper(
    nsl: Arc<NamespaceLabel>,
    state: Arc<ControllerState>,
) -> Result<Action, ReconcileError> {
    let namespace = nsl.namespace().unwrap_or_default();
    let name = nsl.name_any();
    let start = Instant::now();

    debug!(
        namespace = %namespace,
        name = %name,
        "Reconcile wrapper called for NamespaceLabel"
    );

    let result = reconcile_namespacelabel(state.ctx.clone(), &namespace, &name).await;
    match &result {
        Ok(outcome) => {
            metrics::record_reconciliation_success(outcome.metric_label(), start.elapsed());
            info!(
                "Successfully reconciled NamespaceLabel {}/{}: {:?}",
                namespace, name, outcome
            );
        }
        Err(e) => {
            metrics::record_reconciliation_error(e.metric_label(), start.elapsed());
            error!(
                retryable = e.is_retryable(),
                "Failed to reconcile NamespaceLabel {}/{}: {}", namespace, name, e
            );
        }
    }

    next_action(result, state.resync_interval)
}

/// Map a reconcile result to the controller's next step.
///
/// Live objects are re-checked every `resync_interval` to repair drift on the
/// namespace. Errors go through `error_policy`.
fn next_action(
    result: Result<ReconcileOutcome, NamespaceLabelError>,
    resync_interval: Duration,
) -> Result<Action, ReconcileError> {
    match result {
        Ok(ReconcileOutcome::Applied { .. }) => Ok(Action::requeue(resync_interval)),
        Ok(_) => Ok(Action::await_change()),
        Err(e) => Err(anyhow::Error::from(e).into()),
    }
}

/// Error policy for controller
fn error_policy(
    _resource: Arc<NamespaceLabel>,
    _err: &ReconcileError,
    state: Arc<ControllerState>,
) -> Action {
    Action::requeue(state.error_requeue)
}

/// Router serving the metrics and liveness endpoints
fn metrics_router() -> Router {
    Router::new()
        .route(METRICS_SERVER_PATH, get(metrics_handler))
        .route(HEALTH_SERVER_PATH, get(|| async { "ok" }))
}

async fn metrics_handler() -> impl IntoResponse {
    match metrics::gather_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Serve `/metrics` and `/healthz` on `addr`
async fn run_metrics_server(addr: SocketAddr) -> Result<()> {
    info!("Starting metrics server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, metrics_router()).await?;

    Ok(())
}
