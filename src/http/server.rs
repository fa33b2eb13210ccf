//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, body limit, request ID, metrics)
//! - Bind server to listener and stop on the shutdown broadcast
//! - Report detached relays abandoned at shutdown
//! - Run metrics recorder upkeep while serving

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::compression::Dictionary;
use crate::config::PrecompressorConfig;
use crate::http::handlers;
use crate::http::middleware::track_requests;
use crate::lifecycle::startup::{build_relay, StartupError};
use crate::lifecycle::BackgroundTasks;
use crate::observability::metrics;
use crate::relay::DownstreamRelay;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dictionary: Arc<Dictionary>,
    pub relay: DownstreamRelay,
    pub tasks: BackgroundTasks,
    pub metrics: Option<PrometheusHandle>,
}

/// HTTP server for the precompressor.
pub struct HttpServer {
    router: Router,
    config: PrecompressorConfig,
    tasks: BackgroundTasks,
    metrics: Option<PrometheusHandle>,
}

impl HttpServer {
    /// Create a new HTTP server around an already loaded dictionary.
    pub fn new(config: PrecompressorConfig, dictionary: Arc<Dictionary>) -> Result<Self, StartupError> {
        let relay = build_relay(&config.downstream)?;
        let tasks = BackgroundTasks::new();
        let metrics = config
            .observability
            .metrics_enabled
            .then(metrics::init_metrics);

        let state = AppState {
            dictionary,
            relay,
            tasks: tasks.clone(),
            metrics: metrics.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            tasks,
            metrics,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &PrecompressorConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/", get(handlers::health))
            .route("/batch", post(handlers::relay_batch))
            .route("/{id}", post(handlers::relay_single));
        // "metrics" stays a valid item id for POST.
        if config.observability.metrics_enabled {
            router = router.route(
                "/metrics",
                get(handlers::metrics).post(handlers::relay_metrics_item),
            );
        }

        router
            .with_state(state)
            .layer(middleware::from_fn(track_requests))
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoint = %self.config.downstream.endpoint,
            "HTTP server starting"
        );

        let upkeep = self
            .metrics
            .clone()
            .map(|handle| metrics::spawn_upkeep(handle, metrics::UPKEEP_INTERVAL));

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await;

        if let Some(upkeep) = upkeep {
            upkeep.abort();
        }
        served?;

        let pending = self.tasks.in_flight();
        if pending > 0 {
            tracing::warn!(pending, "Abandoning in-flight background relays");
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle on the detached relay tasks.
    pub fn tasks(&self) -> &BackgroundTasks {
        &self.tasks
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &PrecompressorConfig {
        &self.config
    }
}
