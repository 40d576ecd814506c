//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all invocation handler
//! - Wire up middleware (tracing, timeout, body limit, request ID)
//! - Bind the server to a listener
//! - Dispatch every request to the hosted middleware worker
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AdapterConfig;
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::middleware::MiddlewareWorker;
use crate::observability::metrics;

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub worker: Arc<MiddlewareWorker>,
}

/// HTTP server hosting the middleware adapter.
pub struct HttpServer {
    router: Router,
    config: AdapterConfig,
}

impl HttpServer {
    /// Create a new HTTP server around a loaded worker.
    pub fn new(config: AdapterConfig, worker: Arc<MiddlewareWorker>) -> Self {
        let state = AppState { worker };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AdapterConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(invoke_handler))
            .route("/", any(invoke_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }
}

/// Catch-all handler: every path goes through the middleware worker.
async fn invoke_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> impl IntoResponse {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Invoking middleware"
    );

    let response: Response = state.worker.handle(request).await.into_response();

    metrics::record_invocation(&method, response.status().as_u16(), start_time);
    response
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
