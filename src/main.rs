//! Middleware header-directive adapter.
//!
//! An edge-style host for middleware written against the `x-middleware-*`
//! header protocol, built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │              MIDDLEWARE ADAPTER               │
//!                    │                                               │
//!   Client Request   │  ┌─────────┐   ┌────────────┐   ┌──────────┐ │
//!   ─────────────────┼─▶│  http   │──▶│ middleware │──▶│directive │ │
//!                    │  │ server  │   │   worker   │   │  router  │ │
//!                    │  └─────────┘   └────────────┘   └────┬─────┘ │
//!                    │                                      │       │
//!                    │              continue / rewrite      ▼       │
//!   Client Response  │  ┌─────────┐                  ┌──────────┐   │    Upstream
//!   ◀────────────────┼──│ header  │◀─────────────────│ outbound │◀──┼──── origin
//!                    │  │  merge  │                  │  client  │   │
//!                    │  └─────────┘                  └──────────┘   │
//!                    └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use middleware_adapter::config::{load_config, upstream_url, AdapterConfig};
use middleware_adapter::http::{HttpFetcher, HttpServer};
use middleware_adapter::middleware::{
    InvocationContext, Middleware, MiddlewareFuture, MiddlewareWorker, StaticModuleLoader,
};

use axum::http::request::Parts;

#[derive(Parser)]
#[command(name = "middleware-adapter")]
#[command(about = "Host a middleware callable behind the x-middleware-* header protocol", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "adapter.toml")]
    config: PathBuf,

    /// Upstream base URL, overriding the configured one.
    #[arg(long)]
    url: Option<String>,
}

/// Middleware used when none is linked in: produces no response, so every
/// request continues to the origin untouched.
struct PassthroughMiddleware;

impl Middleware for PassthroughMiddleware {
    fn handle<'a>(
        &'a self,
        _request: &'a Parts,
        _ctx: &'a mut InvocationContext,
    ) -> MiddlewareFuture<'a> {
        Box::pin(async move { Ok(None) })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "middleware_adapter=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        tracing::warn!(path = %cli.config.display(), "Config file not found, using defaults");
        AdapterConfig::default()
    };
    if let Some(url) = cli.url {
        config.upstream.url = url;
    }
    let base = upstream_url(&config)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %base,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => middleware_adapter::observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // The statically-linked module; deployments embedding their own
    // middleware swap this loader out.
    let loader = StaticModuleLoader::new(Arc::new(PassthroughMiddleware));
    let worker = MiddlewareWorker::load(
        &loader,
        base,
        config.env.clone(),
        Arc::new(HttpFetcher::new()),
    )
    .await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let server = HttpServer::new(config, Arc::new(worker));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
