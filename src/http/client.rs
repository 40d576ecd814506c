//! Outbound HTTP client.
//!
//! # Responsibilities
//! - Perform the single outbound fetch an invocation may require
//! - Hide the concrete client behind a trait so routing can be tested
//!   without a network
//!
//! # Design Decisions
//! - hyper-util's legacy pooled client, built once and cloned per request
//! - No retries or timeouts here; the request-level timeout layer and the
//!   host's cancellation cover the outbound leg

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

/// Failure of an outbound fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid outbound target: {0}")]
    Uri(#[from] axum::http::uri::InvalidUri),

    #[error("failed to build outbound request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
}

/// Seam over the outbound HTTP client.
pub trait Fetcher: Send + Sync {
    /// Issue the request and return the upstream response.
    fn fetch(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, FetchError>>;
}

/// Production fetcher backed by a pooled hyper client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client<HttpConnector, Body>,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, FetchError>> {
        Box::pin(async move {
            let response = self.client.request(request).await?;
            let (parts, body) = response.into_parts();
            Ok(Response::from_parts(parts, Body::new(body)))
        })
    }
}
