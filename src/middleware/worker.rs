//! Worker entry point.
//!
//! # Responsibilities
//! - Build the per-invocation context (source page, environment bindings)
//! - Invoke the resolved middleware callable
//! - Synthesize the default continuation response when the callable
//!   returns none
//! - Run the directive router and execute at most one outbound fetch
//! - Convert uncaught failures into 500 diagnostic responses
//!
//! # Design Decisions
//! - The callable is resolved once, when the worker is constructed; a bad
//!   module fails before the first request is served
//! - The 500 body carries the error chain text. That surfaces diagnostics
//!   to the caller, which suits preview deployments; production setups
//!   should swap in an opaque body and keep the trace in the logs

use std::sync::Arc;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::{header, Request, Response, StatusCode, Uri};
use thiserror::Error;
use url::Url;

use crate::http::client::{FetchError, Fetcher};
use crate::http::directive::{decide, NEXT};
use crate::http::headers::{apply_header_overrides, apply_headers};
use crate::http::RouteAction;
use crate::middleware::context::{EnvBindings, InvocationContext};
use crate::middleware::module::{BoxError, LoadError, Middleware, ModuleLoader};

/// Request-scoped entry point hosting one middleware callable.
pub struct MiddlewareWorker {
    callable: Arc<dyn Middleware>,
    fetcher: Arc<dyn Fetcher>,
    upstream_base: Url,
    env: Arc<EnvBindings>,
}

#[derive(Debug, Error)]
enum WorkerError {
    #[error("middleware invocation failed: {0}")]
    Middleware(#[source] BoxError),

    #[error("invalid request url: {0}")]
    RequestUrl(#[source] url::ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl MiddlewareWorker {
    /// Resolve the middleware module and construct the worker.
    ///
    /// Fails fast when the loader errors or the module exposes no callable.
    pub async fn load(
        loader: &dyn ModuleLoader,
        upstream_base: Url,
        env: EnvBindings,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, LoadError> {
        let callable = loader.load().await?.resolve()?;
        Ok(Self {
            callable,
            fetcher,
            upstream_base,
            env: Arc::new(env),
        })
    }

    /// Handle one inbound request. Never fails: errors become 500
    /// responses carrying the diagnostic trace.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        match self.run(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "Invocation failed");
                diagnostic_response(&err)
            }
        }
    }

    async fn run(&self, request: Request<Body>) -> Result<Response<Body>, WorkerError> {
        let (mut parts, body) = request.into_parts();
        let request_url = request_url(&parts)?;

        let mut ctx =
            InvocationContext::new(request_url.path().to_owned(), self.env.clone());

        let response = self
            .callable
            .handle(&parts, &mut ctx)
            .await
            .map_err(WorkerError::Middleware)?;
        let mut response = response.unwrap_or_else(default_continue_response);

        // Overrides mutate the request headers in place so the fetch below
        // sees them.
        apply_header_overrides(&mut parts.headers, response.headers_mut());

        let action = decide(&request_url, response.headers_mut(), &self.upstream_base);
        tracing::debug!(
            action = action.label(),
            path = %request_url.path(),
            "Routing middleware response"
        );

        match action {
            RouteAction::RewriteInternal { target }
            | RouteAction::RewriteExternal { target }
            | RouteAction::Continue { target } => {
                let outbound = outbound_request(&parts, body, &target)?;
                let mut fetched = self.fetcher.fetch(outbound).await?;
                apply_headers(fetched.headers_mut(), response.headers());
                Ok(fetched)
            }
            RouteAction::DirectResponse => Ok(response),
            RouteAction::RedirectTerminal => {
                let (parts, _) = response.into_parts();
                Ok(Response::from_parts(parts, Body::empty()))
            }
        }
    }
}

/// Absolute URL of the inbound request, reconstructed from the request
/// parts (servers usually see only the path and query).
fn request_url(parts: &Parts) -> Result<Url, WorkerError> {
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let host = parts
        .uri
        .authority()
        .map(|a| a.as_str())
        .or_else(|| {
            parts
                .headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
        })
        .unwrap_or("localhost");
    Url::parse(&format!("http://{host}{path_and_query}")).map_err(WorkerError::RequestUrl)
}

/// Build the outbound request reusing the (possibly override-mutated)
/// inbound parts and body.
fn outbound_request(parts: &Parts, body: Body, target: &Url) -> Result<Request<Body>, FetchError> {
    let uri = Uri::try_from(target.as_str())?;
    let mut builder = Request::builder().method(parts.method.clone()).uri(uri);
    if let Some(headers) = builder.headers_mut() {
        for (key, value) in parts.headers.iter() {
            headers.append(key.clone(), value.clone());
        }
        // The host belongs to the fetch target, not the inbound edge.
        headers.remove(header::HOST);
    }
    Ok(builder.body(body)?)
}

/// Response synthesized when the middleware returns nothing: an explicit
/// "continue to origin".
fn default_continue_response() -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header(NEXT, "1")
        .body(Body::empty())
        .unwrap()
}

fn diagnostic_response(err: &dyn std::error::Error) -> Response<Body> {
    let mut trace = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        trace.push_str("\ncaused by: ");
        trace.push_str(&cause.to_string());
        source = cause.source();
    }
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(trace))
        .unwrap()
}
