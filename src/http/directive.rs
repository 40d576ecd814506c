//! Response-directive routing.
//!
//! # Responsibilities
//! - Inspect (and strip) the middleware's directive headers
//! - Decide among rewrite-internal / rewrite-external / continue /
//!   direct-response / redirect, first match wins
//!
//! # Design Decisions
//! - Pure decision function over header state; the single outbound fetch is
//!   executed by the worker, keeping this logic unit-testable without I/O
//! - An unparsable rewrite target drops the directive and falls through as
//!   if none were present (conservative, never an error)
//! - Directive headers are deleted as they are read, so the final response
//!   cannot leak them

use axum::http::header::LOCATION;
use axum::http::HeaderMap;
use url::Url;

use crate::http::params::resolve_against_base;

/// Destination path or absolute URL to fetch instead of continuing.
pub const REWRITE: &str = "x-middleware-rewrite";

/// Presence signals "continue to origin"; the value is ignored.
pub const NEXT: &str = "x-middleware-next";

/// Terminal routing decision for one middleware response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    /// Path-relative rewrite: fetch the request's own path and query
    /// resolved against the upstream base.
    RewriteInternal { target: Url },
    /// Absolute-URL rewrite: fetch that URL with the current request.
    RewriteExternal { target: Url },
    /// Middleware asked to proceed to the original destination.
    Continue { target: Url },
    /// Pass the middleware response through unchanged.
    DirectResponse,
    /// `location` header present: keep status and headers, discard the body.
    RedirectTerminal,
}

impl RouteAction {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RouteAction::RewriteInternal { .. } => "rewrite_internal",
            RouteAction::RewriteExternal { .. } => "rewrite_external",
            RouteAction::Continue { .. } => "continue",
            RouteAction::DirectResponse => "direct",
            RouteAction::RedirectTerminal => "redirect",
        }
    }
}

/// Decide the terminal action for a middleware response.
///
/// Evaluated top to bottom, first match wins. Directive headers are removed
/// from `response` as a side effect; `location` is inspected but kept.
pub fn decide(request_url: &Url, response: &mut HeaderMap, upstream_base: &Url) -> RouteAction {
    // Both reserved keys are consumed up front: even when the rewrite wins,
    // a stray next directive must not survive onto the final response.
    let rewrite = response.remove(REWRITE);
    let next = response.remove(NEXT).is_some();

    if let Some(rewrite) = rewrite {
        if let Ok(value) = rewrite.to_str() {
            if value.starts_with('/') {
                return RouteAction::RewriteInternal {
                    target: resolve_against_base(upstream_base, request_url),
                };
            }
            match Url::parse(value) {
                Ok(target) => return RouteAction::RewriteExternal { target },
                Err(err) => {
                    tracing::debug!(
                        rewrite = %value,
                        error = %err,
                        "Dropping unparsable rewrite directive"
                    );
                }
            }
        }
        // Fall through as if the rewrite directive were never present.
    }

    if next {
        return RouteAction::Continue {
            target: resolve_against_base(upstream_base, request_url),
        };
    }

    if !response.contains_key(LOCATION) {
        return RouteAction::DirectResponse;
    }

    RouteAction::RedirectTerminal
}
