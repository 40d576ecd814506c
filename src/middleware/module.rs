//! Middleware module loading and normalization.
//!
//! # Responsibilities
//! - Define the callable contract the adapter hosts
//! - Resolve a loaded module's `default`/`middleware` exports into exactly
//!   one callable, validated once before any request is served
//!
//! # Design Decisions
//! - Resolution happens at construction time; a module with neither export
//!   is a configuration error, not a per-request failure
//! - `default` wins over the named export when both are present

use std::sync::Arc;

use axum::body::Body;
use axum::http::request::Parts;
use axum::http::Response;
use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::middleware::context::InvocationContext;

/// Boxed error type middleware implementations may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Future returned by a middleware invocation.
///
/// `Ok(None)` means the middleware produced no response; the worker then
/// synthesizes a default continuation.
pub type MiddlewareFuture<'a> = BoxFuture<'a, Result<Option<Response<Body>>, BoxError>>;

/// The hosted middleware callable.
pub trait Middleware: Send + Sync {
    fn handle<'a>(&'a self, request: &'a Parts, ctx: &'a mut InvocationContext)
        -> MiddlewareFuture<'a>;
}

impl<F> Middleware for F
where
    F: for<'a> Fn(&'a Parts, &'a mut InvocationContext) -> MiddlewareFuture<'a> + Send + Sync,
{
    fn handle<'a>(
        &'a self,
        request: &'a Parts,
        ctx: &'a mut InvocationContext,
    ) -> MiddlewareFuture<'a> {
        self(request, ctx)
    }
}

impl std::fmt::Debug for dyn Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Middleware")
    }
}

/// Failure to obtain a usable middleware callable.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("middleware module has neither a default nor a `middleware` export")]
    MissingExport,

    #[error("failed to load middleware module: {0}")]
    Module(#[source] BoxError),
}

/// Shape of a loaded middleware module: a default export, a named
/// `middleware` export, or both.
#[derive(Clone, Default)]
pub struct MiddlewareModule {
    pub default: Option<Arc<dyn Middleware>>,
    pub middleware: Option<Arc<dyn Middleware>>,
}

impl MiddlewareModule {
    /// Normalize the export shape into one callable. Default wins.
    pub fn resolve(self) -> Result<Arc<dyn Middleware>, LoadError> {
        self.default
            .or(self.middleware)
            .ok_or(LoadError::MissingExport)
    }
}

/// External collaborator producing the middleware module.
pub trait ModuleLoader: Send + Sync {
    fn load(&self) -> BoxFuture<'_, Result<MiddlewareModule, LoadError>>;
}

/// Loader for middleware linked into the binary (and for tests).
#[derive(Clone)]
pub struct StaticModuleLoader {
    module: MiddlewareModule,
}

impl StaticModuleLoader {
    /// Wrap an already-constructed callable as the module's default export.
    pub fn new(callable: Arc<dyn Middleware>) -> Self {
        Self {
            module: MiddlewareModule {
                default: Some(callable),
                middleware: None,
            },
        }
    }

    /// Use an explicit module shape, e.g. one with only the named export.
    pub fn from_module(module: MiddlewareModule) -> Self {
        Self { module }
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn load(&self) -> BoxFuture<'_, Result<MiddlewareModule, LoadError>> {
        let module = self.module.clone();
        Box::pin(async move { Ok(module) })
    }
}
