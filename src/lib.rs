//! Middleware header-directive adapter library.
//!
//! Hosts a middleware callable and translates the `x-middleware-*` response
//! header protocol into concrete HTTP actions: continue to the origin,
//! rewrite internally or externally, redirect, or respond directly.

pub mod config;
pub mod http;
pub mod middleware;
pub mod observability;

pub use config::AdapterConfig;
pub use http::HttpServer;
pub use middleware::{Middleware, MiddlewareWorker, ModuleLoader, StaticModuleLoader};
