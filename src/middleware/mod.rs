//! Middleware hosting subsystem.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → worker.rs (build context, invoke callable)
//!     → [http::directive decides the terminal action]
//!     → worker.rs (execute at most one fetch, merge headers)
//!     → final response
//! ```

pub mod context;
pub mod module;
pub mod worker;

pub use context::{EnvBindings, InvocationContext};
pub use module::{
    BoxError, LoadError, Middleware, MiddlewareFuture, MiddlewareModule, ModuleLoader,
    StaticModuleLoader,
};
pub use worker::MiddlewareWorker;
