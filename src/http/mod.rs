//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers, request ID)
//!     → [middleware::worker invokes the hosted callable]
//!     → directive.rs (decide terminal action, strip reserved headers)
//!     → headers.rs / params.rs (merge semantics)
//!     → client.rs (outbound fetch when the action requires one)
//!     → Send to client
//! ```

pub mod client;
pub mod directive;
pub mod headers;
pub mod params;
pub mod request;
pub mod server;

pub use client::{FetchError, Fetcher, HttpFetcher};
pub use directive::RouteAction;
pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
