//! Per-invocation execution context.
//!
//! # Design Decisions
//! - Environment bindings are threaded through this context instead of a
//!   process-wide slot, so concurrent invocations can never observe each
//!   other's bindings

use std::collections::HashMap;
use std::sync::Arc;

/// Environment bindings (names to secret/config values) visible to the
/// middleware callable.
pub type EnvBindings = HashMap<String, String>;

/// Opaque per-invocation object handed to the middleware callable.
///
/// A fresh context is built for every inbound request; nothing in it
/// outlives the invocation.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    source_page: String,
    env: Arc<EnvBindings>,
}

impl InvocationContext {
    pub(crate) fn new(source_page: String, env: Arc<EnvBindings>) -> Self {
        Self { source_page, env }
    }

    /// Path of the inbound request, recorded at the start of the invocation.
    pub fn source_page(&self) -> &str {
        &self.source_page
    }

    /// Look up one environment binding.
    pub fn env(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(String::as_str)
    }

    /// All bindings, for middleware that wants to iterate.
    pub fn env_bindings(&self) -> &EnvBindings {
        &self.env
    }
}
