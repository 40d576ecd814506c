//! Observability subsystem.

pub mod metrics;
