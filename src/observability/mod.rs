//! Observability support
//!
//! Structured logging setup for hosts that do not install their own
//! `tracing` subscriber.

pub mod logging;

pub use logging::{init_default_logging, init_logging, LogFormat};
