//! Structured logging setup using the tracing crate
//!
//! Handlers emit `tracing` events with contact/record ids and the request id
//! as fields. Hosts usually install their own subscriber; the helpers here
//! cover the ones that do not.
//!
//! ## Environment variables
//!
//! - `LOG_LEVEL`: log level (error, warn, info, debug, trace), default info
//! - `LOG_FORMAT`: output format (json, pretty, compact), default json
//! - `RUST_LOG`: overrides filtering entirely (env_logger syntax)

use std::env;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Machine-readable JSON, the production default.
    #[default]
    Json,
    /// Human-readable multi-line output for development.
    Pretty,
    /// Single-line colored output for terminals.
    Compact,
}

impl LogFormat {
    fn from_env() -> Self {
        match env::var("LOG_FORMAT").unwrap_or_default().to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Json,
        }
    }
}

fn level_from_env() -> Level {
    env::var("LOG_LEVEL")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(Level::INFO)
}

/// Install a subscriber configured from environment variables.
pub fn init_default_logging() {
    init_logging(level_from_env(), LogFormat::from_env());
}

/// Install a subscriber with an explicit level and format. `RUST_LOG`, when
/// set, takes over filtering; otherwise HTTP-stack noise is capped at warn.
pub fn init_logging(level: Level, format: LogFormat) {
    let filter = env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},hyper=warn,reqwest=warn,tokio=warn")));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_is_json() {
        assert_eq!(LogFormat::default(), LogFormat::Json);
    }

    #[test]
    fn test_format_from_env() {
        env::set_var("LOG_FORMAT", "PRETTY");
        assert_eq!(LogFormat::from_env(), LogFormat::Pretty);

        env::set_var("LOG_FORMAT", "compact");
        assert_eq!(LogFormat::from_env(), LogFormat::Compact);

        env::set_var("LOG_FORMAT", "xml");
        assert_eq!(LogFormat::from_env(), LogFormat::Json);

        env::remove_var("LOG_FORMAT");
        assert_eq!(LogFormat::from_env(), LogFormat::Json);
    }

    #[test]
    fn test_level_from_env_defaults_to_info() {
        env::set_var("LOG_LEVEL", "debug");
        assert_eq!(level_from_env(), Level::DEBUG);

        env::set_var("LOG_LEVEL", "shouting");
        assert_eq!(level_from_env(), Level::INFO);

        env::remove_var("LOG_LEVEL");
        assert_eq!(level_from_env(), Level::INFO);
    }
}
