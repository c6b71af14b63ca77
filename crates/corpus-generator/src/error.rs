//! Error types for binding fields and emitting records.

use corpus_core::ConfigError;
use thiserror::Error;

/// Errors that can occur while compiling or running a generator.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// Invalid field configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A configured static value cannot be rendered as JSON.
    #[error("Failed to serialize static value for field '{field}': {source}")]
    StaticValue {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A dynamic field's inner emitter wrote something other than its own key.
    #[error("Malformed dynamic field payload: {0}")]
    MalformedDynamicPayload(String),

    /// A template or engine asked for a field that was never bound.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Template could not be parsed.
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    /// Failure reported by an external template engine.
    #[error("Template engine error: {0}")]
    Engine(String),

    /// IO error while formatting into the sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
