//! Core types for the corpus generator.
//!
//! This crate provides the inputs every generator is compiled from:
//!
//! - [`Field`] / [`Fields`] - the field schema (name, semantic type, optional example)
//! - [`FieldType`] - the semantic types a field can carry
//! - [`ConfigField`] / [`Config`] - per-field generation settings loaded from YAML
//!
//! # Architecture
//!
//! ```text
//! corpus-core (this crate)
//!    │
//!    ├─── corpus-generator  (binds fields + config into emitters)
//!    │
//!    └─── corpus-populate   (writes generated records to files)
//! ```
//!
//! # Example
//!
//! ```rust
//! use corpus_core::{Config, Fields};
//!
//! let fields = Fields::from_yaml(r#"
//! - name: SrcPort
//!   type: long
//! - name: Action
//!   type: keyword
//! "#).unwrap();
//!
//! let config = Config::from_yaml(r#"
//! - name: SrcPort
//!   range: 65535
//! - name: Action
//!   enum: ["ACCEPT", "REJECT"]
//! "#).unwrap();
//!
//! assert_eq!(fields.len(), 2);
//! assert_eq!(config.get_field("SrcPort").and_then(|f| f.range), Some(65535));
//! ```

pub mod config;
pub mod fields;

use thiserror::Error;

// Re-exports for convenience
pub use config::{Config, ConfigField};
pub use fields::{Field, FieldType, Fields};

/// Error type for loading and validating fields and configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Error reading a fields or config file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Cardinality of zero cannot be turned into a distinct-value target
    #[error("Field '{field}': cardinality must be at least 1")]
    InvalidCardinality { field: String },

    /// Fuzziness is a percentage
    #[error("Field '{field}': fuzziness {value} is outside 0-100")]
    InvalidFuzziness { field: String, value: u32 },

    /// Range is the exclusive upper bound of a draw starting at zero
    #[error("Field '{field}': range must be positive, got {value}")]
    InvalidRange { field: String, value: i64 },
}
