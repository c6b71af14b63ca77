//! corpus-gen
//!
//! Generates synthetic telemetry and log records from a field schema and an
//! optional per-field configuration, for testing ingestion pipelines.
//!
//! # Crates
//!
//! - [`corpus_core`] - field schema, generation config, YAML loading
//! - [`corpus_generator`] - field binding, value providers, JSON and template assemblers
//! - [`corpus_populate`] - newline-delimited corpus files with throughput metrics
//!
//! # Output formats
//!
//! - JSON: one flat object per record, fields in schema order
//!   ([`JsonGenerator`])
//! - `{{.Field}}` templates: literal text with placeholders filled by raw values
//!   ([`TemplateGenerator`])
//! - Jinja templates calling `generate("Field")` ([`JinjaEngine`] behind
//!   [`EngineGenerator`])
//! - Other engines: a caller-supplied [`TemplateEngine`] pulling values
//!   through [`FieldSource::generate`]
//!
//! # Example
//!
//! ```rust
//! use corpus_gen::{Config, Fields, GenState, Generator, TemplateGenerator};
//!
//! let fields = Fields::from_yaml(r#"
//! - name: SrcAddr
//!   type: ip
//! - name: Action
//!   type: keyword
//! "#).unwrap();
//! let config = Config::from_yaml(r#"
//! - name: Action
//!   enum: ["ACCEPT", "REJECT", "NONE"]
//! "#).unwrap();
//!
//! let generator = TemplateGenerator::new(b"{{.SrcAddr}} {{.Action}}", &config, &fields).unwrap();
//! let mut state = GenState::with_seed(42);
//! let mut buf = Vec::new();
//! generator.emit(&mut state, &mut buf).unwrap();
//! assert!(buf.ends_with(b"ACCEPT") || buf.ends_with(b"REJECT"));
//! ```

pub use corpus_core::{Config, ConfigError, ConfigField, Field, FieldType, Fields};
pub use corpus_generator::{
    CachedValue, EngineGenerator, FieldSource, GenState, Generator, GeneratorError, JinjaEngine,
    JsonGenerator, TemplateEngine, TemplateGenerator,
};
pub use corpus_populate::{CorpusPopulator, PopulateError, PopulateMetrics};
