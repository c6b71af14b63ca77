//! Synthetic record generator for corpus-gen.
//!
//! A field schema plus an optional per-field configuration is compiled once
//! into a list of bound fields. Each bound field appends its fragment for one
//! record to a byte buffer; assemblers stitch fragments into JSON objects,
//! `{{.Field}}` templates, or hand them to an external template engine.
//!
//! # Architecture
//!
//! ```text
//! Fields + Config (YAML)
//!        │
//!        ▼
//! ┌─────────────────────────┐
//! │  binder                 │
//! │   type → provider       │
//! │   + CardinalityField    │
//! │   + DynamicField        │
//! └────────────┬────────────┘
//!              │ Vec<Box<dyn BoundField>>
//!              ▼
//!   JsonGenerator | TemplateGenerator | EngineGenerator<JinjaEngine>
//!              │
//!              ▼  emit(&mut GenState, &mut Vec<u8>)
//!          byte sink
//! ```
//!
//! Generators are immutable after construction. All mutable state (record
//! counter, per-field memory, RNG) lives in a [`GenState`] owned by the
//! caller, so one generator can serve several threads that each own a state.
//!
//! # Example
//!
//! ```rust
//! use corpus_core::{Config, Fields};
//! use corpus_generator::{GenState, Generator, JsonGenerator};
//!
//! let fields = Fields::from_yaml(r#"
//! - name: SrcAddr
//!   type: ip
//! - name: Bytes
//!   type: long
//! "#).unwrap();
//! let config = Config::from_yaml(r#"
//! - name: Bytes
//!   range: 5000
//!   fuzziness: 10
//! "#).unwrap();
//!
//! let generator = JsonGenerator::new(&config, &fields).unwrap();
//! let mut state = GenState::with_seed(42);
//! let mut buf = Vec::new();
//! generator.emit(&mut state, &mut buf).unwrap();
//! println!("{}", String::from_utf8_lossy(&buf));
//! ```
//!
//! # Field types
//!
//! - `date` - timestamp within the last hour
//! - `ip` - dotted IPv4 address
//! - `long`, `integer`, `unsigned_long` - integer in `[0, range)`
//! - `double`, `float`, `half_float`, `scaled_float` - float with six decimals
//! - `keyword`, `wildcard` - configured enum value, or nouns shaped like the example
//! - `constant_keyword` - one token for the lifetime of the state
//! - `boolean`, `geo_point`
//! - `object`, `nested`, `flattened` - value typed by `object_type`
//! - anything else - free text

pub mod binder;
pub mod cardinality;
pub mod dynamic;
pub mod engine;
pub mod error;
mod fuzziness;
pub mod generator;
pub mod jinja;
pub mod providers;
pub mod state;
pub mod template;

// Re-exports for convenience
pub use binder::{bind, bind_all, BoundField, RenderMode};
pub use engine::{EngineGenerator, FieldSource, SharedFieldSource, TemplateEngine};
pub use error::GeneratorError;
pub use generator::{Generator, JsonGenerator};
pub use jinja::JinjaEngine;
pub use state::{CachedValue, GenState, RecordKeys};
pub use template::{parse_template, ParsedTemplate, Placeholder, TemplateGenerator};
