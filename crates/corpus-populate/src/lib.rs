//! Corpus writer.
//!
//! Drives any [`Generator`](corpus_generator::Generator) to write
//! newline-delimited records to files and reports throughput metrics.
//!
//! # Example
//!
//! ```ignore
//! use corpus_core::{Config, Fields};
//! use corpus_generator::JsonGenerator;
//! use corpus_populate::CorpusPopulator;
//!
//! let fields = Fields::from_file("fields.yml")?;
//! let config = Config::from_file("config.yml")?;
//! let generator = JsonGenerator::new(&config, &fields)?;
//!
//! let mut populator = CorpusPopulator::new(generator, 42);
//! let metrics = populator.populate("corpus.ndjson", 100_000)?;
//! println!("Wrote {} records in {:?}", metrics.records_written, metrics.total_duration);
//! ```

pub mod error;
pub mod populator;

pub use error::PopulateError;
pub use populator::{shard_file_name, CorpusPopulator, PopulateMetrics, DEFAULT_BUFFER_SIZE};
