//! Error types for the corpus writer.

use corpus_generator::GeneratorError;
use thiserror::Error;

/// Errors that can occur while writing a corpus.
#[derive(Error, Debug)]
pub enum PopulateError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record generation failed.
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// A shard worker panicked.
    #[error("Shard {0} worker panicked")]
    WorkerPanicked(usize),

    /// Sharded writing needs at least one shard.
    #[error("Invalid shard count: {0}")]
    InvalidShardCount(usize),
}
