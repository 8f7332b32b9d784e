//! Error types for the evaluation harness.

use thiserror::Error;

/// Errors raised by the harness and contained at its component boundaries.
///
/// `Format` and `Capability` errors are reported and skipped by the run
/// selector; `Execution` errors are isolated per algorithm by the evaluator
/// and recorded as failure projections. `NotSolved` indicates a programmer
/// error (accessor before `solve`) and is expected to fail loudly.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Malformed or incomplete instance description.
    #[error("format error: {0}")]
    Format(String),

    /// An algorithm was asked to handle an instance beyond its declared bound.
    #[error("{algorithm} cannot handle instances with dimension > {max} (got {dimension})")]
    Capability {
        algorithm: String,
        dimension: usize,
        max: usize,
    },

    /// A result accessor was invoked before `solve` completed.
    #[error("algorithm has not been solved yet")]
    NotSolved,

    /// The solver itself raised a fault during solving.
    #[error("algorithm execution failed: {0}")]
    Execution(String),

    /// A tour that is not a permutation of the instance's city indices.
    #[error("invalid tour: {0}")]
    InvalidTour(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}
