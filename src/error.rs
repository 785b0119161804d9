//! Error types for the segmentation pipeline

use thiserror::Error;

/// Result alias used by every fallible operation of the library
pub type Result<T> = std::result::Result<T, SegmentationError>;

/// An error when a set of hyperparameters fails validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("n_clusters must be at least 1")]
    NClusters,
    #[error("n_runs cannot be 0")]
    NRuns,
    #[error("tolerance must be greater than 0")]
    Tolerance,
    #[error("max_n_iterations cannot be 0")]
    MaxIterations,
    #[error("smallest candidate count must be at least 2, got {0}")]
    MinCandidate(usize),
    #[error("candidate range {min}..={max} is empty")]
    EmptyCandidateRange { min: usize, max: usize },
}

/// Every way a segmentation run can fail. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum SegmentationError {
    /// Input columns are missing, duplicated, unexpected or unparsable
    #[error("schema mismatch: {0}")]
    Schema(String),
    /// Degenerate values, e.g. a constant column or a non-finite cell
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Fewer records than an operation needs
    #[error("insufficient data: {records} records available, {required} required")]
    InsufficientData { records: usize, required: usize },
    /// None of the candidate group counts could be evaluated
    #[error("no valid candidate: none of k in {min}..={max} is evaluable with {records} records")]
    NoValidCandidate {
        min: usize,
        max: usize,
        records: usize,
    },
    /// Strict convergence was requested and the iteration cap was hit
    #[error("k-means with k = {k} did not converge within {iterations} iterations")]
    Convergence { k: usize, iterations: u64 },
    #[error("invalid hyperparameter: {0}")]
    InvalidParams(#[from] ParamsError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
