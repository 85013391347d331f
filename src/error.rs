//! Error taxonomy for the estimation pipeline.
//!
//! Every error stops the current analysis. Inputs are deterministic in-memory
//! data, so nothing is retried; each variant carries the values that explain
//! which heuristic or invariant failed.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EstimateError>;

/// Failure of one analysis step.
#[derive(Debug, Error)]
pub enum EstimateError {
    /// No blocks, no iterations, or too few paired blocks.
    #[error("empty input: {what}")]
    EmptyInput {
        /// What was found empty.
        what: &'static str,
    },

    /// The fast-block heuristic does not fit this dataset.
    ///
    /// More than the configured fraction of blocks fall below the outlier
    /// threshold; adjust the outlier factor rather than trusting the estimate.
    #[error(
        "unexpected distribution: {quantile_p} quantile of block minima ({quantile:.4}) \
         is not above the outlier threshold ({threshold:.4} = {factor} x mean)"
    )]
    Distribution {
        /// Probability of the checked quantile.
        quantile_p: f64,
        /// Value of that quantile of the block minima.
        quantile: f64,
        /// The outlier threshold it had to exceed.
        threshold: f64,
        /// Factor applied to the mean of the minima.
        factor: f64,
    },

    /// The noise sample has no values.
    #[error("noise sample is empty; need at least one cell above its block minimum")]
    EmptySample,

    /// The noise sample range cannot be bisected.
    #[error("noise sample range [{min}, {max}] is not finite")]
    DegenerateRange {
        /// Smallest value in the sample.
        min: f64,
        /// Largest value in the sample.
        max: f64,
    },

    /// Paired comparison over block sets of different size.
    #[error("misaligned input: before has {before} blocks, after has {after}")]
    MisalignedInput {
        /// Blocks in the `before` dataset.
        before: usize,
        /// Blocks in the `after` dataset.
        after: usize,
    },

    /// A computed result broke an invariant (NaN, negative bound, ...).
    #[error("invariant violated: {what} (value: {value})")]
    InvariantViolation {
        /// Which invariant.
        what: &'static str,
        /// The offending value.
        value: f64,
    },

    /// A parameter or config value is outside its domain.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
        /// Expected domain.
        reason: &'static str,
    },

    /// Rows of unequal length.
    #[error("ragged matrix: row {row} has {found} values, expected {expected}")]
    Ragged {
        /// Zero-based row index.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of this row.
        found: usize,
    },

    /// A timing that is negative or not finite.
    #[error("invalid timing {value} at block {row}, iteration {column}")]
    NegativeTiming {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        column: usize,
        /// The value found.
        value: f64,
    },

    /// A token in a matrix file is not a number.
    #[error("line {line}, column {column}: cannot parse {token:?} as a timing")]
    Parse {
        /// One-based line number.
        line: usize,
        /// One-based column number.
        column: usize,
        /// Offending token.
        token: String,
    },

    /// Reading a matrix file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl EstimateError {
    /// Shorthand for [`EstimateError::InvalidParameter`].
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        EstimateError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}
