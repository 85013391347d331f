//! # timing-estimate
//!
//! Estimate the true time of a benchmarked workload from noisy repeated
//! timings, and test whether a change made it faster or slower.
//!
//! Input is a matrix of timings: one row per block (a unit of work, e.g. a
//! decoded audio block), one column per iteration (a repeated measurement of
//! every block). The pipeline outputs:
//! - A point estimate of the mean true block time with a confidence interval
//! - A one-sided lower bound on that mean
//! - The empirical noise sample and its summary statistics
//! - For before/after pairs: a paired t-test and an exact sign test
//!
//! ## How It Works
//!
//! Noise only ever adds time. The minimum of each block over its iterations
//! is therefore the cleanest measurement of that block, but it still carries
//! the minimum of `n` noise draws. The excess of every other cell over its
//! block minimum gives an empirical sample of the noise; from it, the
//! quantile of the minimum of `n` draws bounds the residual noise left in
//! the minima.
//!
//! Blocks that are far faster than the rest (silence, empty frames) are
//! excluded from the estimate, and iterations that are globally slow are
//! excluded from the noise model.
//!
//! ## Quick Start
//!
//! ```ignore
//! use timing_estimate::{Estimator, input::load_matrix};
//!
//! let matrix = load_matrix("bench.txt")?;
//! let summary = Estimator::new().analyze(&matrix)?;
//! println!(
//!     "{:.2} ns +- {:.2} ns",
//!     summary.estimate.center, summary.estimate.half_width
//! );
//!
//! let after = load_matrix("bench-after.txt")?;
//! let cmp = Estimator::new().compare(&matrix, &after)?;
//! println!("t-test p = {:.3}, sign test p = {:.3}",
//!     cmp.paired.p_value_ttest, cmp.paired.p_value_sign);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod error;
mod estimator;
mod result;
mod types;

// Functional modules
pub mod analysis;
pub mod cli;
pub mod helpers;
pub mod input;
pub mod measurement;
pub mod output;
pub mod preflight;
pub mod statistics;
pub mod thread_pool;

// Re-exports for public API
pub use analysis::{Estimate, PairedComparison};
pub use config::Config;
pub use error::{EstimateError, Result};
pub use estimator::Estimator;
pub use result::{Comparison, Diagnostics, NoiseStats, Precision, Summary};
pub use types::{BlockMinima, NoiseSample, TimingMatrix};

// Re-export helpers for convenience
pub use helpers::SyntheticBenchmark;

/// Analyze a timing matrix with the default configuration.
///
/// Shorthand for `Estimator::new().analyze(matrix)`.
pub fn analyze(matrix: &TimingMatrix) -> Result<Summary> {
    Estimator::new().analyze(matrix)
}

/// Compare two timing matrices over the same blocks with the default
/// configuration.
pub fn compare(before: &TimingMatrix, after: &TimingMatrix) -> Result<Comparison> {
    Estimator::new().compare(before, after)
}
