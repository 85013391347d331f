//! Statistical building blocks for timing estimation.
//!
//! This module provides the numeric infrastructure the pipeline is built on:
//! - Quantiles (R-7) and moments of timing series
//! - Empirical CDF and the quantile of the minimum of n draws

mod ecdf;
mod quantile;

pub use ecdf::{quantile_of_min, EmpiricalCdf, BISECTION_ITERATIONS};
pub use quantile::{compute_quantile, max_of, mean, median, min_of, quantile, sample_std};
