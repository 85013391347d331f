//! Measurement model: what is signal and what is noise in a timing matrix.
//!
//! This module provides:
//! - Outlier classification of fast blocks and slow iterations
//! - Per-block minimum extraction
//! - The empirical noise sample of excesses over block minima

mod minima;
mod noise;
mod outlier;

pub use minima::extract_minima;
pub use noise::{mean_excess, sample_noise, sample_noise_filtered, NoiseCounts};
pub use outlier::{
    classify_blocks, classify_iterations, slow_iterations, split_blocks, OutlierStats,
};
