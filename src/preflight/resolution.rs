//! Timer resolution check.
//!
//! Timings recorded with a coarse clock collapse onto a few distinct values.
//! The empirical noise CDF then becomes a handful of steps and the quantile
//! of the minimum jumps between them.

use serde::{Deserialize, Serialize};

use crate::types::TimingMatrix;

/// Warning from the resolution check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolutionWarning {
    /// Most cells are exactly zero.
    ///
    /// This is a critical warning - the work is faster than the clock.
    ZeroTimings {
        /// Fraction of cells equal to zero.
        zero_fraction: f64,
    },

    /// Many cells have identical timing values.
    HighQuantization {
        /// Number of distinct values.
        unique_values: usize,
        /// Total number of cells.
        total_cells: usize,
    },
}

impl ResolutionWarning {
    /// Check if this warning indicates a critical issue.
    pub fn is_critical(&self) -> bool {
        matches!(self, ResolutionWarning::ZeroTimings { .. })
    }

    /// Get a human-readable description of the warning.
    pub fn description(&self) -> String {
        match self {
            ResolutionWarning::ZeroTimings { zero_fraction } => format!(
                "CRITICAL: {:.1}% of timings are zero. \
                 The measured work is faster than the clock can resolve.",
                zero_fraction * 100.0
            ),
            ResolutionWarning::HighQuantization {
                unique_values,
                total_cells,
            } => format!(
                "High quantization detected - only {} unique values in {} cells. \
                 Timer resolution may be affecting the noise model.",
                unique_values, total_cells
            ),
        }
    }
}

/// Minimum unique values expected per 1000 cells.
const MIN_UNIQUE_PER_1000: usize = 20;

/// Fraction of zero cells that triggers the critical warning.
const CRITICAL_ZERO_FRACTION: f64 = 0.5;

/// Check how finely the timings are resolved.
pub fn resolution_check(matrix: &TimingMatrix) -> Option<ResolutionWarning> {
    let mut cells: Vec<f64> = matrix.rows().flatten().collect();
    let total_cells = cells.len();
    if total_cells < 100 {
        return None;
    }

    let zeros = cells.iter().filter(|&&t| t == 0.0).count();
    let zero_fraction = zeros as f64 / total_cells as f64;
    if zero_fraction > CRITICAL_ZERO_FRACTION {
        return Some(ResolutionWarning::ZeroTimings { zero_fraction });
    }

    cells.sort_unstable_by(|a, b| a.total_cmp(b));
    cells.dedup();
    let unique_values = cells.len();

    let expected = (total_cells * MIN_UNIQUE_PER_1000 / 1000).max(MIN_UNIQUE_PER_1000);
    if unique_values < expected {
        return Some(ResolutionWarning::HighQuantization {
            unique_values,
            total_cells,
        });
    }
    None
}
