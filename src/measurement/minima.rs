//! Per-block minimum times.

use crate::error::{EstimateError, Result};
use crate::types::{BlockMinima, TimingMatrix};

/// Minimum observed time of every block.
///
/// Noise only ever adds time, so the minimum over iterations is the
/// least-contaminated estimate of a block's true time.
pub fn extract_minima(matrix: &TimingMatrix) -> Result<BlockMinima> {
    if matrix.num_blocks() == 0 || matrix.num_iters() == 0 {
        return Err(EstimateError::EmptyInput {
            what: "matrix has no cells",
        });
    }
    Ok(BlockMinima(
        matrix
            .rows()
            .map(|row| row.into_iter().fold(f64::INFINITY, f64::min))
            .collect(),
    ))
}
