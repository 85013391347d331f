//! Matrix shape check.
//!
//! The fast-block test looks at the 0.2% quantile of the block minima, which
//! only means something with several hundred blocks. A single iteration per
//! block leaves no excess over the minimum, so no noise can be observed.

use serde::{Deserialize, Serialize};

use crate::types::TimingMatrix;

/// Warning from the shape check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeWarning {
    /// Fewer blocks than recommended for the outlier quantile.
    FewBlocks {
        /// Blocks in the matrix.
        available: usize,
        /// Recommended minimum.
        recommended: usize,
    },

    /// Only one iteration per block.
    ///
    /// This is a critical warning - the noise sample will be empty.
    SingleIteration,
}

impl ShapeWarning {
    /// Check if this warning indicates a critical issue.
    pub fn is_critical(&self) -> bool {
        matches!(self, ShapeWarning::SingleIteration)
    }

    /// Get a human-readable description of the warning.
    pub fn description(&self) -> String {
        match self {
            ShapeWarning::FewBlocks {
                available,
                recommended,
            } => format!(
                "Only {} blocks (recommended: at least {}). \
                 The outlier quantile check is weak on small inputs.",
                available, recommended
            ),
            ShapeWarning::SingleIteration => "CRITICAL: One iteration per block. \
                 Noise cannot be observed without repeated measurements."
                .to_string(),
        }
    }
}

/// Check the matrix dimensions.
pub fn shape_check(matrix: &TimingMatrix, min_blocks: usize) -> Vec<ShapeWarning> {
    let mut warnings = Vec::new();
    if matrix.num_blocks() < min_blocks {
        warnings.push(ShapeWarning::FewBlocks {
            available: matrix.num_blocks(),
            recommended: min_blocks,
        });
    }
    if matrix.num_iters() == 1 {
        warnings.push(ShapeWarning::SingleIteration);
    }
    warnings
}
