//! Preflight checks on a timing matrix before analysis.
//!
//! These checks flag inputs the estimator can process but whose results
//! deserve suspicion. None of them abort the analysis; critical warnings
//! only mark the result as unreliable.
//!
//! - **Shape**: enough blocks for the outlier quantile, more than one iteration
//! - **Resolution**: zero or heavily quantized timings
//! - **Drift**: first half of the iterations vs the second half

mod drift;
mod resolution;
mod shape;

pub use drift::{drift_check, DriftWarning, DRIFT_THRESHOLD};
pub use resolution::{resolution_check, ResolutionWarning};
pub use shape::{shape_check, ShapeWarning};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::types::TimingMatrix;

/// A warning from any preflight check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", content = "warning", rename_all = "snake_case")]
pub enum PreflightWarning {
    /// Matrix dimensions.
    Shape(ShapeWarning),
    /// Timer resolution.
    Resolution(ResolutionWarning),
    /// Drift across iterations.
    Drift(DriftWarning),
}

impl PreflightWarning {
    /// Whether the warning makes the estimate unreliable.
    pub fn is_critical(&self) -> bool {
        match self {
            PreflightWarning::Shape(w) => w.is_critical(),
            PreflightWarning::Resolution(w) => w.is_critical(),
            PreflightWarning::Drift(_) => false,
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> String {
        match self {
            PreflightWarning::Shape(w) => w.description(),
            PreflightWarning::Resolution(w) => w.description(),
            PreflightWarning::Drift(w) => w.description(),
        }
    }
}

impl From<ShapeWarning> for PreflightWarning {
    fn from(w: ShapeWarning) -> Self {
        PreflightWarning::Shape(w)
    }
}

impl From<ResolutionWarning> for PreflightWarning {
    fn from(w: ResolutionWarning) -> Self {
        PreflightWarning::Resolution(w)
    }
}

impl From<DriftWarning> for PreflightWarning {
    fn from(w: DriftWarning) -> Self {
        PreflightWarning::Drift(w)
    }
}

/// Warnings collected for one matrix, in check order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreflightResult {
    /// Every warning raised.
    pub warnings: Vec<PreflightWarning>,
}

impl PreflightResult {
    /// No warnings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning from any check.
    pub fn push(&mut self, warning: impl Into<PreflightWarning>) {
        self.warnings.push(warning.into());
    }

    /// Whether any warning is critical.
    pub fn has_critical(&self) -> bool {
        self.warnings.iter().any(PreflightWarning::is_critical)
    }

    /// Whether the matrix passed without critical warnings.
    pub fn is_valid(&self) -> bool {
        !self.has_critical()
    }

    /// Whether anything was flagged.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Descriptions of every warning, in check order.
    pub fn descriptions(&self) -> Vec<String> {
        self.warnings
            .iter()
            .map(PreflightWarning::description)
            .collect()
    }
}

/// Run the shape, resolution and drift checks on `matrix`.
///
/// Every warning is also logged at `warn` level.
pub fn run_all_checks(matrix: &TimingMatrix, config: &Config) -> PreflightResult {
    let mut result = PreflightResult::new();

    for warning in shape_check(matrix, config.min_blocks) {
        result.push(warning);
    }
    if let Some(warning) = resolution_check(matrix) {
        result.push(warning);
    }
    if let Some(warning) = drift_check(matrix) {
        result.push(warning);
    }

    for warning in &result.warnings {
        tracing::warn!(critical = warning.is_critical(), "{}", warning.description());
    }

    result
}
