//! Analysis of the measurement model.
//!
//! This module turns block minima and the noise sample into results:
//!
//! 1. **Interval** ([`interval`]): point estimate and one-sided bound from the
//!    filtered minima and the noise-of-minimum quantile
//! 2. **Comparison** ([`compare`]): paired t-test and sign test on block minima
//! 3. **Fits** ([`fit`]): exponential, Erlang and log-normal models of the
//!    noise, plus the exponential-noise interval (diagnostic only)
//! 4. **Diagnostics** ([`diagnostics`]): reliability checks on the result

mod compare;
mod diagnostics;
mod fit;
mod interval;

pub use compare::{compare, one_sample_t_test, sign_test, PairedComparison};
pub use diagnostics::{
    compute_diagnostics, MAX_FIT_KS, MAX_RELATIVE_HALF_WIDTH, MIN_NOISE_FRACTION,
};
pub use fit::{
    exponential_interval, fit_all, fit_erlang, fit_exponential, fit_log_normal, FitReport, Fits,
    NoiseModel, ShapeSearch, MAX_ERLANG_SHAPE,
};
pub use interval::{build_interval, Estimate};
