//! Calibration tests to verify statistical properties.
//!
//! These tests use `Estimator::quick()` on small synthetic benchmarks so many
//! trials fit in a normal test run.

use timing_estimate::{Estimator, SyntheticBenchmark};

fn bench() -> SyntheticBenchmark {
    SyntheticBenchmark::new(600, 10).true_range(40.0, 61.0)
}

/// Verify the paired tests' false positive rate is bounded.
///
/// Measure the same true times twice and check the rejection rate stays
/// near alpha.
#[test]
fn paired_tests_fpr_calibration() {
    const TRIALS: usize = 100;
    const ALPHA: f64 = 0.05;

    let bench = bench();
    let estimator = Estimator::quick();

    let mut ttest_rejections = 0;
    let mut sign_rejections = 0;

    for trial in 0..TRIALS as u64 {
        // Null hypothesis: nothing changed between the two runs
        let times = bench.true_times(trial);
        let before = bench.measure(&times, 1_000 + 2 * trial).unwrap();
        let after = bench.measure(&times, 1_001 + 2 * trial).unwrap();

        let cmp = estimator.compare(&before, &after).unwrap();
        if cmp.paired.p_value_ttest < ALPHA {
            ttest_rejections += 1;
        }
        if cmp.paired.p_value_sign < ALPHA {
            sign_rejections += 1;
        }
    }

    for (name, rejections) in [("t-test", ttest_rejections), ("sign test", sign_rejections)] {
        let rate = rejections as f64 / TRIALS as f64;
        assert!(
            rate <= 3.0 * ALPHA,
            "{} FPR {} exceeds 3*alpha={}",
            name,
            rate,
            3.0 * ALPHA
        );
    }
}

/// Verify the paired tests detect a 1% slowdown.
#[test]
fn paired_tests_power() {
    const TRIALS: usize = 20;

    let bench = bench();
    let estimator = Estimator::quick();
    let mut detections = 0;

    for trial in 0..TRIALS as u64 {
        let times = bench.true_times(trial);
        let slower: Vec<f64> = times.iter().map(|t| t * 1.01).collect();
        let before = bench.measure(&times, 5_000 + trial).unwrap();
        let after = bench.measure(&slower, 6_000 + trial).unwrap();

        let cmp = estimator.compare(&before, &after).unwrap();
        if cmp.paired.p_value_ttest < 0.01 && cmp.paired.mean > 0.0 {
            detections += 1;
        }
    }

    assert_eq!(detections, TRIALS, "missed a 1% slowdown");
}

/// Verify the one-sided bound never overshoots the true mean.
#[test]
fn lower_bound_coverage() {
    const TRIALS: usize = 50;

    let bench = bench();
    let estimator = Estimator::quick();
    let mut misses = 0;

    for trial in 0..TRIALS as u64 {
        let times = bench.true_times(trial);
        let actual = times.iter().sum::<f64>() / times.len() as f64;
        let summary = estimator
            .analyze(&bench.measure(&times, 9_000 + trial).unwrap())
            .unwrap();

        if summary.one_sided_lower_bound > actual {
            misses += 1;
        }
    }

    let miss_rate = misses as f64 / TRIALS as f64;
    assert!(miss_rate <= 0.05, "bound exceeded true mean in {} trials", misses);
}
