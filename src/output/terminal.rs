//! Terminal output formatting with colors and box drawing.

use colored::Colorize;

use crate::result::{Comparison, Precision, Summary};

/// Significance level used to color p-values.
const ALPHA: f64 = 0.05;

/// Format a Summary for human-readable terminal output.
pub fn format_summary(summary: &Summary) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("timing-estimate\n");
    output.push_str(&sep);
    output.push('\n');
    output.push('\n');

    output.push_str(&format!(
        "  Blocks: {}   Iterations: {}\n",
        summary.num_blocks, summary.num_iters
    ));
    output.push_str(&format!(
        "  Precision: {}\n\n",
        format_precision(summary.precision())
    ));

    let est = &summary.estimate;
    output.push_str(&format!(
        "  {}\n",
        format!(
            "Estimate: {:.3} \u{00B1} {:.3} ns",
            est.center, est.half_width
        )
        .bold()
    ));
    output.push_str(&format!(
        "    Interval:            [{:.3}, {:.3}] ns\n",
        est.lower(),
        est.upper()
    ));
    output.push_str(&format!(
        "    One-sided bound:     >= {:.3} ns ({:.0}%)\n",
        summary.one_sided_lower_bound,
        summary.confidence * 100.0
    ));
    output.push_str(&format!(
        "    Noise of minimum:    {:.3} ns\n",
        summary.noise_quantile
    ));
    output.push('\n');

    output.push_str(&format!(
        "    Time per sample:     {:.3} ns (all blocks)\n",
        summary.mean_of_minima
    ));
    output.push_str(&format!(
        "    Mean of block means: {:.3} ns (above threshold)\n",
        summary.filtered_block_mean
    ));
    if let Some((lo, hi)) = summary.exponential_interval {
        output.push_str(&format!(
            "    Exponential model:   [{:.3}, {:.3}] ns\n",
            lo, hi
        ));
    }
    output.push('\n');

    let o = &summary.outliers;
    output.push_str(&format!(
        "    Fast blocks:         {} ({:.2}%, threshold {:.3} ns)\n",
        o.fast_blocks.len(),
        o.fast_fraction * 100.0,
        o.block_threshold
    ));
    output.push_str(&format!(
        "    Slow iterations:     {} of {}\n",
        o.slow_iterations.len(),
        summary.num_iters
    ));
    output.push_str(&format!(
        "    Noise sample:        {} cells ({:.1}% of data left), mean {:.3}, median {:.3}, max {:.3}\n",
        summary.noise.count,
        o.noise_fraction() * 100.0,
        summary.noise.mean,
        summary.noise.median,
        summary.noise.max
    ));
    if o.extreme_cells > 0 {
        output.push_str(&format!(
            "    Extreme noise:       {} cells dropped\n",
            o.extreme_cells
        ));
    }

    if let Some(fits) = &summary.fits {
        output.push('\n');
        output.push_str("    Noise fits (KS distance):\n");
        for report in [&fits.exponential, &fits.erlang, &fits.log_normal] {
            output.push_str(&format!(
                "      {:<12} {:.4}\n",
                report.model.name(),
                report.ks_distance
            ));
        }
    }

    let warnings: Vec<String> = summary
        .preflight
        .descriptions()
        .into_iter()
        .chain(summary.diagnostics.warnings.iter().cloned())
        .collect();
    if !warnings.is_empty() {
        output.push('\n');
        for warning in &warnings {
            output.push_str(&format!("  {} {}\n", "\u{26A0}".yellow().bold(), warning));
        }
    }

    output.push('\n');
    output.push_str(&sep);
    output.push('\n');
    output
}

/// Format a Comparison for human-readable terminal output.
pub fn format_comparison(comparison: &Comparison) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);
    let before = &comparison.before.estimate;
    let after = &comparison.after.estimate;
    let paired = &comparison.paired;

    output.push_str("timing-estimate compare\n");
    output.push_str(&sep);
    output.push('\n');
    output.push('\n');

    output.push_str(&format!(
        "  Before: {:.3} \u{00B1} {:.3} ns\n",
        before.center, before.half_width
    ));
    output.push_str(&format!(
        "  After:  {:.3} \u{00B1} {:.3} ns\n\n",
        after.center, after.half_width
    ));

    output.push_str(&format!(
        "    Mean delta:      {:+.3} ns ({:+.2}%)\n",
        paired.mean,
        comparison.relative_change * 100.0
    ));
    output.push_str(&format!("    Std of deltas:   {:.3} ns\n", paired.std));
    output.push_str(&format!(
        "    Faster blocks:   {} of {} ({:.1}%)\n",
        paired.num_negative,
        paired.deltas.len(),
        paired.negative_fraction * 100.0
    ));
    output.push_str(&format!(
        "    t-test:          t = {:.3}, p = {}\n",
        paired.t_statistic,
        format_p_value(paired.p_value_ttest)
    ));
    output.push_str(&format!(
        "    Sign test:       p = {}\n",
        format_p_value(paired.p_value_sign)
    ));

    output.push('\n');
    output.push_str(&sep);
    output.push('\n');
    output
}

fn format_precision(precision: Precision) -> String {
    match precision {
        Precision::Excellent => "Excellent".green().to_string(),
        Precision::Good => "Good".green().to_string(),
        Precision::Poor => "Poor".yellow().to_string(),
        Precision::TooNoisy => "Too Noisy".red().to_string(),
    }
}

fn format_p_value(p: f64) -> String {
    let text = if p < 1e-4 {
        format!("{:.2e}", p)
    } else {
        format!("{:.4}", p)
    };
    if p < ALPHA {
        text.red().bold().to_string()
    } else {
        text.green().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::SyntheticBenchmark;
    use crate::Estimator;

    fn bench() -> SyntheticBenchmark {
        SyntheticBenchmark::new(600, 10).true_range(40.0, 61.0)
    }

    #[test]
    fn test_format_summary() {
        let matrix = bench().generate(1).unwrap();
        let summary = Estimator::new().analyze(&matrix).unwrap();
        let output = format_summary(&summary);
        assert!(output.contains("timing-estimate"));
        assert!(output.contains("Blocks: 600"));
        assert!(output.contains("Noise fits"));
        assert!(output.contains("erlang"));
    }

    #[test]
    fn test_format_comparison() {
        let b = bench();
        let times = b.true_times(1);
        let before = b.measure(&times, 2).unwrap();
        let after = b.measure(&times, 3).unwrap();
        let cmp = Estimator::quick().compare(&before, &after).unwrap();
        let output = format_comparison(&cmp);
        assert!(output.contains("Mean delta"));
        assert!(output.contains("Sign test"));
        assert!(output.contains("of 600"));
    }
}
