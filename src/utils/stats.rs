//! Basic statistics for indicator summaries and interval estimates.

/// Normal quantile for a two-sided 95% interval
const Z_95: f64 = 1.959_963_984_540_054;

/// Computes the arithmetic mean of a slice of values. Returns `None` for
/// empty input.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Computes the sample standard deviation (n - 1 denominator). Returns
/// `None` when fewer than two values are given.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Wilson score interval for a binomial proportion at the 95% level.
///
/// # Arguments
/// * `count` - Number of successes
/// * `total` - Number of trials
///
/// # Returns
/// The `(lower, upper)` interval bounds. A non-positive `total` yields
/// `(0.0, 0.0)`.
#[must_use]
pub fn wilson_score_interval(count: f64, total: f64) -> (f64, f64) {
    if total <= 0.0 {
        return (0.0, 0.0);
    }

    let p = count / total;
    let z_sq = Z_95 * Z_95;
    let denominator = 1.0 + z_sq / total;
    let center = (p + z_sq / (2.0 * total)) / denominator;
    let half_width =
        Z_95 * (p * (1.0 - p) / total + z_sq / (4.0 * total * total)).sqrt() / denominator;

    (center - half_width, center + half_width)
}
