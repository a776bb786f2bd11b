//! Unbiased pass@k estimation

use std::collections::BTreeMap;
use std::sync::Arc;

use super::grouped::GroupedResults;

/// A metric computed over grouped results, keyed by metric label
pub type MetricFn = Arc<dyn Fn(&GroupedResults) -> BTreeMap<String, f64> + Send + Sync>;

/// Probability that at least one of `k` samples drawn without replacement
/// from `n` (of which `c` are correct) is correct.
///
/// Computes `1 - C(n-c, k) / C(n, k)` as a sum of logs so large `n` cannot
/// overflow.
pub fn pass_at_k_single(n: usize, c: usize, k: usize) -> f64 {
    if n.saturating_sub(c) < k {
        return 1.0;
    }
    if c == 0 {
        return 0.0;
    }

    let log_ratio: f64 = (0..k)
        .map(|i| ((n - c - i) as f64).ln() - ((n - i) as f64).ln())
        .sum();

    1.0 - log_ratio.exp()
}

/// Mean pass@k over the groups for each requested k.
///
/// A sample is correct when its reward is present and `>= threshold`. Groups
/// with fewer than `k` samples are left out of that k's mean; a k with no
/// eligible group scores 0.0.
pub fn compute_pass_at_k(
    results: &GroupedResults,
    k_values: &[usize],
    threshold: f64,
) -> BTreeMap<usize, f64> {
    let counts: Vec<(usize, usize)> = results
        .iter()
        .map(|(_, group)| {
            let correct = group.iter().filter(|s| s.is_correct(threshold)).count();
            (group.len(), correct)
        })
        .collect();

    k_values
        .iter()
        .map(|&k| {
            let scores: Vec<f64> = counts
                .iter()
                .filter(|(n, _)| *n >= k)
                .map(|&(n, c)| pass_at_k_single(n, c, k))
                .collect();

            let mean = if scores.is_empty() {
                0.0
            } else {
                scores.iter().sum::<f64>() / scores.len() as f64
            };
            (k, mean)
        })
        .collect()
}

/// Same as [`compute_pass_at_k`], keyed by `"pass@{k}"`
pub fn compute_pass_at_k_labeled(
    results: &GroupedResults,
    k_values: &[usize],
    threshold: f64,
) -> BTreeMap<String, f64> {
    compute_pass_at_k(results, k_values, threshold)
        .into_iter()
        .map(|(k, score)| (pass_at_k_label(k), score))
        .collect()
}

pub fn pass_at_k_label(k: usize) -> String {
    format!("pass@{}", k)
}

/// pass@k as a pluggable [`MetricFn`]
pub fn pass_at_k_metric(k_values: Vec<usize>, threshold: f64) -> MetricFn {
    Arc::new(move |results| compute_pass_at_k_labeled(results, &k_values, threshold))
}
