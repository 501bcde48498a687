//! Spearman rank correlation.

use super::pearson::pearson_coefficient;
use super::rank::rank_average;
use crate::data::{CorrelationResult, PairedSample};
use crate::error::Result;
use crate::test::{t_statistic, two_tailed_p};
use tracing::debug;

/// Compute Spearman's rho and its two-tailed p-value.
///
/// Both samples are converted to average ranks after paired filtering,
/// then Pearson's r is taken over the ranks. The p-value uses the same
/// t approximation as [`pearsonr`](super::pearsonr).
///
/// # Errors
/// `LengthMismatch` if the inputs differ in length.
pub fn spearmanr(xs: &[Option<f64>], ys: &[Option<f64>]) -> Result<CorrelationResult> {
    let sample = PairedSample::from_nullable(xs, ys)?;
    spearman_sample(&sample)
}

/// Spearman correlation over dense input; NaN entries count as missing.
pub fn spearman_dense(xs: &[f64], ys: &[f64]) -> Result<CorrelationResult> {
    let sample = PairedSample::from_dense(xs, ys)?;
    spearman_sample(&sample)
}

pub(crate) fn spearman_sample(sample: &PairedSample) -> Result<CorrelationResult> {
    if !sample.is_sufficient() {
        debug!(n = sample.len(), "too few paired observations for spearman");
        return Ok(CorrelationResult::undefined());
    }

    let n = sample.len();
    let rho = spearman_coefficient(&sample.x, &sample.y);
    let t = t_statistic(rho, n);
    let pvalue = two_tailed_p(t, (n - 2) as f64)?;

    Ok(CorrelationResult {
        statistic: rho,
        pvalue,
    })
}

pub(crate) fn spearman_coefficient(x: &[f64], y: &[f64]) -> f64 {
    pearson_coefficient(&rank_average(x), &rank_average(y))
}
