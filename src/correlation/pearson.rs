//! Pearson product-moment correlation.

use crate::data::{CorrelationResult, PairedSample};
use crate::error::Result;
use crate::test::{t_statistic, two_tailed_p};
use tracing::debug;

/// Compute Pearson's r and its two-tailed p-value.
///
/// Only indices where both values are finite are used. With fewer than
/// three such pairs the result is NaN in both fields.
///
/// The p-value comes from t = r·√(n-2) / √(1-r²) at n-2 degrees of
/// freedom. Zero-variance input yields NaN and r = ±1 yields p = 0.
///
/// # Errors
/// `LengthMismatch` if the inputs differ in length.
pub fn pearsonr(xs: &[Option<f64>], ys: &[Option<f64>]) -> Result<CorrelationResult> {
    let sample = PairedSample::from_nullable(xs, ys)?;
    pearson_sample(&sample)
}

/// Pearson correlation over dense input; NaN entries count as missing.
pub fn pearson_dense(xs: &[f64], ys: &[f64]) -> Result<CorrelationResult> {
    let sample = PairedSample::from_dense(xs, ys)?;
    pearson_sample(&sample)
}

pub(crate) fn pearson_sample(sample: &PairedSample) -> Result<CorrelationResult> {
    if !sample.is_sufficient() {
        debug!(n = sample.len(), "too few paired observations for pearson");
        return Ok(CorrelationResult::undefined());
    }

    let n = sample.len();
    let r = pearson_coefficient(&sample.x, &sample.y);
    let t = t_statistic(r, n);
    let pvalue = two_tailed_p(t, (n - 2) as f64)?;

    Ok(CorrelationResult {
        statistic: r,
        pvalue,
    })
}

/// Sample correlation coefficient of two equal-length slices.
///
/// Rounding can push the quotient just past ±1, so it is clamped back into
/// range. NaN passes through.
pub(crate) fn pearson_coefficient(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatsError;
    use approx::assert_relative_eq;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn test_pearson_perfect_linear() {
        let result = pearsonr(&some(&[1.0, 2.0, 3.0, 4.0, 5.0]), &some(&[2.0, 4.0, 6.0, 8.0, 10.0]))
            .unwrap();
        assert_relative_eq!(result.statistic, 1.0, epsilon = 1e-12);
        assert!(result.pvalue < 1e-10);
    }

    #[test]
    fn test_pearson_exact_one_gives_zero_pvalue() {
        // r is exactly 1 here, so t is infinite
        let result = pearson_dense(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(result.statistic, 1.0);
        assert_eq!(result.pvalue, 0.0);

        let result = pearson_dense(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert_eq!(result.statistic, -1.0);
        assert_eq!(result.pvalue, 0.0);
    }

    #[test]
    fn test_pearson_scaled_copy_stays_in_range() {
        // the unclamped quotient here is -1.0000000000000002
        let x = [
            -53.59668955190875,
            -67.49912222075159,
            -42.9049575127717,
            51.309825058012876,
            46.52965345297514,
            -24.485204796432456,
            -11.767504244774088,
            -97.2185765273361,
        ];
        let k = -84.35080304376612;
        let y: Vec<f64> = x.iter().map(|v| k * v).collect();

        let result = pearson_dense(&x, &y).unwrap();
        assert_eq!(result.statistic, -1.0);
        assert_eq!(result.pvalue, 0.0);

        let result = crate::correlation::spearman_dense(&x, &y).unwrap();
        assert_eq!(result.statistic, -1.0);
        assert_eq!(result.pvalue, 0.0);
    }

    #[test]
    fn test_coefficient_nan_passes_through() {
        assert!(pearson_coefficient(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_nan());
    }

    #[test]
    fn test_pearson_known_value() {
        // scipy.stats.pearsonr([1,2,3,4,5], [2,4,5,4,5]) -> (0.7745966692414834, 0.12402706265755...)
        let result = pearson_dense(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 5.0, 4.0, 5.0]).unwrap();
        assert_relative_eq!(result.statistic, 0.7745966692414834, epsilon = 1e-12);
        assert_relative_eq!(result.pvalue, 0.1240270626575, epsilon = 1e-6);
    }

    #[test]
    fn test_pearson_insufficient_data() {
        let xs = [Some(1.0), Some(2.0), None, Some(4.0)];
        let ys = [Some(1.0), None, Some(3.0), Some(4.0)];
        let result = pearsonr(&xs, &ys).unwrap();
        assert!(result.statistic.is_nan());
        assert!(result.pvalue.is_nan());

        let result = pearsonr(&[], &[]).unwrap();
        assert!(!result.is_defined());
    }

    #[test]
    fn test_pearson_zero_variance_is_nan() {
        let result = pearson_dense(&[1.0, 1.0, 1.0, 1.0], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert!(result.statistic.is_nan());
        assert!(result.pvalue.is_nan());
    }

    #[test]
    fn test_pearson_symmetric() {
        let x = [0.3, -1.2, 2.5, 0.0, 4.1, 1.7];
        let y = [1.1, 0.4, -0.3, 2.2, 0.9, 1.5];
        let a = pearson_dense(&x, &y).unwrap();
        let b = pearson_dense(&y, &x).unwrap();
        assert_eq!(a.statistic, b.statistic);
        assert_eq!(a.pvalue, b.pvalue);
    }

    #[test]
    fn test_pearson_length_mismatch() {
        let result = pearsonr(&some(&[1.0, 2.0, 3.0]), &some(&[1.0, 2.0]));
        assert!(matches!(result, Err(StatsError::LengthMismatch { .. })));
    }
}
