//! Simple linear regression via ordinary least squares.

use crate::data::{PairedSample, RegressionResult};
use crate::error::Result;
use crate::test::two_tailed_p;
use tracing::debug;

/// Fit `y = slope * x + intercept` by ordinary least squares.
///
/// Paired filtering and the three-observation minimum match
/// [`pearsonr`](crate::correlation::pearsonr). All fields are NaN when the
/// minimum is not met.
///
/// - `rvalue` is √R², signed like the slope
/// - `stderr` is the residual standard error √(SSR / (n-2))
/// - the slope's standard error is `stderr / √Σ(x - x̄)²`, and `pvalue`
///   tests `slope / SE` against Student's t at n-2 df
/// - `intercept_stderr` is the slope's standard error times √(Σx² / n)
///
/// Zero-variance x or a perfect fit is not guarded; the resulting NaN or
/// infinite intermediates flow through to the result.
///
/// # Errors
/// `LengthMismatch` if the inputs differ in length.
pub fn linregress(xs: &[Option<f64>], ys: &[Option<f64>]) -> Result<RegressionResult> {
    let sample = PairedSample::from_nullable(xs, ys)?;
    linregress_sample(&sample)
}

/// Linear regression over dense input; NaN entries count as missing.
pub fn linregress_dense(xs: &[f64], ys: &[f64]) -> Result<RegressionResult> {
    let sample = PairedSample::from_dense(xs, ys)?;
    linregress_sample(&sample)
}

fn linregress_sample(sample: &PairedSample) -> Result<RegressionResult> {
    if !sample.is_sufficient() {
        debug!(n = sample.len(), "too few paired observations for linregress");
        return Ok(RegressionResult::undefined());
    }

    let (x, y) = (&sample.x, &sample.y);
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        sxx += (xi - mean_x) * (xi - mean_x);
        sxy += (xi - mean_x) * (yi - mean_y);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    // Residual and total sums of squares
    let ss_res: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (yi - (slope * xi + intercept)).powi(2))
        .sum();
    let ss_tot: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();

    let r_squared = 1.0 - ss_res / ss_tot;
    let rvalue = if slope.is_nan() {
        f64::NAN
    } else if slope < 0.0 {
        -r_squared.sqrt()
    } else {
        r_squared.sqrt()
    };

    let df = n - 2.0;
    let stderr = (ss_res / df).sqrt();
    let slope_stderr = stderr / sxx.sqrt();
    let t = slope / slope_stderr;
    let pvalue = two_tailed_p(t, df)?;

    let sum_x_sq: f64 = x.iter().map(|xi| xi * xi).sum();
    let intercept_stderr = slope_stderr * (sum_x_sq / n).sqrt();

    Ok(RegressionResult {
        slope,
        intercept,
        rvalue,
        pvalue,
        stderr,
        intercept_stderr,
    })
}
