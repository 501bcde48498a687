//! Result types returned by the pairwise statistics.

use serde::{Deserialize, Serialize};

/// Correlation statistic with its two-tailed p-value.
///
/// Both fields are NaN when fewer than three paired observations exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Correlation coefficient (r or rho).
    pub statistic: f64,
    /// Two-tailed p-value for H0: no correlation.
    pub pvalue: f64,
}

impl CorrelationResult {
    /// The result for insufficient data.
    pub fn undefined() -> Self {
        Self {
            statistic: f64::NAN,
            pvalue: f64::NAN,
        }
    }

    /// Whether the statistic could be computed.
    pub fn is_defined(&self) -> bool {
        !self.statistic.is_nan()
    }
}

/// Simple linear regression fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Slope of the fitted line.
    pub slope: f64,
    /// Intercept of the fitted line.
    pub intercept: f64,
    /// Correlation coefficient, signed by the slope.
    pub rvalue: f64,
    /// Two-tailed p-value for H0: slope = 0.
    pub pvalue: f64,
    /// Residual standard error.
    pub stderr: f64,
    /// Standard error of the intercept.
    pub intercept_stderr: f64,
}

impl RegressionResult {
    /// The result for insufficient data.
    pub fn undefined() -> Self {
        Self {
            slope: f64::NAN,
            intercept: f64::NAN,
            rvalue: f64::NAN,
            pvalue: f64::NAN,
            stderr: f64::NAN,
            intercept_stderr: f64::NAN,
        }
    }

    /// Whether the fit could be computed.
    pub fn is_defined(&self) -> bool {
        !self.slope.is_nan()
    }

    /// Coefficient of determination.
    pub fn r_squared(&self) -> f64 {
        self.rvalue * self.rvalue
    }

    /// Predicted y for a given x.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_results() {
        assert!(!CorrelationResult::undefined().is_defined());
        assert!(CorrelationResult::undefined().pvalue.is_nan());

        let fit = RegressionResult::undefined();
        assert!(!fit.is_defined());
        assert!(fit.intercept_stderr.is_nan());
        assert!(fit.predict(1.0).is_nan());
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let json = serde_json::to_string(&CorrelationResult::undefined()).unwrap();
        assert_eq!(json, r#"{"statistic":null,"pvalue":null}"#);
    }
}
