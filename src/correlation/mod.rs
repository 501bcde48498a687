//! Correlation statistics and correlation matrices.

mod matrix;
mod pearson;
mod rank;
mod spearman;

pub use matrix::{
    cluster_correlation_matrix, correlation_matrix, correlation_matrix_with, CorrelationMatrix,
    MatrixOptions,
};
pub use pearson::{pearson_dense, pearsonr};
pub use rank::rank_average;
pub use spearman::{spearman_dense, spearmanr};

pub(crate) use pearson::{pearson_coefficient, pearson_sample};
pub(crate) use spearman::{spearman_coefficient, spearman_sample};

use crate::data::{CorrelationResult, PairedSample};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Which correlation statistic to compute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    /// Pearson product-moment correlation.
    #[default]
    Pearson,
    /// Spearman rank correlation.
    Spearman,
}

impl CorrelationMethod {
    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pearson => "pearson",
            Self::Spearman => "spearman",
        }
    }

    /// Correlate two nullable series of equal length.
    pub fn correlate(&self, xs: &[Option<f64>], ys: &[Option<f64>]) -> Result<CorrelationResult> {
        let sample = PairedSample::from_nullable(xs, ys)?;
        self.correlate_sample(&sample)
    }

    /// Correlate an already paired sample.
    pub(crate) fn correlate_sample(&self, sample: &PairedSample) -> Result<CorrelationResult> {
        match self {
            Self::Pearson => pearson_sample(sample),
            Self::Spearman => spearman_sample(sample),
        }
    }

    /// Coefficient only, NaN for insufficient data.
    pub(crate) fn coefficient(&self, sample: &PairedSample) -> f64 {
        if !sample.is_sufficient() {
            return f64::NAN;
        }
        match self {
            Self::Pearson => pearson_coefficient(&sample.x, &sample.y),
            Self::Spearman => spearman_coefficient(&sample.x, &sample.y),
        }
    }
}

impl std::fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_dispatch() {
        let xs = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let ys = [Some(1.0), Some(4.0), Some(9.0), Some(16.0)];

        let pearson = CorrelationMethod::Pearson.correlate(&xs, &ys).unwrap();
        let spearman = CorrelationMethod::Spearman.correlate(&xs, &ys).unwrap();

        assert!(pearson.statistic < 1.0);
        assert_eq!(spearman.statistic, 1.0);
    }

    #[test]
    fn test_method_serde_names() {
        let yaml = serde_yaml::to_string(&CorrelationMethod::Spearman).unwrap();
        assert_eq!(yaml.trim(), "spearman");
        let parsed: CorrelationMethod = serde_yaml::from_str("pearson").unwrap();
        assert_eq!(parsed, CorrelationMethod::Pearson);
    }
}
