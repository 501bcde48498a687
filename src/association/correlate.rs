//! Correlate one column of a table against every other column.

use crate::correct::correct_bh;
use crate::correlation::CorrelationMethod;
use crate::data::{PairedSample, SeriesTable};
use crate::error::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Correlation of one feature with the target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Association {
    /// Feature (column) name.
    pub feature: String,
    /// Correlation coefficient with the target.
    pub statistic: f64,
    /// Two-tailed p-value.
    pub pvalue: f64,
    /// Benjamini-Hochberg adjusted p-value.
    pub qvalue: f64,
    /// Number of paired observations used.
    pub n: usize,
}

/// All associations for a target, strongest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationSet {
    /// Target column.
    pub target: String,
    /// Statistic used.
    pub method: CorrelationMethod,
    /// Associations ordered by descending |statistic|.
    pub associations: Vec<Association>,
    /// Number of features with a usable p-value.
    pub n_tests: usize,
}

impl AssociationSet {
    /// Number of features compared.
    pub fn len(&self) -> usize {
        self.associations.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }

    /// The `k` strongest associations.
    pub fn top(&self, k: usize) -> &[Association] {
        &self.associations[..k.min(self.associations.len())]
    }

    /// Associations with q below `alpha`.
    pub fn significant(&self, alpha: f64) -> Vec<&Association> {
        self.associations
            .iter()
            .filter(|a| a.qvalue < alpha)
            .collect()
    }

    /// Get the association for a feature.
    pub fn get_feature(&self, feature: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.feature == feature)
    }

    /// Keep only the `k` strongest associations.
    pub fn truncate(&mut self, k: usize) {
        self.associations.truncate(k);
    }
}

/// Correlate `target` against every other column of `table`.
///
/// q-values are computed across all features with a finite p-value.
/// Results are sorted by descending absolute statistic with NaN last and
/// ties broken by feature name.
///
/// # Errors
/// `MissingColumn` if `target` is not in the table.
pub fn correlate_against(
    table: &SeriesTable,
    target: &str,
    method: CorrelationMethod,
) -> Result<AssociationSet> {
    let target_values = table.require(target)?;

    let features: Vec<(&String, &Vec<Option<f64>>)> = table
        .series()
        .iter()
        .filter(|(name, _)| name.as_str() != target)
        .collect();

    let computed: Vec<(String, f64, f64, usize)> = features
        .par_iter()
        .map(|(name, values)| {
            let sample = PairedSample::from_nullable(target_values, values)?;
            let result = method.correlate_sample(&sample)?;
            Ok((
                name.to_string(),
                result.statistic,
                result.pvalue,
                sample.len(),
            ))
        })
        .collect::<Result<_>>()?;

    let p_values: Vec<f64> = computed.iter().map(|c| c.2).collect();
    let labels: Vec<String> = computed.iter().map(|c| c.0.clone()).collect();
    let bh = correct_bh(&p_values, &labels);

    let mut associations: Vec<Association> = computed
        .into_iter()
        .zip(bh.q_values)
        .map(|((feature, statistic, pvalue, n), qvalue)| Association {
            feature,
            statistic,
            pvalue,
            qvalue,
            n,
        })
        .collect();
    associations.sort_by(compare_strength);

    debug!(
        target_column = target,
        n_features = associations.len(),
        n_tests = bh.n_tests,
        "correlated target against table"
    );

    Ok(AssociationSet {
        target: target.to_string(),
        method,
        associations,
        n_tests: bh.n_tests,
    })
}

fn compare_strength(a: &Association, b: &Association) -> Ordering {
    match (a.statistic.is_nan(), b.statistic.is_nan()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => a.feature.cmp(&b.feature),
        (false, false) => b
            .statistic
            .abs()
            .total_cmp(&a.statistic.abs())
            .then_with(|| a.feature.cmp(&b.feature)),
    }
}
