//! Benjamini-Hochberg false discovery rate correction.

use serde::{Deserialize, Serialize};

/// Result of BH correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BhCorrected {
    /// Labels in original order.
    pub labels: Vec<String>,
    /// Original p-values.
    pub p_values: Vec<f64>,
    /// Adjusted p-values (q-values). NaN where the p-value was NaN.
    pub q_values: Vec<f64>,
    /// Number of tests with a usable p-value.
    pub n_tests: usize,
}

impl BhCorrected {
    /// Get q-value for a specific label.
    pub fn get_qvalue(&self, label: &str) -> Option<f64> {
        let idx = self.labels.iter().position(|l| l == label)?;
        self.q_values.get(idx).copied()
    }

    /// Count significant results at a threshold.
    pub fn n_significant(&self, alpha: f64) -> usize {
        self.q_values.iter().filter(|&&q| q < alpha).count()
    }
}

/// Apply Benjamini-Hochberg FDR correction.
///
/// For p-values sorted ascending, the adjusted value is
/// q[i] = min(p[i] * m / rank[i], q[i+1]), capped at 1.0.
/// NaN p-values are left out of `m` and get a NaN q-value.
///
/// # Arguments
/// * `p_values` - Raw p-values
/// * `labels` - Identifiers in the same order as `p_values`
pub fn correct_bh(p_values: &[f64], labels: &[String]) -> BhCorrected {
    let mut q_values = vec![f64::NAN; p_values.len()];

    // Sorted index over usable p-values only
    let mut indices: Vec<usize> = (0..p_values.len())
        .filter(|&i| !p_values[i].is_nan())
        .collect();
    indices.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let m = indices.len();
    if m > 0 {
        let m_f64 = m as f64;
        let mut running = p_values[indices[m - 1]].min(1.0);
        q_values[indices[m - 1]] = running;

        // Work backwards from the largest p-value
        for i in (0..m - 1).rev() {
            let rank = i + 1;
            let adjusted = p_values[indices[i]] * m_f64 / rank as f64;
            running = adjusted.min(running).min(1.0);
            q_values[indices[i]] = running;
        }
    }

    BhCorrected {
        labels: labels.to_vec(),
        p_values: p_values.to_vec(),
        q_values,
        n_tests: m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("feat_{}", i)).collect()
    }

    #[test]
    fn test_bh_ordering() {
        // P-values in non-sorted order
        let p_values = vec![0.04, 0.01, 0.03, 0.005];
        let corrected = correct_bh(&p_values, &labels(4));

        // q = 0.005 * 4 / 1 = 0.02
        assert_relative_eq!(corrected.q_values[3], 0.02, epsilon = 1e-10);
        // q = min(0.01 * 4 / 2, q[next]) = 0.02
        assert_relative_eq!(corrected.q_values[1], 0.02, epsilon = 1e-10);
        assert_eq!(corrected.get_qvalue("feat_3"), Some(corrected.q_values[3]));
    }

    #[test]
    fn test_bh_known_values() {
        let p_values = vec![0.005, 0.01, 0.02, 0.04, 0.1];
        let corrected = correct_bh(&p_values, &labels(5));

        assert_relative_eq!(corrected.q_values[0], 0.025, epsilon = 1e-10);
        assert_relative_eq!(corrected.q_values[1], 0.025, epsilon = 1e-10);
        assert_relative_eq!(corrected.q_values[2], 1.0 / 30.0, epsilon = 1e-10);
        assert_relative_eq!(corrected.q_values[3], 0.05, epsilon = 1e-10);
        assert_relative_eq!(corrected.q_values[4], 0.1, epsilon = 1e-10);
        assert_eq!(corrected.n_significant(0.04), 3);
    }

    #[test]
    fn test_bh_bounded() {
        let p_values = vec![0.5, 0.6, 0.7, 0.8, 0.9];
        let corrected = correct_bh(&p_values, &labels(5));
        for q in &corrected.q_values {
            assert!(*q <= 1.0);
        }
    }

    #[test]
    fn test_bh_skips_nan() {
        let p_values = vec![0.01, f64::NAN, 0.04];
        let corrected = correct_bh(&p_values, &labels(3));

        assert_eq!(corrected.n_tests, 2);
        assert!(corrected.q_values[1].is_nan());
        // m = 2, not 3
        assert_relative_eq!(corrected.q_values[0], 0.02, epsilon = 1e-10);
        assert_relative_eq!(corrected.q_values[2], 0.04, epsilon = 1e-10);
    }

    #[test]
    fn test_bh_empty() {
        let corrected = correct_bh(&[], &[]);
        assert_eq!(corrected.n_tests, 0);
        assert!(corrected.q_values.is_empty());
    }
}
