//! Average-linkage (UPGMA) clustering over a precomputed distance matrix.

use crate::error::{Result, StatsError};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One merge step of the dendrogram.
///
/// Node ids below `n_leaves` are original items; merge `k` creates node
/// `n_leaves + k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Merge {
    /// Smaller of the two merged node ids.
    pub left: usize,
    /// Larger of the two merged node ids.
    pub right: usize,
    /// Average linkage distance at which the merge happened.
    pub distance: f64,
    /// Number of leaves under the new node.
    pub size: usize,
}

/// Result of agglomerative clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    n_leaves: usize,
    merges: Vec<Merge>,
}

impl Dendrogram {
    /// Number of original items.
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// Merge steps in the order they were performed.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Id of the root node.
    pub fn root(&self) -> usize {
        if self.merges.is_empty() {
            0
        } else {
            self.n_leaves + self.merges.len() - 1
        }
    }

    /// Left-to-right order of the leaves.
    pub fn leaves(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.n_leaves);
        if self.n_leaves == 0 {
            return order;
        }

        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            if node < self.n_leaves {
                order.push(node);
            } else {
                let merge = &self.merges[node - self.n_leaves];
                stack.push(merge.right);
                stack.push(merge.left);
            }
        }
        order
    }
}

/// Cluster items bottom-up, always merging the two clusters with the
/// smallest average pairwise distance.
///
/// Only the strict upper triangle of `distances` is read. Ties go to the
/// pair with the lowest indices, so the result is deterministic.
///
/// # Errors
/// `Clustering` if the matrix is empty, not square, or holds a
/// non-finite distance.
pub fn average_linkage(distances: &DMatrix<f64>) -> Result<Dendrogram> {
    let n = distances.nrows();
    if n == 0 {
        return Err(StatsError::Clustering(
            "Cannot cluster an empty distance matrix".to_string(),
        ));
    }
    if distances.ncols() != n {
        return Err(StatsError::Clustering(format!(
            "Distance matrix must be square, got {}x{}",
            n,
            distances.ncols()
        )));
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let d = distances[(i, j)];
            if !d.is_finite() {
                warn!(i, j, distance = d, "non-finite distance in clustering input");
                return Err(StatsError::Clustering(format!(
                    "Non-finite distance {} between items {} and {}",
                    d, i, j
                )));
            }
        }
    }

    // Working copy, symmetric; slot i holds the cluster currently in slot i
    let mut d = distances.clone();
    for i in 0..n {
        for j in (i + 1)..n {
            d[(j, i)] = d[(i, j)];
        }
    }
    let mut node_ids: Vec<usize> = (0..n).collect();
    let mut sizes = vec![1usize; n];
    let mut active = vec![true; n];
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    for step in 0..n.saturating_sub(1) {
        let mut best = (usize::MAX, usize::MAX);
        let mut best_distance = f64::INFINITY;
        for i in (0..n).filter(|&i| active[i]) {
            for j in ((i + 1)..n).filter(|&j| active[j]) {
                if d[(i, j)] < best_distance || best.0 == usize::MAX {
                    best_distance = d[(i, j)];
                    best = (i, j);
                }
            }
        }
        let (a, b) = best;
        let (size_a, size_b) = (sizes[a], sizes[b]);
        let merged_size = size_a + size_b;

        // Lance-Williams update for average linkage
        for k in (0..n).filter(|&k| active[k] && k != a && k != b) {
            let updated = (size_a as f64 * d[(a, k)] + size_b as f64 * d[(b, k)])
                / merged_size as f64;
            d[(a, k)] = updated;
            d[(k, a)] = updated;
        }

        merges.push(Merge {
            left: node_ids[a].min(node_ids[b]),
            right: node_ids[a].max(node_ids[b]),
            distance: best_distance,
            size: merged_size,
        });
        node_ids[a] = n + step;
        sizes[a] = merged_size;
        active[b] = false;
    }

    debug!(n_leaves = n, n_merges = merges.len(), "average-linkage clustering complete");

    Ok(Dendrogram {
        n_leaves: n,
        merges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_obvious_groups() {
        // 0 and 2 are close, 1 and 3 are close
        let d = DMatrix::from_row_slice(4, 4, &[
            0.0, 0.9, 0.1, 0.8,
            0.9, 0.0, 0.85, 0.2,
            0.1, 0.85, 0.0, 0.95,
            0.8, 0.2, 0.95, 0.0,
        ]);

        let dendrogram = average_linkage(&d).unwrap();
        let merges = dendrogram.merges();

        assert_eq!(merges.len(), 3);
        assert_eq!((merges[0].left, merges[0].right), (0, 2));
        assert_relative_eq!(merges[0].distance, 0.1);
        assert_eq!((merges[1].left, merges[1].right), (1, 3));
        assert_relative_eq!(merges[1].distance, 0.2);
        assert_eq!((merges[2].left, merges[2].right), (4, 5));
        // mean of d(0,1), d(0,3), d(2,1), d(2,3)
        assert_relative_eq!(merges[2].distance, (0.9 + 0.8 + 0.85 + 0.95) / 4.0, epsilon = 1e-12);
        assert_eq!(merges[2].size, 4);

        assert_eq!(dendrogram.leaves(), vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_average_linkage_uses_cluster_sizes() {
        // {0,1} merge first, then 2 joins at the mean of d(0,2), d(1,2)
        let d = DMatrix::from_row_slice(3, 3, &[
            0.0, 0.1, 0.4,
            0.1, 0.0, 0.6,
            0.4, 0.6, 0.0,
        ]);
        let dendrogram = average_linkage(&d).unwrap();
        assert_relative_eq!(dendrogram.merges()[1].distance, 0.5, epsilon = 1e-12);
        assert_eq!(dendrogram.leaves(), vec![2, 0, 1]);
    }

    #[test]
    fn test_single_leaf() {
        let dendrogram = average_linkage(&DMatrix::from_element(1, 1, 0.0)).unwrap();
        assert!(dendrogram.merges().is_empty());
        assert_eq!(dendrogram.leaves(), vec![0]);
    }

    #[test]
    fn test_ties_are_deterministic() {
        let d = DMatrix::from_element(3, 3, 0.5);
        let first = average_linkage(&d).unwrap();
        let second = average_linkage(&d).unwrap();
        assert_eq!(first, second);
        assert_eq!((first.merges()[0].left, first.merges()[0].right), (0, 1));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            average_linkage(&DMatrix::zeros(0, 0)),
            Err(StatsError::Clustering(_))
        ));
        assert!(matches!(
            average_linkage(&DMatrix::zeros(2, 3)),
            Err(StatsError::Clustering(_))
        ));

        let mut d = DMatrix::zeros(3, 3);
        d[(0, 2)] = f64::NAN;
        assert!(matches!(average_linkage(&d), Err(StatsError::Clustering(_))));
    }
}
