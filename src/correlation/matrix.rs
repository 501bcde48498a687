//! All-pairs correlation matrices with optional clustered ordering.

use super::CorrelationMethod;
use crate::cluster::average_linkage;
use crate::data::PairedSample;
use crate::error::{Result, StatsError};
use indexmap::IndexMap;
use nalgebra::DMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Options for building a correlation matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixOptions {
    /// Pairwise statistic.
    #[serde(default)]
    pub method: CorrelationMethod,
    /// Reorder rows and columns by hierarchical clustering.
    #[serde(default)]
    pub cluster: bool,
}

/// Square, symmetric matrix of pairwise correlations between named series.
///
/// `matrix[(i, j)]` is the correlation between `columns[i]` and
/// `columns[j]`; the diagonal is exactly 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "MatrixRows", try_from = "MatrixRows")]
pub struct CorrelationMatrix {
    /// Series labels, in row/column order.
    pub columns: Vec<String>,
    /// Correlation values.
    pub matrix: DMatrix<f64>,
}

/// Row-major serialized form.
#[derive(Serialize, Deserialize)]
struct MatrixRows {
    columns: Vec<String>,
    matrix: Vec<Vec<f64>>,
}

impl From<CorrelationMatrix> for MatrixRows {
    fn from(m: CorrelationMatrix) -> Self {
        let matrix = m.rows();
        Self {
            columns: m.columns,
            matrix,
        }
    }
}

impl TryFrom<MatrixRows> for CorrelationMatrix {
    type Error = StatsError;

    fn try_from(rows: MatrixRows) -> Result<Self> {
        let k = rows.columns.len();
        if rows.matrix.len() != k {
            return Err(StatsError::LengthMismatch {
                left: k,
                right: rows.matrix.len(),
            });
        }
        for row in &rows.matrix {
            if row.len() != k {
                return Err(StatsError::LengthMismatch {
                    left: k,
                    right: row.len(),
                });
            }
        }
        let matrix = DMatrix::from_fn(k, k, |i, j| rows.matrix[i][j]);
        Ok(Self {
            columns: rows.columns,
            matrix,
        })
    }
}

impl CorrelationMatrix {
    /// Number of series.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Index of a series label.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Correlation between two named series.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.matrix[(self.index_of(a)?, self.index_of(b)?)])
    }

    /// Matrix as nested rows.
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.matrix
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }

    /// Reorder rows, columns and labels so that new position `p` holds old
    /// index `order[p]`.
    pub fn permuted(&self, order: &[usize]) -> Result<Self> {
        let k = self.len();
        let mut seen = vec![false; k];
        if order.len() != k
            || order
                .iter()
                .any(|&i| i >= k || std::mem::replace(&mut seen[i], true))
        {
            return Err(StatsError::InvalidParameter(format!(
                "Order {:?} is not a permutation of 0..{}",
                order, k
            )));
        }

        Ok(Self {
            columns: order.iter().map(|&i| self.columns[i].clone()).collect(),
            matrix: DMatrix::from_fn(k, k, |a, b| self.matrix[(order[a], order[b])]),
        })
    }
}

/// Build the Pearson correlation matrix of named series.
///
/// Series may differ in length; each pair is compared over the indices
/// where both have finite values. The diagonal is fixed at 1.0. With
/// `use_clustering` the result is reordered by
/// [`cluster_correlation_matrix`], and clustering failures are returned
/// as errors.
pub fn correlation_matrix(
    data: &IndexMap<String, Vec<Option<f64>>>,
    use_clustering: bool,
) -> Result<CorrelationMatrix> {
    correlation_matrix_with(
        data,
        &MatrixOptions {
            method: CorrelationMethod::Pearson,
            cluster: use_clustering,
        },
    )
}

/// Build a correlation matrix with the given statistic and ordering.
pub fn correlation_matrix_with(
    data: &IndexMap<String, Vec<Option<f64>>>,
    options: &MatrixOptions,
) -> Result<CorrelationMatrix> {
    let columns: Vec<String> = data.keys().cloned().collect();
    let series: Vec<&[Option<f64>]> = data.values().map(Vec::as_slice).collect();
    let k = series.len();

    let pairs: Vec<(usize, usize)> = (0..k)
        .flat_map(|i| ((i + 1)..k).map(move |j| (i, j)))
        .collect();

    // Upper triangle in parallel, then mirrored
    let values: Vec<f64> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let sample = PairedSample::from_padded(series[i], series[j]);
            options.method.coefficient(&sample)
        })
        .collect();

    let mut matrix = DMatrix::identity(k, k);
    for (&(i, j), &value) in pairs.iter().zip(&values) {
        matrix[(i, j)] = value;
        matrix[(j, i)] = value;
    }

    debug!(
        n_series = k,
        method = options.method.name(),
        cluster = options.cluster,
        "computed correlation matrix"
    );

    let result = CorrelationMatrix { columns, matrix };
    if options.cluster {
        cluster_correlation_matrix(&result)
    } else {
        Ok(result)
    }
}

/// Reorder a correlation matrix by average-linkage clustering.
///
/// Distances are `1 - |r|`. Rows, columns and labels are permuted to the
/// dendrogram's leaf order; no value is changed. A single series is
/// returned as is.
///
/// # Errors
/// `Clustering` for an empty matrix or any NaN correlation.
pub fn cluster_correlation_matrix(m: &CorrelationMatrix) -> Result<CorrelationMatrix> {
    if m.is_empty() {
        return Err(StatsError::Clustering(
            "Cannot cluster an empty correlation matrix".to_string(),
        ));
    }
    if m.len() == 1 {
        return Ok(m.clone());
    }

    let distances = m.matrix.map(|r| 1.0 - r.abs());
    let dendrogram = average_linkage(&distances)?;
    m.permuted(&dendrogram.leaves())
}
