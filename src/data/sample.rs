//! Paired filtering of nullable samples.

use crate::error::{Result, StatsError};

/// Minimum number of paired observations needed for any pairwise statistic.
pub const MIN_OBSERVATIONS: usize = 3;

/// Two samples filtered down to the indices where both values are finite.
///
/// Filtering is paired: if either side of an index is missing or
/// non-finite, both values at that index are dropped together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairedSample {
    /// Retained x values.
    pub x: Vec<f64>,
    /// Retained y values, aligned with `x`.
    pub y: Vec<f64>,
}

impl PairedSample {
    /// Pair two nullable sequences of equal length.
    pub fn from_nullable(xs: &[Option<f64>], ys: &[Option<f64>]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(StatsError::LengthMismatch {
                left: xs.len(),
                right: ys.len(),
            });
        }
        Ok(Self::collect(xs.iter().copied().zip(ys.iter().copied())))
    }

    /// Pair two dense sequences of equal length. NaN entries count as missing.
    pub fn from_dense(xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(StatsError::LengthMismatch {
                left: xs.len(),
                right: ys.len(),
            });
        }
        Ok(Self::collect(
            xs.iter().zip(ys.iter()).map(|(&x, &y)| (Some(x), Some(y))),
        ))
    }

    /// Pair two sequences that may differ in length.
    ///
    /// Positions past the end of the shorter sequence are treated as missing.
    pub fn from_padded(xs: &[Option<f64>], ys: &[Option<f64>]) -> Self {
        let len = xs.len().max(ys.len());
        Self::collect((0..len).map(|i| {
            (
                xs.get(i).copied().flatten(),
                ys.get(i).copied().flatten(),
            )
        }))
    }

    fn collect<I>(pairs: I) -> Self
    where
        I: Iterator<Item = (Option<f64>, Option<f64>)>,
    {
        let (x, y) = pairs
            .filter_map(|pair| match pair {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
                _ => None,
            })
            .unzip();
        Self { x, y }
    }

    /// Number of retained pairs.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Check if no pairs were retained.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Whether enough pairs remain to compute a statistic.
    pub fn is_sufficient(&self) -> bool {
        self.len() >= MIN_OBSERVATIONS
    }
}
