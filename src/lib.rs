//! Correlation and Regression Statistics for Dependency-Map Exploration
//!
//! This library provides the numerical core behind scatter plots,
//! correlation heatmaps and "top correlated features" tables over
//! gene-effect, expression and drug-sensitivity data.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (PairedSample, SeriesTable, results)
//! - **correlation**: Pearson and Spearman correlation, correlation matrices
//! - **regression**: Simple linear regression
//! - **cluster**: Average-linkage hierarchical clustering
//! - **association**: Correlating one series against a whole table
//! - **correct**: Multiple testing correction (Benjamini-Hochberg)
//! - **test**: Student's t significance primitives
//! - **pipeline**: Analysis composition and execution
//!
//! Missing values are `None`. Every pairwise routine keeps only the indices
//! where both inputs are finite, and returns NaN results rather than an
//! error when fewer than three pairs remain.
//!
//! # Example
//!
//! ```no_run
//! use depmap_stats::prelude::*;
//!
//! let table = SeriesTable::from_tsv("gene_effect.tsv").unwrap();
//!
//! let report = Analysis::new()
//!     .name("melanoma lineage")
//!     .pearson("SOX10", "MITF")
//!     .correlation_matrix(None, CorrelationMethod::Pearson, true)
//!     .associations("SOX10", CorrelationMethod::Spearman, Some(25))
//!     .run(&table)
//!     .unwrap();
//!
//! println!("{}", report.to_json().unwrap());
//! ```

pub mod association;
pub mod cluster;
pub mod correct;
pub mod correlation;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod regression;
pub mod test;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::association::{correlate_against, Association, AssociationSet};
    pub use crate::cluster::{average_linkage, Dendrogram, Merge};
    pub use crate::correct::{correct_bh, BhCorrected};
    pub use crate::correlation::{
        cluster_correlation_matrix, correlation_matrix, correlation_matrix_with, pearson_dense,
        pearsonr, rank_average, spearman_dense, spearmanr, CorrelationMatrix, CorrelationMethod,
        MatrixOptions,
    };
    pub use crate::data::{
        CorrelationResult, PairedSample, RegressionResult, SeriesTable, MIN_OBSERVATIONS,
    };
    pub use crate::error::{Result, StatsError};
    pub use crate::pipeline::{Analysis, AnalysisConfig, AnalysisOutput, AnalysisReport, AnalysisStep};
    pub use crate::regression::{linregress, linregress_dense};
    pub use crate::test::{t_statistic, two_tailed_p};
}
