//! Ranking features by correlation with a target series.

mod correlate;

pub use correlate::{correlate_against, Association, AssociationSet};
