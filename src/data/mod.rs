//! Data structures shared by the statistics routines.

mod result;
mod sample;
mod table;

pub use result::{CorrelationResult, RegressionResult};
pub use sample::{PairedSample, MIN_OBSERVATIONS};
pub use table::SeriesTable;
