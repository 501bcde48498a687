//! Regression analysis.

mod linear;

pub use linear::{linregress, linregress_dense};
