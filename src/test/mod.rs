//! Significance testing primitives.


pub use t_dist::{t_statistic, two_tailed_p};
