//! Agglomerative hierarchical clustering.

mod hierarchical;

pub use hierarchical::{average_linkage, Dendrogram, Merge};
