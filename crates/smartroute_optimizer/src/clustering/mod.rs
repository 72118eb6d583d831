pub mod kmeans;
pub mod nearest_neighbor;

pub use kmeans::{Clustering, KMeansParams, OrderCluster, cluster_count, kmeans};
pub use nearest_neighbor::{Sequence, nearest_neighbor_sequence};
