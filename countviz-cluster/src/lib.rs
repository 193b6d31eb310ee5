//! Clustering and normalization for genomic count matrices.
//!
//! This crate provides the numeric half of countviz:
//!
//! - Pairwise distance computation (euclidean, manhattan, 1 − Pearson r)
//!   over the rows or columns of a matrix
//! - Agglomerative hierarchical clustering with single, complete, or
//!   average linkage, plus tree cutting and leaf ordering
//! - Lloyd's k-means with seeded restarts
//! - Row- or column-wise z-score normalization
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use countviz_cluster::{DistanceMatrix, DistanceMetric, Dendrogram, Linkage};
//!
//! let data = array![[0.0, 0.1], [0.2, 0.0], [10.0, 10.2]];
//! let dist = DistanceMatrix::from_rows(data.view(), DistanceMetric::Euclidean).unwrap();
//! let tree = Dendrogram::build(&dist, Linkage::Average).unwrap();
//! let labels = tree.cut(2).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

pub mod distance;
pub mod errors;
pub mod hierarchy;
pub mod kmeans;
pub mod zscore;

// re-exports
pub use distance::{DistanceMatrix, DistanceMetric};
pub use errors::ClusterError;
pub use hierarchy::{Dendrogram, Linkage, Merge};
pub use kmeans::{KMeans, KMeansFit};
pub use zscore::{NormalizeAxis, log2_plus_one, zscore};
