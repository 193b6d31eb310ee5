use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Input matrix is empty")]
    EmptyInput,

    #[error("Non-finite value at row {row}, column {col}")]
    NonFiniteValue { row: usize, col: usize },

    #[error("Observation {index} has zero variance; correlation distance is undefined")]
    ZeroVariance { index: usize },

    #[error("Requested {k} clusters from {n} observations")]
    InvalidClusterCount { k: usize, n: usize },
}
