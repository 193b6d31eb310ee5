use std::str::FromStr;

use ndarray::{ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::errors::ClusterError;

/// Distance between two observation vectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceMetric {
    Euclidean,
    Manhattan,
    /// 1 − Pearson correlation. Two perfectly co-varying observations are
    /// at distance 0 regardless of scale.
    Correlation,
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "manhattan" => Ok(DistanceMetric::Manhattan),
            "correlation" => Ok(DistanceMetric::Correlation),
            _ => Err(format!(
                "Invalid distance metric: {} (expected euclidean, manhattan, or correlation)",
                s
            )),
        }
    }
}

impl DistanceMetric {
    fn compute(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self {
            DistanceMetric::Euclidean => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            DistanceMetric::Manhattan => {
                a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
            }
            DistanceMetric::Correlation => 1.0 - pearson(a, b),
        }
    }
}

fn pearson(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.sum() / n;
    let mean_b = b.sum() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

///
/// Pairwise distances over n observations, stored as the condensed upper
/// triangle (n * (n - 1) / 2 values).
///
#[derive(Clone, Debug)]
pub struct DistanceMatrix {
    n: usize,
    condensed: Vec<f64>,
}

impl DistanceMatrix {
    /// Distances between the rows of `data`.
    pub fn from_rows(
        data: ArrayView2<f64>,
        metric: DistanceMetric,
    ) -> Result<DistanceMatrix, ClusterError> {
        let n = data.nrows();
        if n == 0 || data.ncols() == 0 {
            return Err(ClusterError::EmptyInput);
        }

        for ((row, col), v) in data.indexed_iter() {
            if !v.is_finite() {
                return Err(ClusterError::NonFiniteValue { row, col });
            }
        }

        if metric == DistanceMetric::Correlation {
            for (index, obs) in data.axis_iter(Axis(0)).enumerate() {
                let mean = obs.sum() / obs.len() as f64;
                if obs.iter().all(|v| (v - mean).abs() < f64::EPSILON) {
                    return Err(ClusterError::ZeroVariance { index });
                }
            }
        }

        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .collect();

        let condensed: Vec<f64> = pairs
            .par_iter()
            .map(|&(i, j)| metric.compute(data.row(i), data.row(j)))
            .collect();

        Ok(DistanceMatrix { n, condensed })
    }

    /// Distances between the columns of `data` (samples, in count-matrix
    /// orientation).
    pub fn from_columns(
        data: ArrayView2<f64>,
        metric: DistanceMetric,
    ) -> Result<DistanceMatrix, ClusterError> {
        Self::from_rows(data.t(), metric)
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// Distance between observations `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        // index of (i, j), i < j, in the row-major upper triangle
        let idx = i * self.n - i * (i + 1) / 2 + (j - i - 1);
        self.condensed[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_euclidean_distances() {
        let data = array![[0.0, 0.0], [3.0, 4.0], [0.0, 1.0]];
        let dist = DistanceMatrix::from_rows(data.view(), DistanceMetric::Euclidean).unwrap();

        assert_eq!(dist.n(), 3);
        assert_eq!(dist.get(0, 1), 5.0);
        assert_eq!(dist.get(1, 0), 5.0);
        assert_eq!(dist.get(0, 2), 1.0);
        assert_eq!(dist.get(2, 2), 0.0);
    }

    #[rstest]
    fn test_manhattan_distances() {
        let data = array![[1.0, 1.0], [4.0, -1.0]];
        let dist = DistanceMatrix::from_rows(data.view(), DistanceMetric::Manhattan).unwrap();
        assert_eq!(dist.get(0, 1), 5.0);
    }

    #[rstest]
    fn test_correlation_distance() {
        // perfectly correlated despite different scales
        let data = array![[1.0, 2.0, 3.0], [10.0, 20.0, 30.0], [3.0, 2.0, 1.0]];
        let dist = DistanceMatrix::from_rows(data.view(), DistanceMetric::Correlation).unwrap();

        assert!(dist.get(0, 1).abs() < 1e-12);
        assert!((dist.get(0, 2) - 2.0).abs() < 1e-12);
    }

    #[rstest]
    fn test_column_orientation() {
        let data = array![[0.0, 3.0], [0.0, 4.0]];
        let dist = DistanceMatrix::from_columns(data.view(), DistanceMetric::Euclidean).unwrap();
        assert_eq!(dist.n(), 2);
        assert_eq!(dist.get(0, 1), 5.0);
    }

    #[rstest]
    fn test_zero_variance_vector_rejected_for_correlation() {
        let data = array![[1.0, 1.0, 1.0], [1.0, 2.0, 3.0]];
        let err = DistanceMatrix::from_rows(data.view(), DistanceMetric::Correlation).unwrap_err();
        assert!(matches!(err, ClusterError::ZeroVariance { index: 0 }));
    }

    #[rstest]
    fn test_non_finite_rejected() {
        let data = array![[1.0, f64::NAN], [0.0, 0.0]];
        let err = DistanceMatrix::from_rows(data.view(), DistanceMetric::Euclidean).unwrap_err();
        assert!(matches!(err, ClusterError::NonFiniteValue { row: 0, col: 1 }));
    }
}
