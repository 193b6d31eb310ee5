use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;

use crate::errors::ClusterError;

pub const DEFAULT_MAX_ITER: usize = 100;
pub const DEFAULT_N_INIT: usize = 10;

///
/// Configuration for Lloyd's k-means over the rows of a matrix.
///
/// Each of `n_init` restarts seeds the centroids with `k` distinct rows
/// drawn at random, then alternates assignment and centroid-update steps
/// until the assignment stops changing or `max_iter` is reached. The
/// restart with the lowest within-cluster sum of squares wins.
///
#[derive(Clone, Debug)]
pub struct KMeans {
    pub k: usize,
    pub max_iter: usize,
    pub n_init: usize,
    pub seed: Option<u64>,
}

impl KMeans {
    pub fn new(k: usize) -> KMeans {
        KMeans {
            k,
            max_iter: DEFAULT_MAX_ITER,
            n_init: DEFAULT_N_INIT,
            seed: None,
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> KMeans {
        self.max_iter = max_iter;
        self
    }

    pub fn with_restarts(mut self, n_init: usize) -> KMeans {
        self.n_init = n_init.max(1);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> KMeans {
        self.seed = Some(seed);
        self
    }

    pub fn fit(&self, data: ArrayView2<f64>) -> Result<KMeansFit, ClusterError> {
        let n = data.nrows();
        if n == 0 || data.ncols() == 0 {
            return Err(ClusterError::EmptyInput);
        }
        if self.k == 0 || self.k > n {
            return Err(ClusterError::InvalidClusterCount { k: self.k, n });
        }
        for ((row, col), v) in data.indexed_iter() {
            if !v.is_finite() {
                return Err(ClusterError::NonFiniteValue { row, col });
            }
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut best: Option<KMeansFit> = None;
        for _ in 0..self.n_init.max(1) {
            let fit = self.fit_once(data, &mut rng);
            let better = match &best {
                Some(b) => fit.inertia < b.inertia,
                None => true,
            };
            if better {
                best = Some(fit);
            }
        }

        Ok(best.expect("at least one restart ran"))
    }

    fn fit_once(&self, data: ArrayView2<f64>, rng: &mut StdRng) -> KMeansFit {
        let n = data.nrows();
        let p = data.ncols();

        // seed centroids with k distinct observations
        let mut centroids = Array2::zeros((self.k, p));
        for (c, obs) in sample(rng, n, self.k).into_iter().enumerate() {
            centroids.row_mut(c).assign(&data.row(obs));
        }

        let mut labels = vec![0usize; n];
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iter {
            iterations += 1;

            // assignment step
            let mut changed = false;
            for (i, obs) in data.axis_iter(Axis(0)).enumerate() {
                let mut best_c = 0;
                let mut best_d = f64::INFINITY;
                for (c, centroid) in centroids.axis_iter(Axis(0)).enumerate() {
                    let d = squared_distance(obs.view(), centroid.view());
                    if d < best_d {
                        best_d = d;
                        best_c = c;
                    }
                }
                if labels[i] != best_c {
                    labels[i] = best_c;
                    changed = true;
                }
            }

            // update step
            let mut sums = Array2::<f64>::zeros((self.k, p));
            let mut counts = vec![0usize; self.k];
            for (i, obs) in data.axis_iter(Axis(0)).enumerate() {
                let mut sum = sums.row_mut(labels[i]);
                sum += &obs;
                counts[labels[i]] += 1;
            }
            for c in 0..self.k {
                if counts[c] > 0 {
                    let mut row = centroids.row_mut(c);
                    row.assign(&(&sums.row(c) / counts[c] as f64));
                } else {
                    // empty cluster: reseed with the point farthest from its
                    // current centroid so the partition keeps k groups
                    let farthest = data
                        .axis_iter(Axis(0))
                        .enumerate()
                        .max_by(|(i, a), (j, b)| {
                            let da = squared_distance(a.view(), centroids.row(labels[*i]));
                            let db = squared_distance(b.view(), centroids.row(labels[*j]));
                            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                        })
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    centroids.row_mut(c).assign(&data.row(farthest));
                    labels[farthest] = c;
                    changed = true;
                }
            }

            if !changed {
                converged = true;
                break;
            }
        }

        let inertia = data
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(i, obs)| squared_distance(obs.view(), centroids.row(labels[i])))
            .sum();

        KMeansFit {
            labels,
            centroids,
            inertia,
            iterations,
            converged,
        }
    }
}

/// Result of a k-means fit: a flat partition with exactly `k` groups.
#[derive(Clone, Debug)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Array2<f64>,
    /// Within-cluster sum of squared distances.
    pub inertia: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl KMeansFit {
    pub fn k(&self) -> usize {
        self.centroids.nrows()
    }

    /// Number of observations assigned to each cluster.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.k()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn three_blobs() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [0.2, 0.1],
            [0.1, 0.3],
            [10.0, 10.0],
            [10.2, 9.9],
            [10.1, 10.1],
            [-10.0, 10.0],
            [-10.1, 10.2],
            [-9.9, 9.8]
        ]
    }

    #[rstest]
    fn test_recovers_separated_blobs() {
        let data = three_blobs();
        let fit = KMeans::new(3).with_seed(7).fit(data.view()).unwrap();

        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[0], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_eq!(fit.labels[6], fit.labels[8]);
        assert_ne!(fit.labels[0], fit.labels[3]);
        assert_ne!(fit.labels[3], fit.labels[6]);
        assert!(fit.converged);
        assert!(fit.inertia < 1.0);
    }

    #[rstest]
    fn test_exactly_k_nonempty_groups() {
        let data = three_blobs();
        for k in 1..=5 {
            let fit = KMeans::new(k).with_seed(11).fit(data.view()).unwrap();
            let sizes = fit.cluster_sizes();
            assert_eq!(sizes.len(), k);
            assert!(sizes.iter().all(|&s| s > 0), "empty cluster at k = {}", k);
        }
    }

    #[rstest]
    fn test_seed_makes_fit_deterministic() {
        let data = three_blobs();
        let a = KMeans::new(3).with_seed(42).fit(data.view()).unwrap();
        let b = KMeans::new(3).with_seed(42).fit(data.view()).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.inertia, b.inertia);
    }

    #[rstest]
    fn test_invalid_k() {
        let data = three_blobs();
        assert!(matches!(
            KMeans::new(0).fit(data.view()).unwrap_err(),
            ClusterError::InvalidClusterCount { k: 0, .. }
        ));
        assert!(matches!(
            KMeans::new(10).fit(data.view()).unwrap_err(),
            ClusterError::InvalidClusterCount { k: 10, .. }
        ));
    }

    #[rstest]
    fn test_k_equals_n() {
        let data = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]];
        let fit = KMeans::new(3).with_seed(1).fit(data.view()).unwrap();
        assert_eq!(fit.cluster_sizes(), vec![1, 1, 1]);
        assert!(fit.inertia.abs() < 1e-12);
    }
}
