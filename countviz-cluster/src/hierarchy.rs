use std::str::FromStr;

use crate::distance::DistanceMatrix;
use crate::errors::ClusterError;

/// Linkage criterion for merging clusters during agglomeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Linkage {
    Single,
    Complete,
    Average,
}

impl FromStr for Linkage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Linkage::Single),
            "complete" => Ok(Linkage::Complete),
            "average" => Ok(Linkage::Average),
            _ => Err(format!(
                "Invalid linkage: {} (expected single, complete, or average)",
                s
            )),
        }
    }
}

/// One agglomeration step. `a` and `b` are cluster ids: `0..n_leaves` are
/// leaves, `n_leaves + t` is the cluster created by merge step `t`.
#[derive(Clone, Debug)]
pub struct Merge {
    pub a: usize,
    pub b: usize,
    pub height: f64,
    pub size: usize,
}

///
/// A hierarchical clustering tree over n observations, built by naive
/// agglomeration from a precomputed [DistanceMatrix]. n - 1 merges total;
/// the last merge is the root.
///
#[derive(Clone, Debug)]
pub struct Dendrogram {
    n_leaves: usize,
    merges: Vec<Merge>,
}

impl Dendrogram {
    ///
    /// Agglomerate observations bottom-up. Every observation starts as its
    /// own cluster; at each step the two clusters at minimum linkage
    /// distance are merged, until one cluster remains.
    ///
    pub fn build(dist: &DistanceMatrix, linkage: Linkage) -> Result<Dendrogram, ClusterError> {
        let n = dist.n();
        if n == 0 {
            return Err(ClusterError::EmptyInput);
        }

        // active clusters: (id, member leaves)
        let mut clusters: Vec<(usize, Vec<usize>)> = (0..n).map(|i| (i, vec![i])).collect();
        let mut merges: Vec<Merge> = Vec::with_capacity(n.saturating_sub(1));

        while clusters.len() > 1 {
            let mut best = (0usize, 1usize, f64::INFINITY);

            for i in 0..clusters.len() {
                for j in (i + 1)..clusters.len() {
                    let d = linkage_distance(dist, &clusters[i].1, &clusters[j].1, linkage);
                    if d < best.2 {
                        best = (i, j, d);
                    }
                }
            }

            let (i, j, height) = best;
            let (id_b, members_b) = clusters.remove(j);
            let (id_a, members_a) = clusters[i].clone();

            let mut merged = members_a;
            merged.extend_from_slice(&members_b);
            let size = merged.len();
            let new_id = n + merges.len();
            clusters[i] = (new_id, merged);

            merges.push(Merge {
                a: id_a,
                b: id_b,
                height,
                size,
            });
        }

        Ok(Dendrogram { n_leaves: n, merges })
    }

    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Height of the root merge; 0.0 for a single-leaf tree.
    pub fn max_height(&self) -> f64 {
        self.merges.last().map(|m| m.height).unwrap_or(0.0)
    }

    /// Left-to-right ordering of the leaves, the order a heatmap uses to
    /// lay out clustered rows or columns.
    pub fn leaf_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.n_leaves);
        self.collect_leaves(self.root_id(), &mut order);
        order
    }

    fn root_id(&self) -> usize {
        if self.merges.is_empty() {
            0
        } else {
            self.n_leaves + self.merges.len() - 1
        }
    }

    fn collect_leaves(&self, id: usize, out: &mut Vec<usize>) {
        if id < self.n_leaves {
            out.push(id);
        } else {
            let merge = &self.merges[id - self.n_leaves];
            self.collect_leaves(merge.a, out);
            self.collect_leaves(merge.b, out);
        }
    }

    ///
    /// Cut the tree into exactly `k` flat clusters. Labels run `0..k`,
    /// numbered by the leftmost leaf of each cluster so label 0 is the
    /// leftmost group in the dendrogram.
    ///
    pub fn cut(&self, k: usize) -> Result<Vec<usize>, ClusterError> {
        let n = self.n_leaves;
        if k == 0 || k > n {
            return Err(ClusterError::InvalidClusterCount { k, n });
        }

        // Replay the first n - k merges; the clusters left standing are the
        // partition.
        let mut assignment: Vec<usize> = (0..n).collect();
        for (t, merge) in self.merges.iter().take(n - k).enumerate() {
            let new_id = n + t;
            let mut members = self.assigned_leaves(merge.a, &assignment);
            members.extend(self.assigned_leaves(merge.b, &assignment));
            for leaf in members {
                assignment[leaf] = new_id;
            }
        }

        // Renumber surviving cluster ids in leaf order.
        let mut labels = vec![0usize; n];
        let mut seen: Vec<usize> = Vec::with_capacity(k);
        for leaf in self.leaf_order() {
            let id = assignment[leaf];
            let label = match seen.iter().position(|&s| s == id) {
                Some(pos) => pos,
                None => {
                    seen.push(id);
                    seen.len() - 1
                }
            };
            labels[leaf] = label;
        }

        Ok(labels)
    }

    fn assigned_leaves(&self, id: usize, assignment: &[usize]) -> Vec<usize> {
        if id < self.n_leaves {
            vec![id]
        } else {
            // all leaves currently assigned to this internal id
            assignment
                .iter()
                .enumerate()
                .filter(|&(_, &a)| a == id)
                .map(|(leaf, _)| leaf)
                .collect()
        }
    }
}

fn linkage_distance(
    dist: &DistanceMatrix,
    a: &[usize],
    b: &[usize],
    linkage: Linkage,
) -> f64 {
    match linkage {
        Linkage::Single => a
            .iter()
            .flat_map(|&x| b.iter().map(move |&y| dist.get(x, y)))
            .fold(f64::INFINITY, f64::min),
        Linkage::Complete => a
            .iter()
            .flat_map(|&x| b.iter().map(move |&y| dist.get(x, y)))
            .fold(f64::NEG_INFINITY, f64::max),
        Linkage::Average => {
            let total: f64 = a
                .iter()
                .flat_map(|&x| b.iter().map(move |&y| dist.get(x, y)))
                .sum();
            total / (a.len() * b.len()) as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::distance::DistanceMetric;
    use ndarray::array;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn two_blob_tree(linkage: Linkage) -> Dendrogram {
        // two tight groups far apart: {0, 1, 2} near the origin, {3, 4} near 10
        let data = array![
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.2],
            [10.0, 10.0],
            [10.1, 10.0]
        ];
        let dist = DistanceMatrix::from_rows(data.view(), DistanceMetric::Euclidean).unwrap();
        Dendrogram::build(&dist, linkage).unwrap()
    }

    #[rstest]
    #[case(Linkage::Single)]
    #[case(Linkage::Complete)]
    #[case(Linkage::Average)]
    fn test_cut_recovers_blobs(#[case] linkage: Linkage) {
        let tree = two_blob_tree(linkage);
        let labels = tree.cut(2).unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_ne!(labels[0], labels[3]);
    }

    #[rstest]
    fn test_merge_count_and_root_height() {
        let tree = two_blob_tree(Linkage::Average);
        assert_eq!(tree.merges().len(), 4);
        // the root merge joins the two blobs, far above the within-blob merges
        assert!(tree.max_height() > 10.0);
    }

    #[rstest]
    fn test_leaf_order_is_a_permutation() {
        let tree = two_blob_tree(Linkage::Complete);
        let mut order = tree.leaf_order();
        assert_eq!(order.len(), 5);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[rstest]
    fn test_leaf_order_keeps_blobs_contiguous() {
        let tree = two_blob_tree(Linkage::Average);
        let order = tree.leaf_order();
        let labels = tree.cut(2).unwrap();
        let ordered_labels: Vec<usize> = order.iter().map(|&i| labels[i]).collect();
        // same-cluster leaves are adjacent in the layout order
        let transitions = ordered_labels.windows(2).filter(|w| w[0] != w[1]).count();
        assert_eq!(transitions, 1);
    }

    #[rstest]
    fn test_cut_label_zero_is_leftmost() {
        let tree = two_blob_tree(Linkage::Average);
        let order = tree.leaf_order();
        let labels = tree.cut(2).unwrap();
        assert_eq!(labels[order[0]], 0);
    }

    #[rstest]
    fn test_cut_every_leaf_its_own_cluster() {
        let tree = two_blob_tree(Linkage::Single);
        let labels = tree.cut(5).unwrap();
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
    }

    #[rstest]
    fn test_invalid_k_rejected() {
        let tree = two_blob_tree(Linkage::Single);
        assert!(matches!(
            tree.cut(0).unwrap_err(),
            ClusterError::InvalidClusterCount { k: 0, n: 5 }
        ));
        assert!(matches!(
            tree.cut(6).unwrap_err(),
            ClusterError::InvalidClusterCount { k: 6, n: 5 }
        ));
    }

    #[rstest]
    fn test_single_observation() {
        let data = array![[1.0, 2.0]];
        let dist = DistanceMatrix::from_rows(data.view(), DistanceMetric::Euclidean).unwrap();
        let tree = Dendrogram::build(&dist, Linkage::Average).unwrap();
        assert_eq!(tree.merges().len(), 0);
        assert_eq!(tree.leaf_order(), vec![0]);
        assert_eq!(tree.cut(1).unwrap(), vec![0]);
    }
}
