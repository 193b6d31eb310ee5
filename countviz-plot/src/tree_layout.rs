//! Geometry shared by the margin and standalone dendrogram renderers.

use countviz_cluster::Dendrogram;

/// A line segment in tree coordinates: x in leaf units (leaf i sits at
/// i + 0.5), y in merge-height units.
pub type Segment = ((f64, f64), (f64, f64));

#[derive(Clone, Debug)]
pub struct TreeLayout {
    pub segments: Vec<Segment>,
    pub order: Vec<usize>,
    pub max_height: f64,
}

/// Compute bracket segments for every merge: two risers from the child
/// tops up to the merge height, one crossbar joining them.
pub fn layout(tree: &Dendrogram) -> TreeLayout {
    let order = tree.leaf_order();
    let n = tree.n_leaves();

    // leaf id -> x position in layout order
    let mut leaf_x = vec![0.0f64; n];
    for (pos, &leaf) in order.iter().enumerate() {
        leaf_x[leaf] = pos as f64 + 0.5;
    }

    // (x, height) of each node's top; internal nodes appended as merges replay
    let mut node_pos: Vec<(f64, f64)> = leaf_x.iter().map(|&x| (x, 0.0)).collect();
    let mut segments = Vec::with_capacity(tree.merges().len() * 3);

    for merge in tree.merges() {
        let (xa, ha) = node_pos[merge.a];
        let (xb, hb) = node_pos[merge.b];
        let h = merge.height;

        segments.push(((xa, ha), (xa, h)));
        segments.push(((xb, hb), (xb, h)));
        segments.push(((xa, h), (xb, h)));

        node_pos.push(((xa + xb) / 2.0, h));
    }

    TreeLayout {
        segments,
        order,
        max_height: tree.max_height(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use countviz_cluster::{DistanceMatrix, DistanceMetric, Linkage};
    use ndarray::array;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_segment_count_and_bounds() {
        let data = array![[0.0], [1.0], [10.0], [11.0]];
        let dist = DistanceMatrix::from_rows(data.view(), DistanceMetric::Euclidean).unwrap();
        let tree = Dendrogram::build(&dist, Linkage::Average).unwrap();

        let layout = layout(&tree);
        // 3 merges, 3 segments each
        assert_eq!(layout.segments.len(), 9);
        assert_eq!(layout.order.len(), 4);
        for ((x1, y1), (x2, y2)) in &layout.segments {
            for x in [x1, x2] {
                assert!((0.0..=4.0).contains(x));
            }
            for y in [y1, y2] {
                assert!((0.0..=layout.max_height).contains(y));
            }
        }
    }
}
