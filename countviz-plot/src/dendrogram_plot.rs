use std::path::Path;

use plotters::prelude::*;

use countviz_cluster::Dendrogram;

use crate::errors::PlotError;
use crate::tree_layout;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 640;
const MARGIN: f64 = 30.0;
const TITLE_BAND: f64 = 50.0;
const LABEL_BAND: f64 = 90.0;
const AXIS_BAND: f64 = 60.0;

///
/// Render a standalone dendrogram to an SVG file: leaves along the x-axis
/// in the tree's leaf order, merge heights on y, bracket-style joins, leaf
/// labels underneath. The file is overwritten if it exists.
///
pub fn render_dendrogram(
    tree: &Dendrogram,
    labels: &[String],
    title: &str,
    path: &Path,
) -> Result<(), PlotError> {
    let n = tree.n_leaves();
    if n == 0 {
        return Err(PlotError::EmptyMatrix);
    }
    if labels.len() != n {
        return Err(PlotError::LabelMismatch {
            what: "leaf",
            expected: n,
            found: labels.len(),
        });
    }

    let layout = tree_layout::layout(tree);
    let max_h = if layout.max_height > 0.0 { layout.max_height } else { 1.0 };

    let plot_w = WIDTH as f64 - AXIS_BAND - MARGIN;
    let plot_h = HEIGHT as f64 - TITLE_BAND - LABEL_BAND;
    let x_scale = plot_w / n as f64;
    let y_scale = plot_h / (max_h * 1.05);

    let to_px = |leaf_x: f64, height: f64| -> (i32, i32) {
        (
            (AXIS_BAND + leaf_x * x_scale) as i32,
            (TITLE_BAND + plot_h - height * y_scale) as i32,
        )
    };

    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| PlotError::Drawing(e.to_string()))?;

    root.draw(&Text::new(
        title.to_string(),
        ((WIDTH / 2) as i32 - title.len() as i32 * 6, (TITLE_BAND / 2.0) as i32),
        ("sans-serif", 22).into_font().color(&BLACK),
    ))
    .map_err(|e| PlotError::Drawing(e.to_string()))?;

    for ((x1, h1), (x2, h2)) in &layout.segments {
        root.draw(&PathElement::new(
            vec![to_px(*x1, *h1), to_px(*x2, *h2)],
            BLACK.stroke_width(1),
        ))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    // height axis: a few round ticks up the left side
    for i in 0..=4 {
        let h = max_h * i as f64 / 4.0;
        let (_, y) = to_px(0.0, h);
        root.draw(&Text::new(
            format!("{:.1}", h),
            (4, y - 6),
            ("sans-serif", 10).into_font().color(&BLACK),
        ))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
        root.draw(&PathElement::new(
            vec![(AXIS_BAND as i32 - 6, y), (AXIS_BAND as i32, y)],
            BLACK.stroke_width(1),
        ))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    for (pos, &leaf) in layout.order.iter().enumerate() {
        let (x, _) = to_px(pos as f64 + 0.5, 0.0);
        root.draw(&Text::new(
            labels[leaf].clone(),
            (x - 12, (TITLE_BAND + plot_h) as i32 + 10),
            ("sans-serif", 11).into_font().color(&BLACK),
        ))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    root.present().map_err(|e| PlotError::Drawing(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use countviz_cluster::{DistanceMatrix, DistanceMetric, Linkage};
    use ndarray::array;
    use rstest::*;
    use tempfile::tempdir;

    #[rstest]
    fn test_render_dendrogram() {
        let data = array![[0.0, 0.0], [0.5, 0.0], [9.0, 9.0], [9.5, 9.0]];
        let dist = DistanceMatrix::from_rows(data.view(), DistanceMetric::Euclidean).unwrap();
        let tree = Dendrogram::build(&dist, Linkage::Complete).unwrap();
        let labels: Vec<String> = ["s1", "s2", "s3", "s4"].iter().map(|s| s.to_string()).collect();

        let dir = tempdir().unwrap();
        let out = dir.path().join("tree.svg");
        render_dendrogram(&tree, &labels, "sample clustering", &out).unwrap();

        let svg = std::fs::read_to_string(&out).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("s3"));
    }

    #[rstest]
    fn test_label_count_must_match() {
        let data = array![[0.0], [1.0]];
        let dist = DistanceMatrix::from_rows(data.view(), DistanceMetric::Euclidean).unwrap();
        let tree = Dendrogram::build(&dist, Linkage::Single).unwrap();

        let dir = tempdir().unwrap();
        let out = dir.path().join("tree.svg");
        let err = render_dendrogram(&tree, &["a".to_string()], "t", &out).unwrap_err();
        assert!(matches!(err, PlotError::LabelMismatch { .. }));
    }
}
