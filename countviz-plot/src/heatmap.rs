use std::path::Path;

use ndarray::ArrayView2;
use plotters::coord::Shift;
use plotters::prelude::*;

use countviz_cluster::Dendrogram;

use crate::color::{Breaks, ColorRamp, categorical_palette};
use crate::errors::PlotError;
use crate::tree_layout;

const CANVAS_WIDTH: u32 = 1200;
const BODY_WIDTH: f64 = 720.0;
const MIN_CELL_HEIGHT: f64 = 12.0;
const MIN_BODY_HEIGHT: f64 = 360.0;
const TITLE_BAND: f64 = 44.0;
const TREE_BAND: f64 = 90.0;
const TRACK_BAND: f64 = 18.0;
const LABEL_BAND: f64 = 80.0;
const KEY_WIDTH: f64 = 20.0;
const MARGIN: f64 = 12.0;

/// One categorical annotation strip above the heatmap columns, typically a
/// factor from the experimental design (condition, timepoint, ...).
#[derive(Clone, Debug)]
pub struct AnnotationTrack {
    pub name: String,
    /// One level string per matrix column, in matrix column order.
    pub values: Vec<String>,
}

/// How cell values map onto ramp positions: linearly over the value range,
/// linearly but symmetric about zero (for z-scores, so zero-variance rows
/// sit at the ramp midpoint), or over data quantiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BreakMode {
    Linear,
    Symmetric,
    Quantile,
}

///
/// Builder for an annotated heatmap rendered to SVG.
///
/// Rows and columns keep matrix order unless a [`Dendrogram`] is attached,
/// in which case the corresponding axis is reordered by the tree's leaf
/// order and the tree is drawn in the margin.
///
pub struct Heatmap<'a> {
    values: ArrayView2<'a, f64>,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    title: Option<String>,
    ramp: ColorRamp,
    break_mode: BreakMode,
    row_tree: Option<&'a Dendrogram>,
    col_tree: Option<&'a Dendrogram>,
    annotations: Vec<AnnotationTrack>,
    show_row_labels: bool,
    show_col_labels: bool,
    key_label: String,
}

impl<'a> Heatmap<'a> {
    pub fn new(
        values: ArrayView2<'a, f64>,
        row_labels: Vec<String>,
        col_labels: Vec<String>,
    ) -> Heatmap<'a> {
        Heatmap {
            values,
            row_labels,
            col_labels,
            title: None,
            ramp: ColorRamp::green_black_red(),
            break_mode: BreakMode::Linear,
            row_tree: None,
            col_tree: None,
            annotations: Vec::new(),
            show_row_labels: true,
            show_col_labels: true,
            key_label: "value".to_string(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Heatmap<'a> {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_ramp(mut self, ramp: ColorRamp) -> Heatmap<'a> {
        self.ramp = ramp;
        self
    }

    pub fn with_break_mode(mut self, mode: BreakMode) -> Heatmap<'a> {
        self.break_mode = mode;
        self
    }

    pub fn with_row_tree(mut self, tree: &'a Dendrogram) -> Heatmap<'a> {
        self.row_tree = Some(tree);
        self
    }

    pub fn with_col_tree(mut self, tree: &'a Dendrogram) -> Heatmap<'a> {
        self.col_tree = Some(tree);
        self
    }

    pub fn with_annotation(mut self, track: AnnotationTrack) -> Heatmap<'a> {
        self.annotations.push(track);
        self
    }

    pub fn show_row_labels(mut self, show: bool) -> Heatmap<'a> {
        self.show_row_labels = show;
        self
    }

    pub fn show_col_labels(mut self, show: bool) -> Heatmap<'a> {
        self.show_col_labels = show;
        self
    }

    pub fn with_key_label(mut self, label: &str) -> Heatmap<'a> {
        self.key_label = label.to_string();
        self
    }

    fn validate(&self) -> Result<(), PlotError> {
        let (n_rows, n_cols) = self.values.dim();
        if n_rows == 0 || n_cols == 0 {
            return Err(PlotError::EmptyMatrix);
        }
        if self.row_labels.len() != n_rows {
            return Err(PlotError::LabelMismatch {
                what: "row",
                expected: n_rows,
                found: self.row_labels.len(),
            });
        }
        if self.col_labels.len() != n_cols {
            return Err(PlotError::LabelMismatch {
                what: "column",
                expected: n_cols,
                found: self.col_labels.len(),
            });
        }
        if let Some(tree) = self.row_tree {
            if tree.n_leaves() != n_rows {
                return Err(PlotError::TreeMismatch {
                    what: "rows",
                    tree: tree.n_leaves(),
                    matrix: n_rows,
                });
            }
        }
        if let Some(tree) = self.col_tree {
            if tree.n_leaves() != n_cols {
                return Err(PlotError::TreeMismatch {
                    what: "columns",
                    tree: tree.n_leaves(),
                    matrix: n_cols,
                });
            }
        }
        for track in &self.annotations {
            if track.values.len() != n_cols {
                return Err(PlotError::AnnotationMismatch {
                    name: track.name.clone(),
                    expected: n_cols,
                    found: track.values.len(),
                });
            }
        }
        Ok(())
    }

    ///
    /// Render to an SVG file. The file is overwritten if it exists.
    ///
    pub fn render_svg(&self, path: &Path) -> Result<(), PlotError> {
        self.validate()?;

        let (n_rows, n_cols) = self.values.dim();
        let row_order: Vec<usize> = match self.row_tree {
            Some(tree) => tree.leaf_order(),
            None => (0..n_rows).collect(),
        };
        let col_order: Vec<usize> = match self.col_tree {
            Some(tree) => tree.leaf_order(),
            None => (0..n_cols).collect(),
        };

        let finite: Vec<f64> = self.values.iter().copied().filter(|v| v.is_finite()).collect();
        let breaks = match self.break_mode {
            BreakMode::Linear => Breaks::linear(&finite),
            BreakMode::Symmetric => Breaks::symmetric(&finite),
            BreakMode::Quantile => Breaks::quantile(&finite, 11),
        };

        // layout bands
        let top_title = if self.title.is_some() { TITLE_BAND } else { MARGIN };
        let top_tree = if self.col_tree.is_some() { TREE_BAND } else { 0.0 };
        let top_tracks = self.annotations.len() as f64 * TRACK_BAND;
        let left_tree = if self.row_tree.is_some() { TREE_BAND } else { 0.0 };
        let bottom_labels = if self.show_col_labels { LABEL_BAND } else { MARGIN };

        let body_x0 = MARGIN + left_tree;
        let body_y0 = top_title + top_tree + top_tracks;
        let body_h = (n_rows as f64 * MIN_CELL_HEIGHT).max(MIN_BODY_HEIGHT);
        let cell_w = BODY_WIDTH / n_cols as f64;
        let cell_h = body_h / n_rows as f64;
        let canvas_height = (body_y0 + body_h + bottom_labels) as u32;

        let root = SVGBackend::new(path, (CANVAS_WIDTH, canvas_height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        if let Some(title) = &self.title {
            root.draw(&Text::new(
                title.clone(),
                ((CANVAS_WIDTH / 2) as i32 - title.len() as i32 * 6, (top_title / 2.0) as i32),
                ("sans-serif", 22).into_font().color(&BLACK),
            ))
            .map_err(draw_err)?;
        }

        if let Some(tree) = self.col_tree {
            draw_column_tree(&root, tree, body_x0, top_title, BODY_WIDTH, top_tree - 6.0)?;
        }
        if let Some(tree) = self.row_tree {
            draw_row_tree(&root, tree, MARGIN, body_y0, left_tree - 6.0, body_h)?;
        }

        self.draw_annotation_tracks(&root, &col_order, body_x0, top_title + top_tree, cell_w)?;
        self.draw_cells(&root, &row_order, &col_order, &breaks, body_x0, body_y0, cell_w, cell_h)?;
        self.draw_labels(&root, &row_order, &col_order, body_x0, body_y0, cell_w, cell_h, body_h)?;
        self.draw_color_key(&root, &breaks, body_x0 + BODY_WIDTH + 10.0, body_y0, body_h)?;
        self.draw_annotation_legend(&root, body_x0 + BODY_WIDTH + 90.0, body_y0)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_cells<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        row_order: &[usize],
        col_order: &[usize],
        breaks: &Breaks,
        x0: f64,
        y0: f64,
        cell_w: f64,
        cell_h: f64,
    ) -> Result<(), PlotError> {
        for (ri, &row) in row_order.iter().enumerate() {
            for (ci, &col) in col_order.iter().enumerate() {
                let value = self.values[[row, col]];
                let t = if value.is_finite() { breaks.position(value) } else { 0.5 };
                let color = self.ramp.color_at(t);

                let x = x0 + ci as f64 * cell_w;
                let y = y0 + ri as f64 * cell_h;
                root.draw(&Rectangle::new(
                    [
                        (x as i32, y as i32),
                        ((x + cell_w).ceil() as i32, (y + cell_h).ceil() as i32),
                    ],
                    color.filled(),
                ))
                .map_err(draw_err)?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_labels<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        row_order: &[usize],
        col_order: &[usize],
        x0: f64,
        y0: f64,
        cell_w: f64,
        cell_h: f64,
        body_h: f64,
    ) -> Result<(), PlotError> {
        if self.show_row_labels {
            // thin out row labels when cells get too small to letter
            let step = (12.0 / cell_h).ceil().max(1.0) as usize;
            for (ri, &row) in row_order.iter().enumerate() {
                if ri % step != 0 {
                    continue;
                }
                let y = y0 + (ri as f64 + 0.5) * cell_h;
                root.draw(&Text::new(
                    self.row_labels[row].clone(),
                    ((x0 + BODY_WIDTH + 36.0) as i32, y as i32 - 5),
                    ("sans-serif", 10).into_font().color(&BLACK),
                ))
                .map_err(draw_err)?;
            }
        }

        if self.show_col_labels {
            for (ci, &col) in col_order.iter().enumerate() {
                let x = x0 + (ci as f64 + 0.5) * cell_w;
                root.draw(&Text::new(
                    self.col_labels[col].clone(),
                    (x as i32 - 10, (y0 + body_h + 12.0) as i32),
                    ("sans-serif", 11).into_font().color(&BLACK),
                ))
                .map_err(draw_err)?;
            }
        }
        Ok(())
    }

    fn draw_annotation_tracks<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        col_order: &[usize],
        x0: f64,
        y0: f64,
        cell_w: f64,
    ) -> Result<(), PlotError> {
        for (ti, track) in self.annotations.iter().enumerate() {
            let levels = unique_levels(&track.values);
            let colors = categorical_palette(levels.len());
            let y = y0 + ti as f64 * TRACK_BAND;

            for (ci, &col) in col_order.iter().enumerate() {
                let level_idx = levels
                    .iter()
                    .position(|l| l == &track.values[col])
                    .expect("level table built from these values");
                let x = x0 + ci as f64 * cell_w;
                root.draw(&Rectangle::new(
                    [
                        (x as i32, y as i32),
                        ((x + cell_w).ceil() as i32, (y + TRACK_BAND - 3.0) as i32),
                    ],
                    colors[level_idx].filled(),
                ))
                .map_err(draw_err)?;
            }

            root.draw(&Text::new(
                track.name.clone(),
                ((x0 - 6.0) as i32 - track.name.len() as i32 * 6, y as i32 + 2,),
                ("sans-serif", 10).into_font().color(&BLACK),
            ))
            .map_err(draw_err)?;
        }
        Ok(())
    }

    fn draw_color_key<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        breaks: &Breaks,
        x: f64,
        y0: f64,
        body_h: f64,
    ) -> Result<(), PlotError> {
        let steps = 100;
        let step_h = body_h / steps as f64;
        for i in 0..steps {
            let t = 1.0 - i as f64 / (steps - 1) as f64;
            let y = y0 + i as f64 * step_h;
            root.draw(&Rectangle::new(
                [
                    (x as i32, y as i32),
                    ((x + KEY_WIDTH) as i32, (y + step_h).ceil() as i32),
                ],
                self.ramp.color_at(t).filled(),
            ))
            .map_err(draw_err)?;
        }

        let (lo, hi) = breaks.range();
        root.draw(&Text::new(
            format!("{:.2}", hi),
            (x as i32, y0 as i32 - 12),
            ("sans-serif", 10).into_font().color(&BLACK),
        ))
        .map_err(draw_err)?;
        root.draw(&Text::new(
            format!("{:.2}", lo),
            (x as i32, (y0 + body_h) as i32 + 4),
            ("sans-serif", 10).into_font().color(&BLACK),
        ))
        .map_err(draw_err)?;
        root.draw(&Text::new(
            self.key_label.clone(),
            (x as i32, y0 as i32 - 26),
            ("sans-serif", 11).into_font().color(&BLACK),
        ))
        .map_err(draw_err)?;
        Ok(())
    }

    fn draw_annotation_legend<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        x: f64,
        y0: f64,
    ) -> Result<(), PlotError> {
        let mut y = y0;
        for track in &self.annotations {
            root.draw(&Text::new(
                track.name.clone(),
                (x as i32, y as i32),
                ("sans-serif", 12).into_font().color(&BLACK),
            ))
            .map_err(draw_err)?;
            y += 18.0;

            let levels = unique_levels(&track.values);
            let colors = categorical_palette(levels.len());
            for (level, color) in levels.iter().zip(colors.iter()) {
                root.draw(&Rectangle::new(
                    [(x as i32, y as i32), (x as i32 + 12, y as i32 + 12)],
                    color.filled(),
                ))
                .map_err(draw_err)?;
                root.draw(&Text::new(
                    level.clone(),
                    (x as i32 + 18, y as i32 + 1),
                    ("sans-serif", 11).into_font().color(&BLACK),
                ))
                .map_err(draw_err)?;
                y += 16.0;
            }
            y += 10.0;
        }
        Ok(())
    }
}

/// Unique values in first-appearance order.
fn unique_levels(values: &[String]) -> Vec<String> {
    let mut levels: Vec<String> = Vec::new();
    for v in values {
        if !levels.contains(v) {
            levels.push(v.clone());
        }
    }
    levels
}

fn draw_column_tree<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    tree: &Dendrogram,
    x0: f64,
    y0: f64,
    width: f64,
    height: f64,
) -> Result<(), PlotError> {
    let layout = tree_layout::layout(tree);
    if layout.max_height <= 0.0 {
        return Ok(());
    }
    let x_scale = width / tree.n_leaves() as f64;
    let y_scale = height / layout.max_height;

    for ((x1, h1), (x2, h2)) in &layout.segments {
        // root at the top of the band, leaves at the bottom
        let p1 = ((x0 + x1 * x_scale) as i32, (y0 + height - h1 * y_scale) as i32);
        let p2 = ((x0 + x2 * x_scale) as i32, (y0 + height - h2 * y_scale) as i32);
        root.draw(&PathElement::new(vec![p1, p2], BLACK.stroke_width(1)))
            .map_err(draw_err)?;
    }
    Ok(())
}

fn draw_row_tree<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    tree: &Dendrogram,
    x0: f64,
    y0: f64,
    width: f64,
    height: f64,
) -> Result<(), PlotError> {
    let layout = tree_layout::layout(tree);
    if layout.max_height <= 0.0 {
        return Ok(());
    }
    let y_scale = height / tree.n_leaves() as f64;
    let x_scale = width / layout.max_height;

    for ((leaf1, h1), (leaf2, h2)) in &layout.segments {
        // tree grows leftward: root at the left edge, leaves against the cells
        let p1 = ((x0 + width - h1 * x_scale) as i32, (y0 + leaf1 * y_scale) as i32);
        let p2 = ((x0 + width - h2 * x_scale) as i32, (y0 + leaf2 * y_scale) as i32);
        root.draw(&PathElement::new(vec![p1, p2], BLACK.stroke_width(1)))
            .map_err(draw_err)?;
    }
    Ok(())
}

fn draw_err<E: std::fmt::Display>(e: E) -> PlotError {
    PlotError::Drawing(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use countviz_cluster::{DistanceMatrix, DistanceMetric, Linkage};
    use ndarray::array;
    use rstest::*;
    use tempfile::tempdir;

    fn demo_matrix() -> ndarray::Array2<f64> {
        array![
            [1.0, 2.0, 8.0, 9.0],
            [1.2, 1.8, 8.5, 9.5],
            [7.0, 8.0, 1.0, 0.5],
            [6.5, 8.2, 0.8, 1.1]
        ]
    }

    fn labels(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i + 1)).collect()
    }

    #[rstest]
    fn test_render_plain_heatmap() {
        let data = demo_matrix();
        let dir = tempdir().unwrap();
        let out = dir.path().join("plain.svg");

        Heatmap::new(data.view(), labels("g", 4), labels("s", 4))
            .with_title("demo")
            .render_svg(&out)
            .unwrap();

        let meta = std::fs::metadata(&out).unwrap();
        assert!(meta.len() > 0);
    }

    #[rstest]
    fn test_render_clustered_annotated_heatmap() {
        let data = demo_matrix();
        let row_dist = DistanceMatrix::from_rows(data.view(), DistanceMetric::Euclidean).unwrap();
        let col_dist = DistanceMatrix::from_columns(data.view(), DistanceMetric::Euclidean).unwrap();
        let row_tree = Dendrogram::build(&row_dist, Linkage::Average).unwrap();
        let col_tree = Dendrogram::build(&col_dist, Linkage::Average).unwrap();

        let dir = tempdir().unwrap();
        let out = dir.path().join("clustered.svg");

        Heatmap::new(data.view(), labels("g", 4), labels("s", 4))
            .with_ramp(ColorRamp::blue_white_red())
            .with_break_mode(BreakMode::Quantile)
            .with_row_tree(&row_tree)
            .with_col_tree(&col_tree)
            .with_annotation(AnnotationTrack {
                name: "condition".to_string(),
                values: vec![
                    "control".to_string(),
                    "control".to_string(),
                    "treated".to_string(),
                    "treated".to_string(),
                ],
            })
            .render_svg(&out)
            .unwrap();

        let svg = std::fs::read_to_string(&out).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("condition"));
    }

    #[rstest]
    fn test_zscored_constant_row_sits_at_ramp_midpoint() {
        use countviz_cluster::{NormalizeAxis, zscore};

        // a no-change feature next to a skewed one; row-wise z-scoring maps
        // the constant row to zeros while the other row's z range is asymmetric
        let data = array![[5.0, 5.0, 5.0], [0.0, 1.0, 10.0]];
        let z = zscore(data.view(), NormalizeAxis::Rows);
        assert_eq!(z.row(0).to_vec(), vec![0.0, 0.0, 0.0]);

        let finite: Vec<f64> = z.iter().copied().filter(|v| v.is_finite()).collect();
        // plain linear breaks land the constant row off-center
        assert!(Breaks::linear(&finite).position(0.0) < 0.45);
        // symmetric breaks, the mode used for z-scored heatmaps, keep it centered
        assert_eq!(Breaks::symmetric(&finite).position(0.0), 0.5);

        // exercise the full render path with symmetric breaks
        let dir = tempdir().unwrap();
        let out = dir.path().join("zscored.svg");
        Heatmap::new(z.view(), labels("g", 2), labels("s", 3))
            .with_ramp(ColorRamp::blue_white_red())
            .with_break_mode(BreakMode::Symmetric)
            .with_key_label("z-score")
            .render_svg(&out)
            .unwrap();
        assert!(std::fs::metadata(&out).unwrap().len() > 0);
    }

    #[rstest]
    fn test_empty_matrix_rejected() {
        let data = ndarray::Array2::<f64>::zeros((0, 0));
        let dir = tempdir().unwrap();
        let out = dir.path().join("empty.svg");
        let err = Heatmap::new(data.view(), vec![], vec![])
            .render_svg(&out)
            .unwrap_err();
        assert!(matches!(err, PlotError::EmptyMatrix));
    }

    #[rstest]
    fn test_label_mismatch_rejected() {
        let data = demo_matrix();
        let dir = tempdir().unwrap();
        let out = dir.path().join("bad.svg");
        let err = Heatmap::new(data.view(), labels("g", 3), labels("s", 4))
            .render_svg(&out)
            .unwrap_err();
        assert!(matches!(err, PlotError::LabelMismatch { what: "row", .. }));
    }

    #[rstest]
    fn test_tree_mismatch_rejected() {
        let data = demo_matrix();
        let small = array![[0.0], [1.0]];
        let dist = DistanceMatrix::from_rows(small.view(), DistanceMetric::Euclidean).unwrap();
        let tree = Dendrogram::build(&dist, Linkage::Single).unwrap();

        let dir = tempdir().unwrap();
        let out = dir.path().join("bad.svg");
        let err = Heatmap::new(data.view(), labels("g", 4), labels("s", 4))
            .with_row_tree(&tree)
            .render_svg(&out)
            .unwrap_err();
        assert!(matches!(err, PlotError::TreeMismatch { .. }));
    }

    #[rstest]
    fn test_rerun_overwrites_output() {
        let data = demo_matrix();
        let dir = tempdir().unwrap();
        let out = dir.path().join("again.svg");

        let hm = Heatmap::new(data.view(), labels("g", 4), labels("s", 4));
        hm.render_svg(&out).unwrap();
        let first = std::fs::metadata(&out).unwrap().len();
        hm.render_svg(&out).unwrap();
        let second = std::fs::metadata(&out).unwrap().len();
        assert_eq!(first, second);
    }
}
