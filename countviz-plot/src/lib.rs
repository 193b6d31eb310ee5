//! SVG rendering for countviz: annotated heatmaps and dendrograms.
//!
//! Everything draws through the [`plotters`] SVG backend. A [`Heatmap`] is
//! configured with a builder, optionally reordered by row/column
//! [`Dendrogram`]s, colored through a [`ColorRamp`] with linear or
//! quantile [`Breaks`], and decorated with design-table annotation tracks.
//!
//! [`Dendrogram`]: countviz_cluster::Dendrogram

pub mod color;
pub mod dendrogram_plot;
pub mod errors;
pub mod heatmap;
pub mod tree_layout;

// re-exports
pub use color::{Breaks, ColorRamp, categorical_palette};
pub use dendrogram_plot::render_dendrogram;
pub use errors::PlotError;
pub use heatmap::{AnnotationTrack, BreakMode, Heatmap};
