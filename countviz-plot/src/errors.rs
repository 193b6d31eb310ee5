use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Nothing to draw: matrix is empty")]
    EmptyMatrix,

    #[error("Expected {expected} {what} labels, found {found}")]
    LabelMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Dendrogram has {tree} leaves but the matrix has {matrix} {what}")]
    TreeMismatch {
        what: &'static str,
        tree: usize,
        matrix: usize,
    },

    #[error("Annotation track '{name}' has {found} values, expected {expected}")]
    AnnotationMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
