use thiserror::Error;

#[derive(Error, Debug)]
pub enum CountMatrixError {
    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Line {line}: can't parse '{token}' as a number")]
    NonNumericValue { line: usize, token: String },

    #[error("Line {line}: expected {expected} value fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Header has {header} fields but data rows have {data} value fields")]
    HeaderMismatch { header: usize, data: usize },

    #[error("Duplicate feature name: {0}")]
    DuplicateFeature(String),

    #[error("Corrupted file. No data rows found in: {0}")]
    EmptyMatrix(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DesignError {
    #[error("Design table has no factor columns: {0}")]
    NoFactors(String),

    #[error("Line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unknown factor: {0}")]
    UnknownFactor(String),

    #[error("Sample '{0}' not present in the design table")]
    UnknownSample(String),

    #[error("Corrupted file. No sample rows found in: {0}")]
    EmptyDesign(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
