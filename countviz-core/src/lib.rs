//! Core data models for working with genomic count tables.
//!
//! This crate provides the two entities everything else in countviz is built
//! on:
//!
//! - [`CountMatrix`]: a dense numeric table (rows = genomic features,
//!   columns = samples) parsed from a whitespace-delimited text file
//! - [`DesignTable`]: a tab-delimited experimental-design table (rows =
//!   samples, columns = factors such as condition or timepoint) used to
//!   annotate plots
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use countviz_core::models::CountMatrix;
//!
//! let counts = CountMatrix::try_from(Path::new("counts.txt")).unwrap();
//! println!("{} features x {} samples", counts.n_features(), counts.n_samples());
//! ```

pub mod errors;
pub mod models;
pub mod utils;

// re-exports
pub use models::{CountMatrix, DesignTable};
