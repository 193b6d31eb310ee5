pub mod count_matrix;
pub mod design;

// re-exports
pub use count_matrix::CountMatrix;
pub use design::DesignTable;
