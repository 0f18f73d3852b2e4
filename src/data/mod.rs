//! Data acquisition boundary: loading persisted price series and aligning
//! them into per-asset-class matrices.

pub mod matrix;
pub mod store;

pub use matrix::AlignedMatrix;
pub use store::SeriesStore;
