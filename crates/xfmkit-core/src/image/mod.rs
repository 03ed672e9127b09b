//! Image references consumed by coordinate adapters.
//!
//! Only the geometry of an image matters here: its affine and its shape.
//! Voxel data never enters this crate.

pub mod trait_;
pub mod geometry;

pub use trait_::SpatialReference;
pub use geometry::ImageGeometry;
