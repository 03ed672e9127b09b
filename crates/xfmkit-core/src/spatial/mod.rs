//! Spatial types for affine matrices and voxel spacing.
//!
//! All types are nalgebra aliases so every nalgebra operation stays available.

pub mod affine;
pub mod spacing;

pub use affine::{compose, invert, swap_leading_axes, Affine};
pub use spacing::{voxel_sizes, Spacing3};
