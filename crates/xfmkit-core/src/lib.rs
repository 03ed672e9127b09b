//! Spatial primitives shared by the xfmkit transform readers and writers.
//!
//! Provides the 4×4 affine alias, voxel-size derivation, the image
//! reference seam used by coordinate adapters, and the error type.

pub mod error;
pub mod image;
pub mod spatial;

pub use error::{Result, TransformError};
pub use image::{ImageGeometry, SpatialReference};
pub use spatial::{Affine, Spacing3};
