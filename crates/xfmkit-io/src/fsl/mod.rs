//! FSL linear transforms.
//!
//! FSL stores affines in scaled voxel coordinates with the x axis flipped
//! for neurological images. This module converts those matrices to and from
//! RAS+ world affines and reads/writes FSL's plain-text `.mat` layout.

pub mod adapt;
pub mod linear;
pub mod array;

pub use adapt::fsl_adapt;
pub use linear::FslLinearTransform;
pub use array::{FslLinearTransformArray, SERIES_INDEX_WIDTH};
