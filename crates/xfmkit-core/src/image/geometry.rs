//! Concrete image geometry.
//!
//! This module provides `ImageGeometry`, the plain value implementation of
//! `SpatialReference` produced by header readers and used in tests.

use serde::{Deserialize, Serialize};

use super::SpatialReference;
use crate::spatial::{Affine, Spacing3};

/// Affine plus shape of an image.
///
/// Describes how voxel indices map to RAS+ world coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    /// Voxel-to-world affine.
    affine: Affine,
    /// Extent along each axis.
    shape: Vec<usize>,
}

impl ImageGeometry {
    /// Create image geometry from an affine and a shape.
    ///
    /// # Arguments
    /// * `affine` - Voxel-to-RAS+ affine
    /// * `shape` - Extent along each axis; trailing non-spatial axes are kept
    pub fn new(affine: Affine, shape: impl Into<Vec<usize>>) -> Self {
        Self {
            affine,
            shape: shape.into(),
        }
    }

    /// Create geometry with a diagonal affine and no translation.
    pub fn from_spacing(spacing: Spacing3, shape: impl Into<Vec<usize>>) -> Self {
        let affine = Affine::from_diagonal(&spacing.push(1.0));
        Self::new(affine, shape)
    }

    /// Replace the affine.
    pub fn set_affine(&mut self, affine: Affine) {
        self.affine = affine;
    }

    /// Replace the shape.
    pub fn set_shape(&mut self, shape: impl Into<Vec<usize>>) {
        self.shape = shape.into();
    }

    /// Determinant of the affine; its sign gives the storage handedness.
    pub fn determinant(&self) -> f64 {
        self.affine.determinant()
    }
}

impl SpatialReference for ImageGeometry {
    fn affine(&self) -> &Affine {
        &self.affine
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }
}
