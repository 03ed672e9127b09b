//! SpatialReference trait for read-only image descriptors.

use crate::spatial::{voxel_sizes, Affine, Spacing3};

/// Read-only geometry of an image on disk or in memory.
///
/// Implementors expose the voxel-to-world affine and the integer extent of
/// each axis. Transform conversions borrow references and never mutate them.
pub trait SpatialReference {
    /// Voxel-to-RAS+ affine.
    fn affine(&self) -> &Affine;

    /// Extent along each axis, fastest-varying (x) first.
    fn shape(&self) -> &[usize];

    /// Per-axis voxel sizes derived from the affine.
    fn voxel_sizes(&self) -> Spacing3 {
        voxel_sizes(self.affine())
    }
}

impl<T: SpatialReference + ?Sized> SpatialReference for &T {
    fn affine(&self) -> &Affine {
        (**self).affine()
    }

    fn shape(&self) -> &[usize] {
        (**self).shape()
    }

    fn voxel_sizes(&self) -> Spacing3 {
        (**self).voxel_sizes()
    }
}
