//! Voxel spacing derived from an image affine.
//!
//! Spacing is the physical distance between adjacent voxels along each
//! spatial axis.

use nalgebra::Vector3;

use super::Affine;

/// Voxel spacing along the three spatial axes.
pub type Spacing3 = Vector3<f64>;

/// Compute voxel sizes as the column norms of the affine's 3×3 linear block.
///
/// Shears and rotations do not change the result; only the length of each
/// axis vector in physical space matters.
pub fn voxel_sizes(affine: &Affine) -> Spacing3 {
    let linear = affine.fixed_view::<3, 3>(0, 0);
    Spacing3::new(
        linear.column(0).norm(),
        linear.column(1).norm(),
        linear.column(2).norm(),
    )
}
