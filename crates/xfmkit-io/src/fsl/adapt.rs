//! Coordinate adapter between RAS+ voxel space and FSL's scaled voxel space.

use xfmkit_core::{Affine, SpatialReference};

/// Compute the `(swap, scale)` pair that moves an image's voxel grid into
/// FSL's internal coordinates.
///
/// `scale` is `diag(vx, vy, vz, 1)`. `swap` is the identity unless the
/// affine has a positive determinant (neurological storage), in which case
/// the x axis is mirrored and shifted by `(nx - 1) * vx` so the flipped grid
/// keeps its extent. A singular affine has determinant 0 and is not flipped.
pub fn fsl_adapt<S>(space: &S) -> (Affine, Affine)
where
    S: SpatialReference + ?Sized,
{
    let zooms = space.voxel_sizes();
    let scale = Affine::from_diagonal(&zooms.push(1.0));

    let mut swap = Affine::identity();
    if space.affine().determinant() > 0.0 {
        // A shapeless reference has no extent to shift along x.
        let nx = space.shape().first().copied().unwrap_or(1);
        swap[(0, 0)] = -1.0;
        swap[(0, 3)] = (nx as f64 - 1.0) * zooms[0];
    }
    (swap, scale)
}
