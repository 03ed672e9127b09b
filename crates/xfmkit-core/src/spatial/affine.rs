//! Homogeneous 4×4 affine matrices.

use nalgebra::{Matrix3, Matrix4, Vector3};

use crate::error::{Result, TransformError};

/// A linear spatial transform in homogeneous coordinates.
///
/// The bottom row is conventionally `[0, 0, 0, 1]`; nothing here enforces it.
pub type Affine = Matrix4<f64>;

/// Assemble an affine from its 3×3 linear block and translation column.
pub fn compose(linear: &Matrix3<f64>, translation: &Vector3<f64>) -> Affine {
    let mut affine = Affine::identity();
    affine.fixed_view_mut::<3, 3>(0, 0).copy_from(linear);
    affine.fixed_view_mut::<3, 1>(0, 3).copy_from(translation);
    affine
}

/// Invert an affine, naming the matrix in the error when it is singular.
pub fn invert(matrix: &Affine, what: &str) -> Result<Affine> {
    matrix
        .try_inverse()
        .ok_or_else(|| TransformError::singular(format!("cannot invert {what}: {matrix}")))
}

/// Swap the first two axes of a 4×4 matrix.
///
/// For a rank-2 array this is the plain transpose.
pub fn swap_leading_axes(matrix: &Affine) -> Affine {
    matrix.transpose()
}
