use anyhow::{Context, Result};
use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};
use nifti::NiftiHeader;
use std::path::Path;
use xfmkit_core::spatial::compose;
use xfmkit_core::{Affine, ImageGeometry};

/// Read the geometry (affine and shape) of a NIfTI image.
///
/// Only the header is read, so this works on multi-gigabyte series and on
/// files whose voxel data is truncated.
///
/// # Arguments
/// * `path` - Path to a `.nii` or `.nii.gz` file
///
/// # Returns
/// The image geometry; voxel data is never read
pub fn read_geometry<P: AsRef<Path>>(path: P) -> Result<ImageGeometry> {
    let path = path.as_ref();
    let header = NiftiHeader::from_file(path)
        .with_context(|| format!("Failed to read NIfTI header {}", path.display()))?;

    let ndim = header.dim[0] as usize;
    if ndim == 0 || ndim > 7 {
        anyhow::bail!("Invalid NIfTI dimensionality {} in {}", ndim, path.display());
    }
    let shape: Vec<usize> = header.dim[1..=ndim].iter().map(|&d| d as usize).collect();

    Ok(ImageGeometry::new(affine_from_header(&header), shape))
}

/// Voxel-to-world affine of a NIfTI header.
///
/// Sform wins over qform; with neither set, only pixdim scaling is used.
pub fn affine_from_header(header: &NiftiHeader) -> Affine {
    let pixdim = Vector3::new(
        header.pixdim[1] as f64,
        header.pixdim[2] as f64,
        header.pixdim[3] as f64,
    );

    if header.sform_code > 0 {
        let rows = [header.srow_x, header.srow_y, header.srow_z];
        let linear = Matrix3::from_fn(|i, j| rows[i][j] as f64);
        let offset = Vector3::from_fn(|i, _| rows[i][3] as f64);
        compose(&linear, &offset)
    } else if header.qform_code > 0 {
        let (b, c, d) = (
            header.quatern_b as f64,
            header.quatern_c as f64,
            header.quatern_d as f64,
        );
        // The header stores only the vector part of a unit quaternion.
        let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();
        let rotation = UnitQuaternion::from_quaternion(Quaternion::new(a, b, c, d));

        // qfac = -1 mirrors the slice axis
        let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
        let spacing = Vector3::new(pixdim[0], pixdim[1], pixdim[2] * qfac);

        let linear = rotation.to_rotation_matrix().matrix() * Matrix3::from_diagonal(&spacing);
        let offset = Vector3::new(
            header.quatern_x as f64,
            header.quatern_y as f64,
            header.quatern_z as f64,
        );
        compose(&linear, &offset)
    } else {
        compose(&Matrix3::from_diagonal(&pixdim), &Vector3::zeros())
    }
}
