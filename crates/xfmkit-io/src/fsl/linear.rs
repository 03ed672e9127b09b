//! Single FSL affine (`.mat`) transform.

use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result as IoResult};
use xfmkit_core::spatial::{invert, swap_leading_axes};
use xfmkit_core::{Affine, Result, SpatialReference};

use super::adapt::fsl_adapt;
use crate::text::{format_general, parse_exact, FormatConfig};

/// An affine in FSL's native parameter layout.
///
/// FSL maps reference coordinates to moving coordinates in scaled voxel
/// space, so converting to RAS+ needs the geometry of both images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FslLinearTransform {
    parameters: Affine,
}

impl Default for FslLinearTransform {
    /// An empty (all zero) parameter block.
    fn default() -> Self {
        Self {
            parameters: Affine::zeros(),
        }
    }
}

impl FslLinearTransform {
    /// Wrap a matrix already in FSL's layout.
    pub fn new(parameters: Affine) -> Self {
        Self { parameters }
    }

    /// The matrix in FSL's layout.
    pub fn parameters(&self) -> &Affine {
        &self.parameters
    }

    /// Build the FSL matrix for a RAS+ affine mapping `moving` onto `reference`.
    ///
    /// # Arguments
    /// * `ras` - World-space affine
    /// * `moving` - Geometry of the image being aligned
    /// * `reference` - Geometry of the target image
    ///
    /// # Errors
    /// Returns `SingularMatrix` if either image affine or the composed
    /// matrix cannot be inverted.
    pub fn from_ras<M, R>(ras: &Affine, moving: &M, reference: &R) -> Result<Self>
    where
        M: SpatialReference + ?Sized,
        R: SpatialReference + ?Sized,
    {
        let pre = reference_factor(reference)?;
        let post = moving_factor(moving)?;

        let composed = swap_leading_axes(&(post * ras * pre));
        let parameters = invert(&composed, "composed FSL matrix")?.transpose();

        tracing::debug!("Converted RAS+ affine to FSL parameters");
        Ok(Self { parameters })
    }

    /// Recover the RAS+ affine for the same `moving`/`reference` pair.
    ///
    /// Inverse of [`FslLinearTransform::from_ras`].
    pub fn to_ras<M, R>(&self, moving: &M, reference: &R) -> Result<Affine>
    where
        M: SpatialReference + ?Sized,
        R: SpatialReference + ?Sized,
    {
        let pre = reference_factor(reference)?;
        let post = moving_factor(moving)?;

        let inverted = invert(&self.parameters.transpose(), "FSL parameters")?;
        let composed = swap_leading_axes(&inverted);

        let post_inv = invert(&post, "moving image factor")?;
        let pre_inv = invert(&pre, "reference image factor")?;
        Ok(post_inv * composed * pre_inv)
    }

    /// Render as four lines of four `%g` values at the configured precision.
    pub fn to_string_with(&self, config: &FormatConfig) -> String {
        let mut out = String::new();
        for row in self.parameters.row_iter() {
            let line: Vec<String> = row
                .iter()
                .map(|&v| format_general(v, config.precision))
                .collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }

    /// Parse sixteen whitespace-separated numbers in row-major order.
    pub fn from_string(text: &str) -> Result<Self> {
        let values = parse_exact::<16>(text)?;
        Ok(Self {
            parameters: Affine::from_row_slice(&values),
        })
    }

    /// Read the whole stream and parse it as one transform.
    pub fn from_fileobj<T: Read>(mut reader: T) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::from_string(&text)
    }

    /// Read a transform from a `.mat` file.
    pub fn from_filename<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read FSL matrix {}", path.display()))?;
        Self::from_string(&text)
            .with_context(|| format!("Failed to parse FSL matrix {}", path.display()))
    }

    /// Write this transform to a `.mat` file.
    pub fn to_filename<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string())
            .with_context(|| format!("Failed to write FSL matrix {}", path.display()))?;
        tracing::debug!("Wrote FSL matrix to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for FslLinearTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(&FormatConfig::default()))
    }
}

impl FromStr for FslLinearTransform {
    type Err = xfmkit_core::TransformError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

/// `reference.affine · scale⁻¹ · swap⁻¹`
fn reference_factor<R: SpatialReference + ?Sized>(reference: &R) -> Result<Affine> {
    let (swap, scale) = fsl_adapt(reference);
    let scale_inv = invert(&scale, "reference voxel scale")?;
    let swap_inv = invert(&swap, "reference axis swap")?;
    Ok(reference.affine() * scale_inv * swap_inv)
}

/// `swap⁻¹ · scale · moving.affine⁻¹`
fn moving_factor<M: SpatialReference + ?Sized>(moving: &M) -> Result<Affine> {
    let (swap, scale) = fsl_adapt(moving);
    let swap_inv = invert(&swap, "moving axis swap")?;
    let affine_inv = invert(moving.affine(), "moving affine")?;
    Ok(swap_inv * scale * affine_inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;
    use xfmkit_core::{ImageGeometry, Spacing3, TransformError};

    fn assert_close(a: &Affine, b: &Affine, eps: f64) {
        for i in 0..4 {
            for j in 0..4 {
                assert!(
                    (a[(i, j)] - b[(i, j)]).abs() < eps,
                    "mismatch at ({}, {}): {} vs {}",
                    i, j, a[(i, j)], b[(i, j)]
                );
            }
        }
    }

    fn translation(x: f64, y: f64, z: f64) -> Affine {
        let mut m = Affine::identity();
        m[(0, 3)] = x;
        m[(1, 3)] = y;
        m[(2, 3)] = z;
        m
    }

    #[test]
    fn test_identity_same_radiological_image() {
        // No flip and unit voxels: FSL space equals voxel space, and an
        // identity world transform stays the identity.
        let affine = Affine::from_diagonal(&Vector4::new(-1.0, 1.0, 1.0, 1.0));
        let image = ImageGeometry::new(affine, [10, 10, 10]);

        let xfm = FslLinearTransform::from_ras(&Affine::identity(), &image, &image).unwrap();
        assert_close(xfm.parameters(), &Affine::identity(), 1e-12);
    }

    #[test]
    fn test_translation_neurological_image() {
        // The x flip turns +4 into -4 in FSL space; the stored matrix is
        // the inverse of that, back to +4.
        let image = ImageGeometry::from_spacing(Spacing3::new(2.0, 2.0, 2.0), [10, 10, 10]);
        let ras = translation(4.0, 0.0, 0.0);

        let xfm = FslLinearTransform::from_ras(&ras, &image, &image).unwrap();
        let expected = translation(4.0, 0.0, 0.0);
        assert_close(xfm.parameters(), &expected, 1e-12);
    }

    #[test]
    fn test_translation_radiological_image() {
        let affine = Affine::from_diagonal(&Vector4::new(-2.0, 2.0, 2.0, 1.0));
        let image = ImageGeometry::new(affine, [10, 10, 10]);
        let ras = translation(4.0, 6.0, -8.0);

        let xfm = FslLinearTransform::from_ras(&ras, &image, &image).unwrap();
        let expected = translation(4.0, -6.0, 8.0);
        assert_close(xfm.parameters(), &expected, 1e-12);
    }

    #[test]
    #[rustfmt::skip]
    fn test_ras_roundtrip() {
        let moving = ImageGeometry::new(
            Affine::new(
                -1.2, 0.1, 0.0, 80.0,
                0.0, 1.2, 0.2, -110.0,
                0.05, 0.0, 3.0, -40.0,
                0.0, 0.0, 0.0, 1.0,
            ),
            [128, 128, 40],
        );
        let reference = ImageGeometry::from_spacing(Spacing3::new(2.0, 2.0, 2.0), [91, 109, 91]);
        let ras = Affine::new(
            0.98, -0.17, 0.02, 3.5,
            0.17, 0.98, 0.01, -2.0,
            -0.02, 0.0, 1.01, 7.25,
            0.0, 0.0, 0.0, 1.0,
        );

        let xfm = FslLinearTransform::from_ras(&ras, &moving, &reference).unwrap();
        let recovered = xfm.to_ras(&moving, &reference).unwrap();
        assert_close(&recovered, &ras, 1e-10);
    }

    #[test]
    fn test_singular_moving_affine() {
        let moving = ImageGeometry::new(Affine::zeros(), [4, 4, 4]);
        let reference = ImageGeometry::from_spacing(Spacing3::new(1.0, 1.0, 1.0), [4, 4, 4]);

        let err = FslLinearTransform::from_ras(&Affine::identity(), &moving, &reference)
            .unwrap_err();
        assert!(matches!(err, TransformError::SingularMatrix(_)));
    }

    #[test]
    fn test_empty_transform_cannot_convert() {
        let image = ImageGeometry::from_spacing(Spacing3::new(1.0, 1.0, 1.0), [4, 4, 4]);
        let err = FslLinearTransform::default().to_ras(&image, &image).unwrap_err();
        assert!(matches!(err, TransformError::SingularMatrix(_)));
    }

    #[test]
    fn test_to_string_layout() {
        let mut m = Affine::identity();
        m[(0, 3)] = -18.0;
        m[(1, 2)] = 0.5;
        let text = FslLinearTransform::new(m).to_string();
        assert_eq!(text, "1 0 0 -18\n0 1 0.5 0\n0 0 1 0\n0 0 0 1\n");
    }

    #[test]
    fn test_to_string_with_precision() {
        let mut m = Affine::identity();
        m[(0, 0)] = std::f64::consts::PI;
        let xfm = FslLinearTransform::new(m);

        let short = xfm.to_string_with(&FormatConfig::new().with_precision(3));
        assert!(short.starts_with("3.14 0 0 0\n"));

        let long = xfm.to_string_with(&FormatConfig::new().with_precision(10));
        assert!(long.starts_with("3.141592654 0 0 0\n"));
    }

    #[test]
    fn test_from_string_row_major() {
        let text = "1 2 3 4\n5 6 7 8\n9 10 11 12\n0 0 0 1\n";
        let xfm = FslLinearTransform::from_string(text).unwrap();
        assert_eq!(xfm.parameters()[(0, 1)], 2.0);
        assert_eq!(xfm.parameters()[(1, 0)], 5.0);
        assert_eq!(xfm.parameters()[(2, 3)], 12.0);
        assert_eq!(xfm.parameters()[(3, 3)], 1.0);
    }

    #[test]
    fn test_from_string_single_line() {
        let xfm: FslLinearTransform = "1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1".parse().unwrap();
        assert_eq!(*xfm.parameters(), Affine::identity());
    }

    #[test]
    fn test_from_string_wrong_count() {
        let err = FslLinearTransform::from_string("1 0 0\n0 1 0\n0 0 1\n").unwrap_err();
        assert!(matches!(err, TransformError::TokenCount { expected: 16, actual: 9 }));
    }

    #[test]
    fn test_from_string_non_numeric() {
        let text = "1 0 0 0\n0 1 0 0\n0 0 one 0\n0 0 0 1\n";
        let err = FslLinearTransform::from_string(text).unwrap_err();
        assert!(matches!(err, TransformError::Parse(_)));
    }

    #[test]
    #[rustfmt::skip]
    fn test_text_roundtrip() {
        let m = Affine::new(
            0.5, -0.25, 0.0, 12.5,
            0.125, 1.0, 0.0, -3.0,
            0.0, 0.0, 2.0, 1e-05,
            0.0, 0.0, 0.0, 1.0,
        );
        let xfm = FslLinearTransform::new(m);
        let parsed = FslLinearTransform::from_string(&xfm.to_string()).unwrap();
        assert_eq!(parsed, xfm);
    }

    #[test]
    fn test_from_fileobj() {
        let text = b"1 0 0 5\n0 1 0 6\n0 0 1 7\n0 0 0 1\n";
        let xfm = FslLinearTransform::from_fileobj(&text[..]).unwrap();
        assert_eq!(xfm.parameters()[(1, 3)], 6.0);
    }
}
