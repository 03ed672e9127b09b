pub mod fsl;
pub mod nifti_io;
pub mod text;

pub use fsl::{fsl_adapt, FslLinearTransform, FslLinearTransformArray};
pub use nifti_io::{affine_from_header, read_geometry};
pub use text::FormatConfig;
