//! Ordered series of FSL transforms, one per volume.
//!
//! Series text is a sequence of matrix blocks separated by blank lines. On
//! disk a single transform is one file; longer series are split into
//! `<path>.000`, `<path>.001`, ...

use std::fmt;
use std::fs;
use std::io::Read;
use std::ops::Index;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result as IoResult};
use xfmkit_core::{Affine, Result, SpatialReference, TransformError};

use super::linear::FslLinearTransform;
use crate::text::FormatConfig;

/// Digits in the zero-padded index suffix of split series files.
pub const SERIES_INDEX_WIDTH: usize = 3;

const MATRIX_LEN: usize = 16;

/// A series of FSL affines indexed by volume/timepoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FslLinearTransformArray {
    xforms: Vec<FslLinearTransform>,
}

impl FslLinearTransformArray {
    /// Create a series from transforms in volume order.
    pub fn new(xforms: Vec<FslLinearTransform>) -> Self {
        Self { xforms }
    }

    /// The transforms in volume order.
    pub fn xforms(&self) -> &[FslLinearTransform] {
        &self.xforms
    }

    pub fn len(&self) -> usize {
        self.xforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xforms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FslLinearTransform> {
        self.xforms.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FslLinearTransform> {
        self.xforms.iter()
    }

    /// Append a transform for the next volume.
    pub fn push(&mut self, xform: FslLinearTransform) {
        self.xforms.push(xform);
    }

    /// Build one FSL transform per RAS+ affine, keeping their order.
    pub fn from_ras<M, R>(ras: &[Affine], moving: &M, reference: &R) -> Result<Self>
    where
        M: SpatialReference + ?Sized,
        R: SpatialReference + ?Sized,
    {
        let xforms = ras
            .iter()
            .map(|slab| FslLinearTransform::from_ras(slab, moving, reference))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!("Converted {} RAS+ affines to FSL parameters", xforms.len());
        Ok(Self { xforms })
    }

    /// Convert every transform to RAS+, one affine per volume.
    pub fn to_ras<M, R>(&self, moving: &M, reference: &R) -> Result<Vec<Affine>>
    where
        M: SpatialReference + ?Sized,
        R: SpatialReference + ?Sized,
    {
        self.xforms
            .iter()
            .map(|xfm| xfm.to_ras(moving, reference))
            .collect()
    }

    /// Render every transform, separated by one blank line.
    pub fn to_string_with(&self, config: &FormatConfig) -> String {
        let blocks: Vec<String> = self
            .xforms
            .iter()
            .map(|xfm| xfm.to_string_with(config))
            .collect();
        blocks.join("\n")
    }

    /// Parse series text.
    ///
    /// Blank lines separate transforms. A block is normally one 4×4 matrix;
    /// a block whose lines each hold a full matrix on one line yields one
    /// transform per line.
    pub fn from_string(text: &str) -> Result<Self> {
        let mut xforms = Vec::new();
        for block in blocks(text) {
            if block.len() > 1
                && block
                    .iter()
                    .all(|line| line.split_whitespace().count() == MATRIX_LEN)
            {
                for line in &block {
                    xforms.push(FslLinearTransform::from_string(line)?);
                }
            } else {
                xforms.push(FslLinearTransform::from_string(&block.join("\n"))?);
            }
        }
        Ok(Self { xforms })
    }

    /// Read the whole stream and parse it as series text.
    pub fn from_fileobj<T: Read>(mut reader: T) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::from_string(&text)
    }

    /// Read a series from `path`, or from `path.000`, `path.001`, ... when
    /// `path` itself does not exist.
    pub fn from_filename<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read FSL series {}", path.display()))?;
            return Self::from_string(&text)
                .with_context(|| format!("Failed to parse FSL series {}", path.display()));
        }

        let mut xforms: Vec<FslLinearTransform> = Vec::new();
        loop {
            let part = indexed_path(path, xforms.len());
            if !part.exists() {
                break;
            }
            xforms.push(FslLinearTransform::from_filename(&part)?);
        }

        if xforms.is_empty() {
            anyhow::bail!(
                "No FSL matrix found at {} or {}",
                path.display(),
                indexed_path(path, 0).display()
            );
        }
        tracing::debug!("Read {} FSL matrices from {}.*", xforms.len(), path.display());
        Ok(Self { xforms })
    }

    /// Write the series to disk.
    ///
    /// One transform is written to `path` itself; more are written to
    /// `path.000`, `path.001`, ... in order, one file at a time. An empty
    /// series writes nothing.
    pub fn to_filename<P: AsRef<Path>>(&self, path: P) -> IoResult<()> {
        let path = path.as_ref();
        match self.xforms.as_slice() {
            [] => {
                tracing::warn!("Empty FSL series, nothing written to {}", path.display());
                Ok(())
            }
            [single] => single.to_filename(path),
            xforms => {
                for (i, xfm) in xforms.iter().enumerate() {
                    let part = indexed_path(path, i);
                    fs::write(&part, xfm.to_string())
                        .with_context(|| format!("Failed to write FSL matrix {}", part.display()))?;
                }
                tracing::debug!("Wrote {} FSL matrices to {}.*", xforms.len(), path.display());
                Ok(())
            }
        }
    }
}

/// `<path>.%03d`; indices past 999 simply get wider.
fn indexed_path(base: &Path, index: usize) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(format!(".{:0width$}", index, width = SERIES_INDEX_WIDTH));
    PathBuf::from(name)
}

/// Group the non-blank lines of `text` into blank-line separated blocks.
fn blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

impl fmt::Display for FslLinearTransformArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(&FormatConfig::default()))
    }
}

impl FromStr for FslLinearTransformArray {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_string(s)
    }
}

impl Index<usize> for FslLinearTransformArray {
    type Output = FslLinearTransform;

    fn index(&self, index: usize) -> &Self::Output {
        &self.xforms[index]
    }
}

impl FromIterator<FslLinearTransform> for FslLinearTransformArray {
    fn from_iter<I: IntoIterator<Item = FslLinearTransform>>(iter: I) -> Self {
        Self {
            xforms: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FslLinearTransformArray {
    type Item = FslLinearTransform;
    type IntoIter = std::vec::IntoIter<FslLinearTransform>;

    fn into_iter(self) -> Self::IntoIter {
        self.xforms.into_iter()
    }
}

impl<'a> IntoIterator for &'a FslLinearTransformArray {
    type Item = &'a FslLinearTransform;
    type IntoIter = std::slice::Iter<'a, FslLinearTransform>;

    fn into_iter(self) -> Self::IntoIter {
        self.xforms.iter()
    }
}
