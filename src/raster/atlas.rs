//! Color atlas descriptor

use std::path::Path;

use crate::core::{Error, Result};

/// Pixel dimensions of the color atlas.
///
/// The mesher never reads atlas pixels; it only needs the size of one
/// texel in UV space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasInfo {
    width: u32,
    height: u32,
}

impl AtlasInfo {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidConfig(format!(
                "atlas must have non-zero dimensions, got {}x{}",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    /// Read only the image header of `path` for its dimensions
    pub fn load(path: &Path) -> Result<Self> {
        let (width, height) = image::image_dimensions(path)?;
        Self::new(width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width of one atlas column in UV space
    pub fn du(&self) -> f32 {
        1.0 / self.width as f32
    }

    /// Height of one atlas row in UV space
    pub fn dv(&self) -> f32 {
        1.0 / self.height as f32
    }
}
