//! Height rasters and windowed sample access.
//!
//! Rasters follow the texture convention: row 0 is the bottom row, so
//! images are flipped vertically when they are converted.

use std::path::Path;

use image::DynamicImage;

use crate::core::{Error, Result};

/// Pixel rectangle requested from a raster
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Shrink the rectangle so it stays inside a `width` x `height` raster.
    /// Offsets past the edge clamp to zero size.
    pub fn clamped_to(self, width: u32, height: u32) -> Self {
        Self {
            width: self.width.min(width.saturating_sub(self.x)),
            height: self.height.min(height.saturating_sub(self.y)),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Dense row-major block of samples read from a raster
#[derive(Clone, Debug, PartialEq)]
pub struct RasterWindow {
    rect: PixelRect,
    samples: Vec<f32>,
}

impl RasterWindow {
    pub fn new(rect: PixelRect, samples: Vec<f32>) -> Self {
        debug_assert_eq!(samples.len(), rect.area());
        Self { rect, samples }
    }

    /// The clamped rectangle this window covers
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    pub fn width(&self) -> u32 {
        self.rect.width
    }

    pub fn height(&self) -> u32 {
        self.rect.height
    }

    /// Sample at window-local coordinates
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.samples[y as usize * self.rect.width as usize + x as usize]
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

/// Read access to a 2D grid of normalized height samples.
///
/// Sources are shared between chunk builds, which may run on several
/// threads, hence the `Send + Sync` bound.
pub trait HeightSource: Send + Sync {
    /// Raster width in samples
    fn width(&self) -> u32;

    /// Raster height in samples
    fn height(&self) -> u32;

    /// Read the samples covered by `rect` after clamping it to the raster.
    ///
    /// Returns [`Error::UnreadableRaster`] when the source cannot be sampled.
    fn read_window(&self, rect: PixelRect) -> Result<RasterWindow>;
}

/// In-memory height raster
#[derive(Clone, Debug, PartialEq)]
pub struct HeightRaster {
    width: u32,
    height: u32,
    samples: Vec<f32>,
}

impl HeightRaster {
    /// Wrap row-major samples. Fails if the sample count does not match.
    pub fn new(width: u32, height: u32, samples: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(Error::UnreadableRaster(format!(
                "{}x{} raster needs {} samples, got {}",
                width, height, expected, samples.len()
            )));
        }
        Ok(Self { width, height, samples })
    }

    /// Build a raster by evaluating `f(x, y)` for every sample
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Self {
        let mut samples = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self { width, height, samples }
    }

    /// Raster with every sample set to `value`
    pub fn flat(width: u32, height: u32, value: f32) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width as usize * height as usize],
        }
    }

    /// Convert an image using its red channel, normalized to 0..1.
    pub fn from_image(image: &DynamicImage) -> Self {
        let rgba = image.to_rgba32f();
        let (width, height) = rgba.dimensions();
        Self::from_fn(width, height, |x, y| rgba.get_pixel(x, height - 1 - y).0[0])
    }

    /// Decode an image file into a raster.
    ///
    /// A file that exists but cannot be decoded is reported as
    /// [`Error::UnreadableRaster`].
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .map_err(|e| Error::UnreadableRaster(format!("{}: {}", path.display(), e)))?;
        Ok(Self::from_image(&image))
    }

    /// Sample at `(x, y)`, `None` when out of bounds
    pub fn sample(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.samples[y as usize * self.width as usize + x as usize])
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

impl HeightSource for HeightRaster {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn read_window(&self, rect: PixelRect) -> Result<RasterWindow> {
        let rect = rect.clamped_to(self.width, self.height);
        if rect.is_empty() {
            return Ok(RasterWindow::new(rect, Vec::new()));
        }

        let mut samples = Vec::with_capacity(rect.area());
        for y in rect.y..rect.y + rect.height {
            let row = y as usize * self.width as usize;
            let start = row + rect.x as usize;
            samples.extend_from_slice(&self.samples[start..start + rect.width as usize]);
        }
        Ok(RasterWindow::new(rect, samples))
    }
}
