//! Raster inputs: height samples and atlas dimensions

pub mod height;
pub mod atlas;

pub use height::{HeightRaster, HeightSource, PixelRect, RasterWindow};
pub use atlas::AtlasInfo;
