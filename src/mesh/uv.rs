//! Atlas UV addressing for terrain faces

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::raster::AtlasInfo;

/// How faces address the color atlas
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UvMode {
    /// Atlas lookup disabled, every UV is (0, 0)
    None,
    /// One atlas column per height value, top row for top faces,
    /// stretched downward for side faces
    #[default]
    OnePixelTop,
    /// Center of the source raster pixel of the shaded cell
    PixelCenter,
}

/// UV rectangle given by its bottom-left and top-right corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UvRect {
    pub bottom_left: Vec2,
    pub top_right: Vec2,
}

impl UvRect {
    pub const ZERO: Self = Self {
        bottom_left: Vec2::ZERO,
        top_right: Vec2::ZERO,
    };

    pub fn new(bottom_left: Vec2, top_right: Vec2) -> Self {
        Self { bottom_left, top_right }
    }

    /// Degenerate rectangle collapsed onto `p`
    pub fn point(p: Vec2) -> Self {
        Self { bottom_left: p, top_right: p }
    }

    /// Corners in quad vertex order (BL, BR, TR, TL), shifted by `offset`
    pub fn corners(&self, offset: Vec2) -> [Vec2; 4] {
        let bl = self.bottom_left;
        let tr = self.top_right;
        [
            bl + offset,
            Vec2::new(tr.x, bl.y) + offset,
            tr + offset,
            Vec2::new(bl.x, tr.y) + offset,
        ]
    }
}

/// Maps face heights and cell coordinates to atlas rectangles.
///
/// Side-face V spans are not clamped to [0, 1]; large height differences
/// or a large `height_uv_scale` rely on the sampler's address mode.
#[derive(Clone, Copy, Debug)]
pub struct UvMapper {
    mode: UvMode,
    atlas_columns: f32,
    du: f32,
    dv: f32,
    raster_size: Vec2,
    height_uv_scale: f32,
}

impl UvMapper {
    pub fn new(
        mode: UvMode,
        atlas: &AtlasInfo,
        raster_width: u32,
        raster_height: u32,
        height_uv_scale: f32,
    ) -> Self {
        Self {
            mode,
            atlas_columns: atlas.width() as f32,
            du: atlas.du(),
            dv: atlas.dv(),
            raster_size: Vec2::new(raster_width as f32, raster_height as f32),
            height_uv_scale,
        }
    }

    pub fn mode(&self) -> UvMode {
        self.mode
    }

    /// Width of one atlas column in UV space
    pub fn du(&self) -> f32 {
        self.du
    }

    /// Left edge of the atlas column selected by height `h`
    #[inline]
    fn column_u(&self, h: f32) -> f32 {
        (h * self.atlas_columns).floor() * self.du
    }

    #[inline]
    fn pixel_center(&self, gx: u32, gy: u32) -> UvRect {
        UvRect::point(Vec2::new(
            (gx as f32 + 0.5) / self.raster_size.x,
            (gy as f32 + 0.5) / self.raster_size.y,
        ))
    }

    /// UV rectangle for the top face of global cell `(gx, gy)` at height `h`
    pub fn top_face(&self, h: f32, gx: u32, gy: u32) -> UvRect {
        match self.mode {
            UvMode::None => UvRect::ZERO,
            UvMode::OnePixelTop => {
                let u0 = self.column_u(h);
                UvRect::new(Vec2::new(u0, 1.0 - self.dv), Vec2::new(u0 + self.du, 1.0))
            }
            UvMode::PixelCenter => self.pixel_center(gx, gy),
        }
    }

    /// UV rectangle for a side face of global cell `(gx, gy)` exposing
    /// heights `h_min..h_max`
    pub fn side_face(&self, h_min: f32, h_max: f32, gx: u32, gy: u32) -> UvRect {
        match self.mode {
            UvMode::None => UvRect::ZERO,
            UvMode::OnePixelTop => {
                let u0 = self.column_u(h_max);
                let v1 = 1.0 - self.dv;
                let v0 = v1 - (h_max - h_min) * self.height_uv_scale;
                UvRect::new(Vec2::new(u0, v0), Vec2::new(u0 + self.du, v1))
            }
            UvMode::PixelCenter => self.pixel_center(gx, gy),
        }
    }
}
