//! Chunk grid layout and whole-terrain meshing

use glam::{Vec2, Vec3};
use rayon::prelude::*;

use super::chunk::{ChunkCoord, ChunkMesh};
use super::config::TerrainConfig;
use super::jitter::UvJitter;
use super::mesher::{mesh_chunk, MeshParams};
use crate::core::{Error, Result};
use crate::mesh::UvMapper;
use crate::raster::{AtlasInfo, HeightSource};

/// Chunk grid covering a raster, and where each chunk sits in the world.
///
/// The world size is spread evenly over `raster / chunk_size` chunks, so
/// the last chunk of a row or column is smaller when the raster is not an
/// exact multiple of the chunk size. The terrain is centered on the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkLayout {
    chunk_size: u32,
    chunks_x: u32,
    chunks_y: u32,
    /// World extent of a full chunk (x, height, z)
    footprint: Vec3,
    /// Placement of chunk (0, 0)
    origin: Vec3,
}

impl ChunkLayout {
    /// Lay out chunks over a `raster_width` x `raster_height` raster.
    ///
    /// Fails with [`Error::InvalidConfig`] for a zero chunk size.
    pub fn new(raster_width: u32, raster_height: u32, config: &TerrainConfig) -> Result<Self> {
        let chunk_size = config.chunk_size;
        if chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be at least 1".into()));
        }
        let size = config.world_size();
        let footprint_along = |world: f32, samples: u32| {
            if samples == 0 {
                0.0
            } else {
                world / (samples as f32 / chunk_size as f32)
            }
        };

        Ok(Self {
            chunk_size,
            chunks_x: raster_width.div_ceil(chunk_size),
            chunks_y: raster_height.div_ceil(chunk_size),
            footprint: Vec3::new(
                footprint_along(size.x, raster_width),
                config.height,
                footprint_along(size.y, raster_height),
            ),
            origin: Vec3::new(-size.x * 0.5, -config.height * 0.5, -size.y * 0.5),
        })
    }

    pub fn chunks_x(&self) -> u32 {
        self.chunks_x
    }

    pub fn chunks_y(&self) -> u32 {
        self.chunks_y
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks_x as usize * self.chunks_y as usize
    }

    pub fn footprint(&self) -> Vec3 {
        self.footprint
    }

    /// World size of one raster cell along X and Z
    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(self.footprint.x, self.footprint.z) / self.chunk_size as f32
    }

    /// Every chunk coordinate, row by row
    pub fn coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        (0..self.chunks_y).flat_map(move |y| (0..self.chunks_x).map(move |x| ChunkCoord::new(x, y)))
    }

    /// Translation of chunk `coord` relative to the terrain
    pub fn placement(&self, coord: ChunkCoord) -> Vec3 {
        self.origin + Vec3::new(
            coord.x as f32 * self.footprint.x,
            0.0,
            coord.y as f32 * self.footprint.z,
        )
    }
}

/// Mesh every chunk of `source` in row-major order.
///
/// The config is validated first, so a bad config fails before any raster
/// read.
///
/// Chunks only read the shared raster and write their own buffers, so the
/// parallel path yields exactly the sequential result.
pub fn build_chunk_meshes(
    source: &dyn HeightSource,
    atlas: &AtlasInfo,
    config: &TerrainConfig,
) -> Result<Vec<ChunkMesh>> {
    config.validate()?;

    let (width, height) = (source.width(), source.height());
    let layout = ChunkLayout::new(width, height, config)?;
    let uv = UvMapper::new(config.uv_mode, atlas, width, height, config.height_uv_scale);
    let params = MeshParams {
        chunk_size: config.chunk_size,
        cell_size: layout.cell_size(),
        vertical_scale: config.height,
        jitter: UvJitter::new(&config.noise, uv.du()),
        uv,
    };

    log::debug!(
        "Meshing {}x{} raster as {}x{} chunks of {} samples",
        width, height, layout.chunks_x(), layout.chunks_y(), config.chunk_size
    );

    let coords: Vec<ChunkCoord> = layout.coords().collect();
    let build = |&coord: &ChunkCoord| mesh_chunk(source, &params, coord, layout.placement(coord));

    if config.parallel {
        coords.par_iter().map(build).collect()
    } else {
        coords.iter().map(build).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::UvMode;
    use crate::raster::HeightRaster;

    fn config(chunk_size: u32) -> TerrainConfig {
        TerrainConfig {
            chunk_size,
            size: [32.0, 16.0],
            height: 8.0,
            ..Default::default()
        }
    }

    fn atlas() -> AtlasInfo {
        AtlasInfo::new(32, 2).unwrap()
    }

    fn bumpy(width: u32, height: u32) -> HeightRaster {
        HeightRaster::from_fn(width, height, |x, y| ((x * 31 + y * 17) % 7) as f32 / 6.0)
    }

    #[test]
    fn test_layout_grid_dimensions() {
        let layout = ChunkLayout::new(17, 16, &config(16)).unwrap();
        assert_eq!(layout.chunks_x(), 2);
        assert_eq!(layout.chunks_y(), 1);
        assert_eq!(layout.chunk_count(), 2);

        let exact = ChunkLayout::new(64, 32, &config(16)).unwrap();
        assert_eq!((exact.chunks_x(), exact.chunks_y()), (4, 2));
    }

    #[test]
    fn test_layout_footprint_spreads_world_size() {
        let layout = ChunkLayout::new(64, 32, &config(16)).unwrap();
        assert_eq!(layout.footprint(), Vec3::new(8.0, 8.0, 8.0));
        assert_eq!(layout.cell_size(), Vec2::new(0.5, 0.5));

        // 20 samples at chunk size 8: 2.5 chunks over 32 world units
        let partial = ChunkLayout::new(20, 8, &config(8)).unwrap();
        assert_eq!(partial.chunks_x(), 3);
        assert!((partial.footprint().x - 12.8).abs() < 1e-5);
        assert!((partial.cell_size().x - 1.6).abs() < 1e-6);
    }

    #[test]
    fn test_layout_placement_is_centered() {
        let layout = ChunkLayout::new(64, 32, &config(16)).unwrap();
        assert_eq!(layout.placement(ChunkCoord::new(0, 0)), Vec3::new(-16.0, -4.0, -8.0));
        assert_eq!(layout.placement(ChunkCoord::new(3, 1)), Vec3::new(8.0, -4.0, 0.0));
    }

    #[test]
    fn test_layout_coords_row_major_and_unique() {
        let layout = ChunkLayout::new(40, 24, &config(16)).unwrap();
        let coords: Vec<_> = layout.coords().collect();
        assert_eq!(coords.len(), 6);
        assert_eq!(coords[0], ChunkCoord::new(0, 0));
        assert_eq!(coords[1], ChunkCoord::new(1, 0));
        assert_eq!(coords[3], ChunkCoord::new(0, 1));

        let mut sorted = coords.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), coords.len());
    }

    #[test]
    fn test_empty_raster_has_no_chunks() {
        let layout = ChunkLayout::new(0, 0, &config(16)).unwrap();
        assert_eq!(layout.chunk_count(), 0);
        assert_eq!(layout.coords().count(), 0);
    }

    #[test]
    fn test_layout_rejects_zero_chunk_size() {
        let err = ChunkLayout::new(4, 4, &config(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let raster = HeightRaster::flat(4, 4, 0.5);
        let err = build_chunk_meshes(&raster, &atlas(), &config(0)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let mut cfg = config(4);
        cfg.noise.factor = 2.0;
        assert!(matches!(
            build_chunk_meshes(&raster, &atlas(), &cfg),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_top_faces_cover_raster_once() {
        for (w, h, size) in [(4, 4, 4), (17, 16, 16), (10, 7, 3), (1, 1, 8), (33, 5, 4)] {
            let raster = bumpy(w, h);
            let chunks = build_chunk_meshes(&raster, &atlas(), &config(size)).unwrap();
            let layout = ChunkLayout::new(w, h, &config(size)).unwrap();
            assert_eq!(chunks.len(), layout.chunk_count());

            let top: usize = chunks.iter().map(|c| c.top_faces).sum();
            assert_eq!(top, (w * h) as usize, "{}x{} raster, chunk size {}", w, h, size);
        }
    }

    #[test]
    fn test_side_faces_match_discontinuities() {
        let (w, h) = (13, 9);
        let raster = bumpy(w, h);
        let sample = |x: u32, y: u32| raster.sample(x, y).unwrap();

        let mut expected = 0;
        for y in 0..h {
            for x in 0..w {
                if x > 0 && (sample(x, y) - sample(x - 1, y)).abs() > f32::EPSILON {
                    expected += 1;
                }
                if y > 0 && (sample(x, y) - sample(x, y - 1)).abs() > f32::EPSILON {
                    expected += 1;
                }
            }
        }

        for size in [1, 4, 5, 13] {
            let chunks = build_chunk_meshes(&raster, &atlas(), &config(size)).unwrap();
            let sides: usize = chunks.iter().map(|c| c.side_faces).sum();
            assert_eq!(sides, expected, "chunk size {}", size);
        }
    }

    #[test]
    fn test_chunked_geometry_matches_single_chunk() {
        let raster = bumpy(12, 8);
        let cfg = config(4);
        let world_quads = |chunks: &[ChunkMesh]| {
            let mut quads: Vec<[i64; 12]> = chunks
                .iter()
                .flat_map(|c| {
                    c.mesh.positions.chunks_exact(4).map(move |q| {
                        let mut key = [0i64; 12];
                        for (i, p) in q.iter().enumerate() {
                            let w = *p + c.placement;
                            key[i * 3] = (w.x * 1000.0).round() as i64;
                            key[i * 3 + 1] = (w.y * 1000.0).round() as i64;
                            key[i * 3 + 2] = (w.z * 1000.0).round() as i64;
                        }
                        key
                    })
                })
                .collect();
            quads.sort();
            quads
        };

        let chunked = build_chunk_meshes(&raster, &atlas(), &cfg).unwrap();
        let whole = build_chunk_meshes(&raster, &atlas(), &TerrainConfig { chunk_size: 12, ..cfg.clone() })
            .unwrap();
        assert_eq!(chunked.len(), 6);
        assert_eq!(whole.len(), 1);
        assert_eq!(world_quads(&chunked), world_quads(&whole));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let raster = bumpy(37, 21);
        let sequential = build_chunk_meshes(&raster, &atlas(), &config(8)).unwrap();
        let parallel = build_chunk_meshes(
            &raster,
            &atlas(),
            &TerrainConfig { parallel: true, ..config(8) },
        )
        .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_build_is_deterministic() {
        let raster = bumpy(20, 20);
        let mut cfg = config(8);
        cfg.noise.factor = 0.8;
        cfg.noise.step = 4;
        cfg.uv_mode = UvMode::OnePixelTop;

        let a = build_chunk_meshes(&raster, &atlas(), &cfg).unwrap();
        let b = build_chunk_meshes(&raster, &atlas(), &cfg).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.mesh.positions, y.mesh.positions);
            assert_eq!(x.mesh.uvs, y.mesh.uvs);
            assert_eq!(x.mesh.indices, y.mesh.indices);
        }
    }
}
