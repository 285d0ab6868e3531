//! Column meshing of a single chunk.
//!
//! Each cell becomes a flat top quad. Where a cell and its -X or -Z
//! neighbor differ in height, a vertical quad closes the gap, facing the
//! lower of the two columns. Chunks other than the first row/column read
//! one extra raster row/column on that side so the faces along their seam
//! come from the same samples their neighbor sees; no neighbor buffers
//! are ever touched.

use glam::{Vec2, Vec3};

use super::chunk::{ChunkCoord, ChunkMesh};
use super::jitter::UvJitter;
use crate::core::{Error, Result};
use crate::mesh::{MeshBuilder, UvMapper, UvMode};
use crate::raster::{HeightSource, PixelRect};

/// Inputs shared by every chunk of one terrain build
#[derive(Clone, Debug)]
pub struct MeshParams {
    /// Chunk edge length in samples
    pub chunk_size: u32,
    /// World size of one raster cell along X and Z
    pub cell_size: Vec2,
    /// World height of a sample at 1.0
    pub vertical_scale: f32,
    pub uv: UvMapper,
    pub jitter: UvJitter,
}

/// Emits top and side faces of one chunk into a [`MeshBuilder`]
pub struct ChunkMesher<'a> {
    params: &'a MeshParams,
    builder: MeshBuilder,
    dx: Vec3,
    dz: Vec3,
    cell: (u32, u32),
    uv_offset: Vec2,
    top_faces: usize,
    side_faces: usize,
}

impl<'a> ChunkMesher<'a> {
    /// Mesher sized for roughly `cells` cells
    pub fn new(params: &'a MeshParams, cells: usize) -> Self {
        Self {
            params,
            // A top face plus on average one side face per cell
            builder: MeshBuilder::with_capacity(cells * 2),
            dx: Vec3::new(params.cell_size.x, 0.0, 0.0),
            dz: Vec3::new(0.0, 0.0, params.cell_size.y),
            cell: (0, 0),
            uv_offset: Vec2::ZERO,
            top_faces: 0,
            side_faces: 0,
        }
    }

    /// Start a new global cell: UV addressing and jitter are per cell
    pub fn begin_cell(&mut self, gx: u32, gy: u32) {
        self.cell = (gx, gy);
        self.uv_offset = match self.params.uv.mode() {
            UvMode::OnePixelTop => Vec2::new(self.params.jitter.u_offset(gx, gy), 0.0),
            UvMode::None | UvMode::PixelCenter => Vec2::ZERO,
        };
    }

    /// Top quad of the current cell at `height`, `origin` being the cell's
    /// minimum corner in the XZ plane
    pub fn add_top_face(&mut self, origin: Vec3, height: f32) {
        let (gx, gy) = self.cell;
        let position = Vec3::new(origin.x, height * self.params.vertical_scale, origin.z);
        let uv = self.params.uv.top_face(height, gx, gy);

        self.builder.add_quad(position, self.dx, self.dz, Vec3::Y, uv, self.uv_offset, false);
        self.top_faces += 1;
    }

    /// Vertical quad along `right` between the current cell at `height` and
    /// a neighbor at `neighbor_height`.
    ///
    /// `flip` is the winding that faces the current cell when the neighbor
    /// is the higher column; it is inverted otherwise. Returns whether a
    /// face was emitted.
    pub fn add_side_face(
        &mut self,
        origin: Vec3,
        right: Vec3,
        height: f32,
        neighbor_height: f32,
        flip: bool,
    ) -> bool {
        let diff = neighbor_height - height;
        if diff.abs() <= f32::EPSILON {
            return false;
        }

        let (min, max, flip) = if diff > 0.0 {
            (height, neighbor_height, flip)
        } else {
            (neighbor_height, height, !flip)
        };

        let scale = self.params.vertical_scale;
        let position = Vec3::new(origin.x, min * scale, origin.z);
        let up = Vec3::new(0.0, (max - min) * scale, 0.0);

        // Flipped quads face right x up, the others up x right.
        let facing = right.cross(Vec3::Y).normalize_or_zero();
        let normal = if flip { facing } else { -facing };

        let (gx, gy) = self.cell;
        let uv = self.params.uv.side_face(min, max, gx, gy);

        self.builder.add_quad(position, right, up, normal, uv, self.uv_offset, flip);
        self.side_faces += 1;
        true
    }

    fn finish(self, coord: ChunkCoord, window: PixelRect, placement: Vec3) -> ChunkMesh {
        ChunkMesh {
            coord,
            window,
            placement,
            top_faces: self.top_faces,
            side_faces: self.side_faces,
            mesh: self.builder.finish(),
        }
    }
}

/// Mesh chunk `coord` of `source`.
///
/// A window that clamps to no cells of the chunk's own yields an empty
/// mesh. A zero chunk size is [`Error::InvalidConfig`]; otherwise only a
/// failing raster read is an error.
pub fn mesh_chunk(
    source: &dyn HeightSource,
    params: &MeshParams,
    coord: ChunkCoord,
    placement: Vec3,
) -> Result<ChunkMesh> {
    let size = params.chunk_size;
    if size == 0 {
        return Err(Error::InvalidConfig("chunk_size must be at least 1".into()));
    }
    // Seam overlap: one extra column on the left, one extra row on top
    let start_x = u32::from(coord.x > 0);
    let start_z = u32::from(coord.y > 0);
    let pixel_x = coord.x * size;
    let pixel_y = coord.y * size;

    let request = PixelRect::new(
        pixel_x - start_x,
        pixel_y - start_z,
        size + start_x,
        size + start_z,
    );
    let window = source.read_window(request)?;
    let (width, height) = (window.width(), window.height());

    if width <= start_x || height <= start_z {
        log::debug!("Chunk {:?} window {:?} has no cells", coord, window.rect());
        let mesher = ChunkMesher::new(params, 0);
        return Ok(mesher.finish(coord, window.rect(), placement));
    }

    let cells = ((width - start_x) * (height - start_z)) as usize;
    let mut mesher = ChunkMesher::new(params, cells);
    let (dx, dz) = (mesher.dx, mesher.dz);

    for z in start_z..height {
        let local_z = z - start_z;
        for x in start_x..width {
            let local_x = x - start_x;
            let origin = Vec3::new(
                local_x as f32 * params.cell_size.x,
                0.0,
                local_z as f32 * params.cell_size.y,
            );
            let h = window.get(x, z);

            mesher.begin_cell(pixel_x + local_x, pixel_y + local_z);
            mesher.add_top_face(origin, h);

            // -X face
            if x > 0 {
                mesher.add_side_face(origin, dz, h, window.get(x - 1, z), false);
            }

            // -Z face
            if z > 0 {
                mesher.add_side_face(origin, dx, h, window.get(x, z - 1), true);
            }
        }
    }

    Ok(mesher.finish(coord, window.rect(), placement))
}
