//! Terrain chunks and their coordinates

use glam::{Mat4, Vec3};

use super::host::{ColliderHandle, MaterialHandle, TerrainHost};
use crate::math::Aabb;
use crate::mesh::MeshBuffers;
use crate::raster::PixelRect;

/// Integer coordinate of a chunk in the chunk grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: u32,
    pub y: u32,
}

impl ChunkCoord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Host-facing name, also used for the chunk's mesh and collider
    pub fn name(&self) -> String {
        format!("Terrain_{}_{}", self.x, self.y)
    }
}

/// Result of meshing one chunk, before any host resources are attached
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    /// Raster pixels read, including the seam overlap
    pub window: PixelRect,
    /// Translation of the chunk origin relative to the terrain
    pub placement: Vec3,
    pub mesh: MeshBuffers,
    pub top_faces: usize,
    pub side_faces: usize,
}

/// A generated chunk owning its mesh and host resources.
///
/// The material and collider are only released through
/// [`Chunk::release`]; the owning terrain does this on clear.
#[derive(Debug)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub name: String,
    pub placement: Vec3,
    pub mesh: MeshBuffers,
    pub material: MaterialHandle,
    pub collider: Option<ColliderHandle>,
    pub top_faces: usize,
    pub side_faces: usize,
}

impl Chunk {
    /// Instantiate host resources for a freshly meshed chunk
    pub fn attach(meshed: ChunkMesh, host: &mut dyn TerrainHost, with_collider: bool) -> Self {
        let name = meshed.coord.name();
        let material = host.instantiate_material(&name);
        let collider = with_collider
            .then(|| host.attach_collider(&name, &meshed.mesh, meshed.placement));

        Self {
            coord: meshed.coord,
            name,
            placement: meshed.placement,
            mesh: meshed.mesh,
            material,
            collider,
            top_faces: meshed.top_faces,
            side_faces: meshed.side_faces,
        }
    }

    /// Give the material and collider back to the host
    pub fn release(self, host: &mut dyn TerrainHost) {
        host.release_material(self.material);
        if let Some(collider) = self.collider {
            host.release_collider(collider);
        }
    }

    /// Chunk-to-terrain transform (translation only)
    pub fn transform(&self) -> Mat4 {
        Mat4::from_translation(self.placement)
    }

    /// Mesh bounds in terrain space
    pub fn terrain_bounds(&self) -> Aabb {
        self.mesh.bounds.translated(self.placement)
    }
}
