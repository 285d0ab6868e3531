//! Quad emission into growing mesh buffers
//!
//! Convention: right-handed, Y up, counter-clockwise front faces. A quad
//! built from `right` and `up` edges faces `up x right` with the default
//! winding and `right x up` when flipped.

use glam::{Vec2, Vec3};

use crate::math::Aabb;
use crate::mesh::uv::UvRect;

/// Index pattern of a quad facing `up x right`
const FRONT_WINDING: [u32; 6] = [0, 2, 1, 2, 0, 3];
/// Index pattern of a quad facing `right x up`
const FLIPPED_WINDING: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Finished triangle mesh of one chunk
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Triangle corner positions, in index order
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.positions[t[0] as usize],
                self.positions[t[1] as usize],
                self.positions[t[2] as usize],
            ]
        })
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Appends quads to a mesh while tracking the vertex counter and bounds
#[derive(Debug, Default)]
pub struct MeshBuilder {
    buffers: MeshBuffers,
    next_index: u32,
    bounds: Option<Aabb>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder with room for `quads` quads
    pub fn with_capacity(quads: usize) -> Self {
        Self {
            buffers: MeshBuffers {
                positions: Vec::with_capacity(quads * 4),
                normals: Vec::with_capacity(quads * 4),
                uvs: Vec::with_capacity(quads * 4),
                indices: Vec::with_capacity(quads * 6),
                bounds: Aabb::default(),
            },
            next_index: 0,
            bounds: None,
        }
    }

    /// Append the quad `origin`, `origin + right`, `origin + right + up`,
    /// `origin + up` with a flat `normal`.
    ///
    /// `flip` selects the winding; the caller is responsible for passing a
    /// normal that agrees with it.
    #[allow(clippy::too_many_arguments)]
    pub fn add_quad(
        &mut self,
        origin: Vec3,
        right: Vec3,
        up: Vec3,
        normal: Vec3,
        uv: UvRect,
        uv_offset: Vec2,
        flip: bool,
    ) {
        let corners = [origin, origin + right, origin + right + up, origin + up];

        self.buffers.positions.extend_from_slice(&corners);
        self.buffers.normals.extend_from_slice(&[normal; 4]);
        self.buffers.uvs.extend_from_slice(&uv.corners(uv_offset));

        let winding = if flip { &FLIPPED_WINDING } else { &FRONT_WINDING };
        let base = self.next_index;
        self.buffers.indices.extend(winding.iter().map(|i| base + i));

        let bounds = self.bounds.get_or_insert_with(|| Aabb::from_point(origin));
        for corner in corners {
            bounds.expand(corner);
        }

        self.next_index += 4;
    }

    pub fn vertex_count(&self) -> usize {
        self.next_index as usize
    }

    pub fn quad_count(&self) -> usize {
        self.vertex_count() / 4
    }

    /// Finalize the buffers. An empty mesh gets a zero-sized bounds at the origin.
    pub fn finish(self) -> MeshBuffers {
        let mut buffers = self.buffers;
        buffers.bounds = self.bounds.unwrap_or_default();
        buffers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometric_normal(tri: [Vec3; 3]) -> Vec3 {
        (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize()
    }

    #[test]
    fn test_add_quad_layout() {
        let mut builder = MeshBuilder::new();
        builder.add_quad(Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::Y, UvRect::ZERO, Vec2::ZERO, false);
        builder.add_quad(Vec3::X, Vec3::X, Vec3::Z, Vec3::Y, UvRect::ZERO, Vec2::ZERO, true);

        assert_eq!(builder.quad_count(), 2);
        let mesh = builder.finish();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(mesh.indices, vec![0, 2, 1, 2, 0, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(mesh.positions[2], Vec3::new(1.0, 0.0, 1.0));
        assert!(mesh.normals.iter().all(|n| *n == Vec3::Y));
    }

    #[test]
    fn test_front_winding_faces_up_cross_right() {
        let mut builder = MeshBuilder::new();
        builder.add_quad(Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::Y, UvRect::ZERO, Vec2::ZERO, false);
        let mesh = builder.finish();
        for tri in mesh.triangles() {
            assert!((geometric_normal(tri) - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn test_flipped_winding_faces_right_cross_up() {
        let right = Vec3::Z;
        let up = Vec3::Y * 3.0;
        let mut builder = MeshBuilder::new();
        builder.add_quad(Vec3::ZERO, right, up, Vec3::NEG_X, UvRect::ZERO, Vec2::ZERO, true);
        let mesh = builder.finish();
        for tri in mesh.triangles() {
            assert!((geometric_normal(tri) - right.cross(up).normalize()).length() < 1e-6);
        }
    }

    #[test]
    fn test_uv_offset_applied_to_every_corner() {
        let rect = UvRect::new(Vec2::new(0.0, 0.5), Vec2::new(0.5, 1.0));
        let mut builder = MeshBuilder::new();
        builder.add_quad(Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::Y, rect, Vec2::new(0.25, 0.0), false);
        let mesh = builder.finish();
        assert_eq!(mesh.uvs[0], Vec2::new(0.25, 0.5));
        assert_eq!(mesh.uvs[1], Vec2::new(0.75, 0.5));
        assert_eq!(mesh.uvs[2], Vec2::new(0.75, 1.0));
        assert_eq!(mesh.uvs[3], Vec2::new(0.25, 1.0));
    }

    #[test]
    fn test_bounds_track_vertices() {
        let mut builder = MeshBuilder::new();
        builder.add_quad(Vec3::new(1.0, 2.0, 1.0), Vec3::X, Vec3::Z, Vec3::Y, UvRect::ZERO, Vec2::ZERO, false);
        builder.add_quad(Vec3::new(2.0, 0.5, 1.0), Vec3::Z, Vec3::Y * 1.5, Vec3::X, UvRect::ZERO, Vec2::ZERO, false);
        let mesh = builder.finish();
        assert_eq!(mesh.bounds.min, Vec3::new(1.0, 0.5, 1.0));
        assert_eq!(mesh.bounds.max, Vec3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = MeshBuilder::with_capacity(16).finish();
        assert!(mesh.is_empty());
        assert_eq!(mesh.bounds, Aabb::default());
    }

    #[test]
    fn test_byte_views() {
        let mut builder = MeshBuilder::new();
        builder.add_quad(Vec3::ZERO, Vec3::X, Vec3::Z, Vec3::Y, UvRect::ZERO, Vec2::ZERO, false);
        let mesh = builder.finish();
        assert_eq!(mesh.position_bytes().len(), 4 * 12);
        assert_eq!(mesh.normal_bytes().len(), 4 * 12);
        assert_eq!(mesh.uv_bytes().len(), 4 * 8);
        assert_eq!(mesh.index_bytes().len(), 6 * 4);
    }
}
