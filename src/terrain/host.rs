//! Boundary to the engine that renders and collides terrain chunks

use std::collections::{HashMap, HashSet};

use glam::{Mat4, Vec3};

use crate::mesh::MeshBuffers;

/// Opaque host material instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u64);

/// Opaque host collider object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub u64);

/// Engine services consumed by [`Terrain`](super::Terrain).
///
/// Every handle returned by `instantiate_material` or `attach_collider`
/// is handed back exactly once through the matching release call.
pub trait TerrainHost {
    /// Create a per-chunk instance of the terrain material
    fn instantiate_material(&mut self, chunk_name: &str) -> MaterialHandle;

    fn release_material(&mut self, material: MaterialHandle);

    /// Register `mesh` as a read-only collision shape placed at `placement`
    /// relative to the terrain
    fn attach_collider(&mut self, chunk_name: &str, mesh: &MeshBuffers, placement: Vec3) -> ColliderHandle;

    fn release_collider(&mut self, collider: ColliderHandle);

    /// Draw `mesh` this frame with the given model transform
    fn submit_mesh(&mut self, mesh: &MeshBuffers, material: MaterialHandle, transform: Mat4);
}

/// Collider registered with a [`HeadlessHost`]
#[derive(Clone, Debug, PartialEq)]
pub struct ColliderRecord {
    pub name: String,
    pub placement: Vec3,
    pub triangle_count: usize,
}

/// One draw submitted to a [`HeadlessHost`]
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub material: MaterialHandle,
    pub transform: Mat4,
    pub triangle_count: usize,
}

/// In-memory host that tracks live resources and recorded draws.
///
/// Used by the CLI and by tests to check that regeneration never leaks.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    next_id: u64,
    materials: HashSet<MaterialHandle>,
    colliders: HashMap<ColliderHandle, ColliderRecord>,
    submissions: Vec<Submission>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn live_colliders(&self) -> usize {
        self.colliders.len()
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&ColliderRecord> {
        self.colliders.get(&handle)
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Drop recorded draws, as at the end of a frame
    pub fn clear_submissions(&mut self) {
        self.submissions.clear();
    }
}

impl TerrainHost for HeadlessHost {
    fn instantiate_material(&mut self, _chunk_name: &str) -> MaterialHandle {
        let handle = MaterialHandle(self.allocate_id());
        self.materials.insert(handle);
        handle
    }

    fn release_material(&mut self, material: MaterialHandle) {
        if !self.materials.remove(&material) {
            log::warn!("Released unknown material {:?}", material);
        }
    }

    fn attach_collider(&mut self, chunk_name: &str, mesh: &MeshBuffers, placement: Vec3) -> ColliderHandle {
        let handle = ColliderHandle(self.allocate_id());
        self.colliders.insert(handle, ColliderRecord {
            name: chunk_name.to_string(),
            placement,
            triangle_count: mesh.triangle_count(),
        });
        handle
    }

    fn release_collider(&mut self, collider: ColliderHandle) {
        if self.colliders.remove(&collider).is_none() {
            log::warn!("Released unknown collider {:?}", collider);
        }
    }

    fn submit_mesh(&mut self, mesh: &MeshBuffers, material: MaterialHandle, transform: Mat4) {
        self.submissions.push(Submission {
            material,
            transform,
            triangle_count: mesh.triangle_count(),
        });
    }
}
