//! The terrain object driven by the host's lifecycle

use std::sync::Arc;
use std::time::Instant;

use glam::Mat4;

use super::chunk::{Chunk, ChunkMesh};
use super::config::TerrainConfig;
use super::host::TerrainHost;
use super::partition::build_chunk_meshes;
use crate::core::{Error, Result};
use crate::math::Aabb;
use crate::raster::{AtlasInfo, HeightSource};

/// Totals of one generation pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub chunks: usize,
    pub top_faces: usize,
    pub side_faces: usize,
    pub vertices: usize,
    pub triangles: usize,
}

impl GenerationStats {
    fn record(&mut self, chunk: &ChunkMesh) {
        self.chunks += 1;
        self.top_faces += chunk.top_faces;
        self.side_faces += chunk.side_faces;
        self.vertices += chunk.mesh.vertex_count();
        self.triangles += chunk.mesh.triangle_count();
    }
}

/// Chunked terrain built from a height source and an atlas.
///
/// The chunk list is replaced wholesale by [`Terrain::generate`]; a failed
/// generation leaves the previous chunks in place. Host resources held by
/// the chunks are only released through [`Terrain::clear`] or a successful
/// regeneration, so a driver must call `clear` before dropping a terrain.
/// Dropping one with live chunks logs a warning naming the leaked chunks.
pub struct Terrain {
    config: TerrainConfig,
    height_map: Option<Arc<dyn HeightSource>>,
    atlas: Option<AtlasInfo>,
    chunks: Vec<Chunk>,
}

impl Terrain {
    pub fn new(config: TerrainConfig) -> Self {
        Self {
            config,
            height_map: None,
            atlas: None,
            chunks: Vec::new(),
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn set_height_map(&mut self, height_map: Option<Arc<dyn HeightSource>>) {
        self.height_map = height_map;
    }

    pub fn set_atlas(&mut self, atlas: Option<AtlasInfo>) {
        self.atlas = atlas;
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn is_generated(&self) -> bool {
        !self.chunks.is_empty()
    }

    /// Bounds of all chunk meshes in terrain space
    pub fn bounds(&self) -> Option<Aabb> {
        self.chunks
            .iter()
            .filter(|c| !c.mesh.is_empty())
            .map(Chunk::terrain_bounds)
            .reduce(|a, b| a.merged(&b))
    }

    /// Rebuild every chunk from the current inputs and configuration.
    ///
    /// Missing inputs, an invalid config or an unreadable raster abort
    /// before any chunk is released.
    pub fn generate(&mut self, host: &mut dyn TerrainHost) -> Result<GenerationStats> {
        let Some(height_map) = self.height_map.as_deref() else {
            log::warn!("No height map provided for terrain generation.");
            return Err(Error::MissingInput("height map".into()));
        };
        let Some(atlas) = self.atlas else {
            log::warn!("No color atlas provided for terrain generation.");
            return Err(Error::MissingInput("color atlas".into()));
        };
        self.config.validate()?;

        let start = Instant::now();
        let meshes = build_chunk_meshes(height_map, &atlas, &self.config)?;

        self.clear(host);

        let mut stats = GenerationStats::default();
        let mut chunks = Vec::with_capacity(meshes.len());
        for meshed in meshes {
            stats.record(&meshed);
            chunks.push(Chunk::attach(meshed, host, self.config.generate_colliders));
        }
        self.chunks = chunks;

        log::info!(
            "Generated {} terrain chunks ({} top faces, {} side faces, {} triangles) in {:.1}ms",
            stats.chunks,
            stats.top_faces,
            stats.side_faces,
            stats.triangles,
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(stats)
    }

    /// Release every chunk and its host resources
    pub fn clear(&mut self, host: &mut dyn TerrainHost) {
        if self.chunks.is_empty() {
            return;
        }
        log::debug!("Releasing {} terrain chunks", self.chunks.len());
        for chunk in self.chunks.drain(..) {
            chunk.release(host);
        }
    }

    /// Store `config`, regenerating if it differs from the current one
    pub fn on_config_changed(
        &mut self,
        config: TerrainConfig,
        host: &mut dyn TerrainHost,
    ) -> Result<Option<GenerationStats>> {
        if config == self.config {
            return Ok(None);
        }
        self.config = config;
        self.generate(host).map(Some)
    }

    /// Generate if no chunks exist, as after the host reloads the terrain
    pub fn on_enable(&mut self, host: &mut dyn TerrainHost) -> Result<Option<GenerationStats>> {
        if self.is_generated() {
            return Ok(None);
        }
        self.generate(host).map(Some)
    }

    /// Submit every chunk for drawing with the terrain's world transform
    pub fn submit_for_render(&self, host: &mut dyn TerrainHost, terrain_transform: Mat4) {
        for chunk in &self.chunks {
            host.submit_mesh(&chunk.mesh, chunk.material, terrain_transform * chunk.transform());
        }
    }
}

impl Drop for Terrain {
    fn drop(&mut self) {
        if self.chunks.is_empty() {
            return;
        }
        let colliders = self.chunks.iter().filter(|c| c.collider.is_some()).count();
        log::warn!(
            "Terrain dropped with {} live chunks ({} materials, {} colliders) still held by the host; call clear first",
            self.chunks.len(),
            self.chunks.len(),
            colliders
        );
    }
}
