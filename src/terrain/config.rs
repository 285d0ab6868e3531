//! Terrain generation configuration

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::mesh::uv::UvMode;

/// Fractal noise that shifts the atlas column chosen for each cell
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseJitterConfig {
    /// Multiplier applied to cell coordinates before sampling
    pub scale: f32,
    /// Number of noise layers summed
    pub octaves: u32,
    /// Frequency multiplier between layers (2.0 typical)
    pub lacunarity: f32,
    /// Amplitude multiplier between layers
    pub persistence: f32,
    /// Jitter strength, 0.0-1.0
    pub factor: f32,
    /// Largest column shift at full strength
    pub step: i32,
    pub seed: u32,
}

impl Default for NoiseJitterConfig {
    fn default() -> Self {
        Self {
            scale: 5.0,
            octaves: 2,
            lacunarity: 2.0,
            persistence: 0.3,
            factor: 0.0,
            step: 0,
            seed: 0,
        }
    }
}

/// Configuration for a terrain build.
///
/// Any change to these fields invalidates every chunk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World extent along X and Z
    pub size: [f32; 2],
    /// World height of a sample at 1.0
    pub height: f32,
    /// Chunk edge length in raster samples
    pub chunk_size: u32,
    pub uv_mode: UvMode,
    /// Vertical UV stretch of side faces per unit of height difference
    pub height_uv_scale: f32,
    pub noise: NoiseJitterConfig,
    /// Hand every chunk mesh to the host as a collider
    pub generate_colliders: bool,
    /// Mesh chunks on the rayon pool
    pub parallel: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: [256.0, 256.0],
            height: 64.0,
            chunk_size: 16,
            uv_mode: UvMode::OnePixelTop,
            height_uv_scale: 4.0,
            noise: NoiseJitterConfig::default(),
            generate_colliders: true,
            parallel: false,
        }
    }
}

impl TerrainConfig {
    /// World extent as (x, z)
    pub fn world_size(&self) -> Vec2 {
        Vec2::from(self.size)
    }

    /// Reject configurations the partitioner cannot lay out
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk_size must be at least 1".into()));
        }
        if self.size.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "size must be positive, got {:?}",
                self.size
            )));
        }
        if !self.height.is_finite() || self.height < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "height must be non-negative, got {}",
                self.height
            )));
        }
        if !(0.0..=1.0).contains(&self.noise.factor) {
            return Err(Error::InvalidConfig(format!(
                "noise.factor must be within 0.0-1.0, got {}",
                self.noise.factor
            )));
        }
        Ok(())
    }

    /// Load and validate a JSON config
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, json)?;
        Ok(())
    }
}
