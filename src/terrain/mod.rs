//! Chunked voxel-column terrain

pub mod config;
pub mod jitter;
pub mod chunk;
pub mod mesher;
pub mod partition;
pub mod host;
pub mod lifecycle;

pub use config::{NoiseJitterConfig, TerrainConfig};
pub use jitter::UvJitter;
pub use chunk::{Chunk, ChunkCoord, ChunkMesh};
pub use mesher::{mesh_chunk, ChunkMesher, MeshParams};
pub use partition::{build_chunk_meshes, ChunkLayout};
pub use host::{ColliderHandle, HeadlessHost, MaterialHandle, TerrainHost};
pub use lifecycle::{GenerationStats, Terrain};
