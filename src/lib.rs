//! Voxterrain - chunked voxel-style terrain meshes from a height raster

pub mod core;
pub mod math;
pub mod raster;
pub mod mesh;
pub mod terrain;
