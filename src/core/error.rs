//! Error types for terrain generation

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// A required input (height map or atlas) was never configured.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// The height source exists but its samples cannot be read.
    #[error("Unreadable raster: {0}")]
    UnreadableRaster(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
