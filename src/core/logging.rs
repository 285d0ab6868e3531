//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// voxterrain::core::logging::init();
/// log::info!("Terrain generator started");
/// ```
pub fn init() {
    // A second init (tests, embedding hosts) keeps the first logger.
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .format_timestamp_millis()
    .try_init();
}
