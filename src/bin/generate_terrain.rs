//! Terrain generator binary: meshes a height map headlessly.
//!
//! Usage: cargo run --release --bin generate_terrain -- [OPTIONS]
//!
//! Options:
//!   --heightmap <PNG>    Height map, red channel (required)
//!   --atlas <PNG>        Color atlas, only its size is read (required)
//!   --config <JSON>      Terrain config (default: built-in defaults)
//!   --chunk-size <N>     Override chunk edge length in samples
//!   --uv-mode <MODE>     Override UV mode: none, one_pixel_top, pixel_center
//!   --parallel           Mesh chunks in parallel
//!   --obj <PATH>         Write the terrain as a Wavefront OBJ file

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use voxterrain::core::{logging, Result};
use voxterrain::mesh::{ObjWriter, UvMode};
use voxterrain::raster::{AtlasInfo, HeightRaster, HeightSource};
use voxterrain::terrain::{HeadlessHost, Terrain, TerrainConfig};

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let heightmap = parse_str_arg(args, "--heightmap").map(PathBuf::from);
    let atlas = parse_str_arg(args, "--atlas").map(PathBuf::from);

    let mut config = match parse_str_arg(args, "--config") {
        Some(path) => TerrainConfig::load(Path::new(&path))?,
        None => TerrainConfig::default(),
    };
    if let Some(chunk_size) = parse_u32_arg(args, "--chunk-size") {
        config.chunk_size = chunk_size;
    }
    if let Some(mode) = parse_str_arg(args, "--uv-mode") {
        match parse_uv_mode(&mode) {
            Some(uv_mode) => config.uv_mode = uv_mode,
            None => log::warn!("Unknown UV mode '{}', keeping {:?}", mode, config.uv_mode),
        }
    }
    config.parallel |= args.iter().any(|a| a == "--parallel");

    let mut terrain = Terrain::new(config);

    if let Some(path) = &heightmap {
        let raster = HeightRaster::load(path)?;
        log::info!("Height map: {} ({}x{})", path.display(), raster.width(), raster.height());
        terrain.set_height_map(Some(Arc::new(raster)));
    }
    if let Some(path) = &atlas {
        let info = AtlasInfo::load(path)?;
        log::info!("Atlas: {} ({}x{})", path.display(), info.width(), info.height());
        terrain.set_atlas(Some(info));
    }

    let mut host = HeadlessHost::new();
    let stats = terrain.generate(&mut host)?;

    println!("=== Voxterrain ===");
    println!("Chunks:     {}", stats.chunks);
    println!("Top faces:  {}", stats.top_faces);
    println!("Side faces: {}", stats.side_faces);
    println!("Vertices:   {}", stats.vertices);
    println!("Triangles:  {}", stats.triangles);
    if let Some(bounds) = terrain.bounds() {
        println!("Bounds:     {:?} .. {:?}", bounds.min, bounds.max);
        println!("Extent:     {:?}", bounds.size());
    }

    if let Some(path) = parse_str_arg(args, "--obj") {
        let mut writer = ObjWriter::new(BufWriter::new(File::create(&path)?));
        for chunk in terrain.chunks() {
            writer.write_mesh(&chunk.name, &chunk.mesh, chunk.placement)?;
        }
        writer.finish()?;
        println!("Wrote {}", path);
    }

    terrain.clear(&mut host);
    Ok(())
}

fn parse_uv_mode(s: &str) -> Option<UvMode> {
    match s {
        "none" => Some(UvMode::None),
        "one_pixel_top" => Some(UvMode::OnePixelTop),
        "pixel_center" => Some(UvMode::PixelCenter),
        _ => None,
    }
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
