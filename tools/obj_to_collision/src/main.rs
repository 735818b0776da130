//! Compiles Wavefront OBJ geometry into the binary collision format.
//!
//! Usage: `obj_to_collision <input.obj> <output.bcol> [--scale N] [--verbose]`
//!
//! Triangles are classified as floor, wall or ceiling from their
//! normals at build time. Surface-type flags (water, wood, ...) come
//! from an optional TOML sidecar next to the input (`level.toml` for
//! `level.obj`) that tags OBJ material names with a surface kind:
//!
//! ```toml
//! [surfaces]
//! water = ["Lake", "River"]
//! wood = ["Planks", "RopeBridge"]
//! ```
//!
//! Faces keep their authored `vn` normals when present; faces without
//! normals derive the facing from their winding order.

use std::collections::HashMap;
use std::env;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use colmesh::foundation::logging;
use colmesh::foundation::math::Vec3;
use colmesh::format::{FormatError, HEADER_SIZE, RECORD_SIZE};
use colmesh::{MeshBuilder, MeshStats, SurfaceFlags};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
enum CompileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Invalid surface config: {0}")]
    Config(String),
    #[error("Write error: {0}")]
    Format(#[from] FormatError),
}

/// Material names mapped to surface kinds, read from the sidecar.
#[derive(Debug, Default, Deserialize)]
struct SurfaceConfig {
    #[serde(default)]
    surfaces: HashMap<String, Vec<String>>,
}

impl SurfaceConfig {
    /// Surface-type bits for an OBJ material name, empty when untagged.
    fn flags_for(&self, material: &str) -> SurfaceFlags {
        let mut flags = SurfaceFlags::empty();
        for (kind, materials) in &self.surfaces {
            if materials.iter().any(|name| name == material) {
                if let Some(flag) = SurfaceFlags::from_surface_name(kind) {
                    flags |= flag;
                }
            }
        }
        flags
    }
}

/// Counters reported after a successful compile.
#[derive(Debug, Default)]
struct CompileStats {
    vertices: usize,
    faces: usize,
    triangles: usize,
    skipped: usize,
    materials: usize,
}

/// One face corner: position and optional authored normal.
type Corner = (Vec3, Option<Vec3>);

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut input: Option<PathBuf> = None;
    let mut output: Option<PathBuf> = None;
    let mut scale = 1.0f32;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--scale" => {
                i += 1;
                scale = match args.get(i).and_then(|text| text.parse().ok()) {
                    Some(value) => value,
                    None => {
                        eprintln!("--scale expects a number");
                        std::process::exit(1);
                    }
                };
            }
            "--verbose" => verbose = true,
            arg if arg.starts_with("--") => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
            arg if input.is_none() => input = Some(PathBuf::from(arg)),
            arg if output.is_none() => output = Some(PathBuf::from(arg)),
            arg => {
                eprintln!("Unexpected argument: {}", arg);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let (input, output) = match (input, output) {
        (Some(input), Some(output)) => (input, output),
        _ => {
            eprintln!(
                "Usage: {} <input.obj> <output.bcol> [--scale N] [--verbose]",
                args[0]
            );
            std::process::exit(1);
        }
    };

    if scale <= 0.0 {
        eprintln!("--scale must be positive");
        std::process::exit(1);
    }

    logging::init_with_filter(if verbose { "debug" } else { "info" });

    match compile(&input, &output, scale) {
        Ok((stats, census)) => {
            println!("Compiled {} -> {}", input.display(), output.display());
            println!("  Vertices:  {}", stats.vertices);
            println!("  Faces:     {} ({} triangles)", stats.faces, stats.triangles);
            if stats.skipped > 0 {
                println!("  Skipped:   {} degenerate", stats.skipped);
            }
            println!(
                "  Classes:   {} walkable, {} walls, {} ceilings",
                census.walkable, census.walls, census.ceilings
            );
            println!("  Materials: {}", stats.materials);
            println!(
                "  Output:    {} bytes",
                HEADER_SIZE + stats.triangles * RECORD_SIZE
            );
        }
        Err(e) => {
            eprintln!("Failed to compile {}: {}", input.display(), e);
            std::process::exit(1);
        }
    }
}

fn compile(
    input: &Path,
    output: &Path,
    scale: f32,
) -> Result<(CompileStats, MeshStats), CompileError> {
    let config = load_surface_config(input)?;
    let file = File::open(input)?;

    let mut builder = MeshBuilder::new();
    let stats = parse_obj(BufReader::new(file), &config, scale, &mut builder)?;

    if builder.is_empty() {
        log::warn!("no collision faces found in {}", input.display());
    }

    builder.save(output)?;
    Ok((stats, builder.build().stats()))
}

/// Read the optional `<input>.toml` sidecar, untagged when absent.
fn load_surface_config(input: &Path) -> Result<SurfaceConfig, CompileError> {
    let sidecar = input.with_extension("toml");
    if !sidecar.exists() {
        log::debug!("no surface sidecar at {}", sidecar.display());
        return Ok(SurfaceConfig::default());
    }

    let text = fs::read_to_string(&sidecar)?;
    let config: SurfaceConfig =
        toml::from_str(&text).map_err(|e| CompileError::Config(e.to_string()))?;

    for kind in config.surfaces.keys() {
        if SurfaceFlags::from_surface_name(kind).is_none() {
            log::warn!("unknown surface kind '{}' in {}", kind, sidecar.display());
        }
    }
    log::info!("loaded surface tags from {}", sidecar.display());
    Ok(config)
}

/// Parse OBJ geometry from `reader` into `builder`.
///
/// Only `v`, `vn`, `usemtl` and `f` directives matter for collision;
/// everything else is ignored. Faces with more than three corners are
/// fan-triangulated.
fn parse_obj<R: BufRead>(
    reader: R,
    config: &SurfaceConfig,
    scale: f32,
    builder: &mut MeshBuilder,
) -> Result<CompileStats, CompileError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut material_ids: HashMap<String, u8> = HashMap::new();
    let mut current_material = 0u8;
    let mut current_flags = SurfaceFlags::empty();
    let mut stats = CompileStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let line_no = index + 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0] {
            "v" if parts.len() >= 4 => {
                let position = parse_vec3(&parts[1..4], line_no)?;
                positions.push(position * scale);
                stats.vertices += 1;
            }
            "vn" if parts.len() >= 4 => {
                normals.push(parse_vec3(&parts[1..4], line_no)?);
            }
            "usemtl" if parts.len() >= 2 => {
                let name = parts[1];
                // Material ids saturate at 255; the record stores one byte.
                let next_id = u8::try_from(material_ids.len()).unwrap_or(u8::MAX);
                current_material = *material_ids.entry(name.to_string()).or_insert(next_id);
                current_flags = config.flags_for(name);
            }
            "f" if parts.len() >= 4 => {
                let corners = parse_face(&parts[1..], &positions, &normals, line_no)?;
                stats.faces += 1;
                for i in 1..corners.len() - 1 {
                    emit_triangle(
                        builder,
                        [corners[0], corners[i], corners[i + 1]],
                        current_material,
                        current_flags,
                        &mut stats,
                    );
                }
            }
            _ => {
                // Groups, smoothing, texture coordinates: ignored
            }
        }
    }

    stats.materials = material_ids.len();
    Ok(stats)
}

fn parse_vec3(parts: &[&str], line: usize) -> Result<Vec3, CompileError> {
    let mut out = [0.0f32; 3];
    for (slot, text) in out.iter_mut().zip(parts) {
        *slot = text.parse().map_err(|_| CompileError::Parse {
            line,
            message: format!("invalid float '{}'", text),
        })?;
    }
    Ok(Vec3::new(out[0], out[1], out[2]))
}

/// Resolve `v`, `v/vt`, `v//vn` and `v/vt/vn` corner references.
///
/// Position indices must resolve; normal indices that do not are
/// dropped so the triangle falls back to its winding order.
fn parse_face(
    refs: &[&str],
    positions: &[Vec3],
    normals: &[Vec3],
    line: usize,
) -> Result<Vec<Corner>, CompileError> {
    let mut corners = Vec::with_capacity(refs.len());
    for vertex_ref in refs {
        let mut fields = vertex_ref.split('/');

        let position_field = fields.next().unwrap_or("");
        let position_index: usize = position_field.parse().map_err(|_| CompileError::Parse {
            line,
            message: format!("invalid corner reference '{}'", vertex_ref),
        })?;
        let position = position_index
            .checked_sub(1)
            .and_then(|i| positions.get(i))
            .copied()
            .ok_or_else(|| CompileError::Parse {
                line,
                message: format!("vertex index {} out of range", position_index),
            })?;

        let _texture = fields.next();
        let normal = fields
            .next()
            .filter(|field| !field.is_empty())
            .and_then(|field| field.parse::<usize>().ok())
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| normals.get(i))
            .copied();

        corners.push((position, normal));
    }
    Ok(corners)
}

/// Push one triangle, preferring the averaged authored normals.
fn emit_triangle(
    builder: &mut MeshBuilder,
    corners: [Corner; 3],
    material: u8,
    surface: SurfaceFlags,
    stats: &mut CompileStats,
) {
    let before = builder.triangle_count();
    let [(v0, n0), (v1, n1), (v2, n2)] = corners;

    match (n0, n1, n2) {
        (Some(a), Some(b), Some(c)) => {
            builder.push_triangle_with_normal(v0, v1, v2, (a + b + c) / 3.0, material, surface);
        }
        _ => builder.push_triangle(v0, v1, v2, material, surface),
    }

    if builder.triangle_count() > before {
        stats.triangles += 1;
    } else {
        stats.skipped += 1;
    }
}
