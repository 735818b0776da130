//! Construction and serialization of collision meshes
//!
//! The producer side of the binary format: world-space triangles go in,
//! classified and quantized records come out. Used by the asset
//! pipeline and by tests that need meshes without touching the
//! filesystem.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::foundation::math::Vec3;
use crate::format::{
    self, ColTriangle, FormatError, MeshHeader, SurfaceFlags, FORMAT_VERSION, HEADER_SIZE, MAGIC,
    NORMAL_SCALE, POSITION_SCALE, RECORD_SIZE,
};
use crate::geometry;
use crate::mesh::CollisionMesh;

/// Face normals at least this upright classify as `WALKABLE`.
const WALKABLE_THRESHOLD: f32 = 0.7;

/// Face normals below this (facing down) classify as `CEILING`.
const CEILING_THRESHOLD: f32 = -0.7;

/// Normals shorter than this fall back to the winding order.
const MIN_NORMAL_LENGTH: f32 = 1e-4;

/// Accumulates world-space triangles and emits collision meshes.
///
/// Classification from the face normal is automatic; callers only
/// supply the surface-type bits (water, wood, ...) that geometry cannot
/// reveal.
#[derive(Debug, Clone, Default)]
pub struct MeshBuilder {
    triangles: Vec<ColTriangle>,
}

impl MeshBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accepted triangles so far.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether no triangle has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Add a triangle, deriving its facing from the winding order.
    ///
    /// Near-zero-area triangles have no facing and are skipped with a
    /// warning.
    pub fn push_triangle(
        &mut self,
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        material: u8,
        surface: SurfaceFlags,
    ) {
        match geometry::face_normal(v0, v1, v2) {
            Some(normal) => self.push_quantized(v0, v1, v2, normal, material, surface),
            None => log::warn!(
                "skipping degenerate collision triangle near ({:.2}, {:.2}, {:.2})",
                v0.x,
                v0.y,
                v0.z
            ),
        }
    }

    /// Add a triangle with an authored normal, as exported by a model
    /// file. Falls back to the winding order if the normal is unusable.
    pub fn push_triangle_with_normal(
        &mut self,
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        normal: Vec3,
        material: u8,
        surface: SurfaceFlags,
    ) {
        let length = normal.magnitude();
        if length < MIN_NORMAL_LENGTH {
            self.push_triangle(v0, v1, v2, material, surface);
        } else {
            self.push_quantized(v0, v1, v2, normal / length, material, surface);
        }
    }

    fn push_quantized(
        &mut self,
        v0: Vec3,
        v1: Vec3,
        v2: Vec3,
        normal: Vec3,
        material: u8,
        surface: SurfaceFlags,
    ) {
        let classification = if normal.y >= WALKABLE_THRESHOLD {
            SurfaceFlags::WALKABLE
        } else if normal.y < CEILING_THRESHOLD {
            SurfaceFlags::CEILING
        } else {
            SurfaceFlags::WALL
        };

        self.triangles.push(ColTriangle {
            v0: quantize_position(v0),
            v1: quantize_position(v1),
            v2: quantize_position(v2),
            normal: quantize_normal(normal),
            material,
            flags: surface | classification,
            reserved: [0; 8],
        });
    }

    /// Build a queryable mesh directly, skipping serialization.
    ///
    /// The result is identical to writing the bytes out and loading
    /// them back: vertices are already quantized and the bounds go
    /// through the same header encoding.
    pub fn build(&self) -> CollisionMesh {
        CollisionMesh::from_parts(self.triangles.clone(), self.header().aabb())
    }

    /// Serialize to the binary collision format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.triangles.len() * RECORD_SIZE);
        self.write_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Write the header and every record to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        format::write_header(writer, &self.header())?;
        for triangle in &self.triangles {
            format::write_triangle(writer, triangle)?;
        }
        Ok(())
    }

    /// Write a collision file at `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), FormatError> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        log::info!(
            "wrote {} collision triangles to {}",
            self.triangles.len(),
            path.as_ref().display()
        );
        Ok(())
    }

    fn header(&self) -> MeshHeader {
        let (aabb_min, aabb_max) = self.quantized_bounds();
        MeshHeader {
            magic: MAGIC,
            version: FORMAT_VERSION,
            file_flags: 0,
            triangle_count: self.triangles.len() as u32,
            aabb_min,
            aabb_max,
            reserved: 0,
        }
    }

    /// Componentwise bounds over every stored vertex, zeros when empty.
    fn quantized_bounds(&self) -> ([i16; 3], [i16; 3]) {
        let mut min = [i16::MAX; 3];
        let mut max = [i16::MIN; 3];
        for triangle in &self.triangles {
            for vertex in [triangle.v0, triangle.v1, triangle.v2] {
                for axis in 0..3 {
                    min[axis] = min[axis].min(vertex[axis]);
                    max[axis] = max[axis].max(vertex[axis]);
                }
            }
        }
        if self.triangles.is_empty() {
            ([0; 3], [0; 3])
        } else {
            (min, max)
        }
    }
}

fn quantize_position(v: Vec3) -> [i16; 3] {
    [
        quantize_component(v.x, POSITION_SCALE),
        quantize_component(v.y, POSITION_SCALE),
        quantize_component(v.z, POSITION_SCALE),
    ]
}

fn quantize_normal(n: Vec3) -> [i8; 3] {
    [
        (n.x * NORMAL_SCALE).round() as i8,
        (n.y * NORMAL_SCALE).round() as i8,
        (n.z * NORMAL_SCALE).round() as i8,
    ]
}

/// Round to the nearest representable step, saturating at the i16 range.
fn quantize_component(value: f32, scale: f32) -> i16 {
    (value * scale).round() as i16
}
