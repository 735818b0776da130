//! Quantized triangle records and the collision file header

use super::flags::SurfaceFlags;
use crate::foundation::math::{Aabb, Vec3};

/// Magic tag opening every collision file.
pub const MAGIC: [u8; 4] = *b"COL1";

/// Format revision written by the current tool chain.
pub const FORMAT_VERSION: u16 = 1;

/// Serialized size of [`MeshHeader`] in bytes.
pub const HEADER_SIZE: usize = 28;

/// Serialized size of one [`ColTriangle`] in bytes.
pub const RECORD_SIZE: usize = 32;

/// Divisor mapping stored integer positions to world units.
///
/// One stored step is 1/16 of a world unit, giving a representable range
/// of roughly -2048..2048 world units per axis.
pub const POSITION_SCALE: f32 = 16.0;

/// Divisor mapping stored integer normal components to unit floats.
pub const NORMAL_SCALE: f32 = 127.0;

/// A single collision triangle in its quantized storage form.
///
/// Vertices are world positions times [`POSITION_SCALE`], normals are unit
/// components times [`NORMAL_SCALE`]. The record is exactly
/// [`RECORD_SIZE`] bytes on the wire; `reserved` pads the record and is
/// preserved verbatim for forward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColTriangle {
    /// First vertex, quantized
    pub v0: [i16; 3],
    /// Second vertex, quantized
    pub v1: [i16; 3],
    /// Third vertex, quantized
    pub v2: [i16; 3],
    /// Face normal, quantized
    pub normal: [i8; 3],
    /// Asset material index
    pub material: u8,
    /// Classification and surface-type bits
    pub flags: SurfaceFlags,
    /// Padding, preserved verbatim
    pub reserved: [u8; 8],
}

impl ColTriangle {
    /// All three vertices decoded to world units.
    pub fn vertices(&self) -> [Vec3; 3] {
        [
            decode_position(self.v0),
            decode_position(self.v1),
            decode_position(self.v2),
        ]
    }

    /// Stored face normal decoded to floats.
    ///
    /// Quantization means the result is only approximately unit length;
    /// queries that need an exact unit normal recompute it from the
    /// vertices instead.
    pub fn unit_normal(&self) -> Vec3 {
        Vec3::new(
            f32::from(self.normal[0]) / NORMAL_SCALE,
            f32::from(self.normal[1]) / NORMAL_SCALE,
            f32::from(self.normal[2]) / NORMAL_SCALE,
        )
    }

    /// Whether any of the given flag bits are set on this triangle.
    pub fn has_flag(&self, flag: SurfaceFlags) -> bool {
        self.flags.intersects(flag)
    }
}

/// On-disk header preceding the triangle records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHeader {
    /// Magic tag, always [`MAGIC`]
    pub magic: [u8; 4],
    /// Format revision, see [`FORMAT_VERSION`]
    pub version: u16,
    /// Whole-file flags, written as zero today
    pub file_flags: u16,
    /// Number of records following the header
    pub triangle_count: u32,
    /// Minimum corner of the level bounds, quantized
    pub aabb_min: [i16; 3],
    /// Maximum corner of the level bounds, quantized
    pub aabb_max: [i16; 3],
    /// Padding, written as zero
    pub reserved: u32,
}

impl MeshHeader {
    /// Level bounds decoded to world units.
    pub fn aabb(&self) -> Aabb {
        Aabb::new(decode_position(self.aabb_min), decode_position(self.aabb_max))
    }
}

fn decode_position(q: [i16; 3]) -> Vec3 {
    Vec3::new(
        f32::from(q[0]) / POSITION_SCALE,
        f32::from(q[1]) / POSITION_SCALE,
        f32::from(q[2]) / POSITION_SCALE,
    )
}
