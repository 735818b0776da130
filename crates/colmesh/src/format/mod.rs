//! On-disk collision format
//!
//! A collision file is a [`MeshHeader`] followed by `triangle_count`
//! fixed-size [`ColTriangle`] records. Positions and normals are stored
//! as scaled integers; see [`POSITION_SCALE`] and [`NORMAL_SCALE`] for
//! the mapping back to world units. All multi-byte fields are big-endian.

mod flags;
mod record;
mod wire;

pub use flags::SurfaceFlags;
pub use record::{
    ColTriangle, MeshHeader, FORMAT_VERSION, HEADER_SIZE, MAGIC, NORMAL_SCALE, POSITION_SCALE,
    RECORD_SIZE,
};
pub use wire::{read_header, read_mesh, read_triangle, write_header, write_triangle, FormatError};
