//! Big-endian wire encoding of collision headers and triangle records
//!
//! Every multi-byte field is big-endian regardless of host byte order;
//! the format predates the current tool chain and its layout is shared
//! with other consumers, so it is treated as frozen.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use super::flags::SurfaceFlags;
use super::record::{ColTriangle, MeshHeader, MAGIC};

/// Errors produced while reading or writing collision data.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file does not start with the `COL1` magic tag
    #[error("bad magic tag {found:?}, expected {MAGIC:?}")]
    BadMagic {
        /// The four bytes actually found at the start of the file
        found: [u8; 4],
    },

    /// The payload ends before the promised record count
    #[error("truncated payload: header promises {expected} triangles, found {actual}")]
    Truncated {
        /// Record count from the header
        expected: u32,
        /// Records actually present
        actual: u32,
    },
}

/// Read and validate a [`MeshHeader`].
pub fn read_header<R: Read>(reader: &mut R) -> Result<MeshHeader, FormatError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic { found: magic });
    }

    Ok(MeshHeader {
        magic,
        version: reader.read_u16::<BigEndian>()?,
        file_flags: reader.read_u16::<BigEndian>()?,
        triangle_count: reader.read_u32::<BigEndian>()?,
        aabb_min: read_i16_triple(reader)?,
        aabb_max: read_i16_triple(reader)?,
        reserved: reader.read_u32::<BigEndian>()?,
    })
}

/// Read one triangle record.
pub fn read_triangle<R: Read>(reader: &mut R) -> Result<ColTriangle, FormatError> {
    let v0 = read_i16_triple(reader)?;
    let v1 = read_i16_triple(reader)?;
    let v2 = read_i16_triple(reader)?;

    let mut normal = [0i8; 3];
    for component in &mut normal {
        *component = reader.read_i8()?;
    }
    let material = reader.read_u8()?;
    let flags = SurfaceFlags::from_bits_retain(reader.read_u16::<BigEndian>()?);

    let mut reserved = [0u8; 8];
    reader.read_exact(&mut reserved)?;

    Ok(ColTriangle {
        v0,
        v1,
        v2,
        normal,
        material,
        flags,
        reserved,
    })
}

/// Read a complete collision payload: header plus all records.
///
/// A payload shorter than the header's record count reports
/// [`FormatError::Truncated`] rather than a bare EOF.
pub fn read_mesh<R: Read>(reader: &mut R) -> Result<(MeshHeader, Vec<ColTriangle>), FormatError> {
    let header = read_header(reader)?;

    // Preallocation is capped so a corrupt count fails with Truncated
    // instead of exhausting memory up front.
    let capacity = header.triangle_count.min(1 << 20) as usize;
    let mut triangles = Vec::with_capacity(capacity);

    for index in 0..header.triangle_count {
        match read_triangle(reader) {
            Ok(triangle) => triangles.push(triangle),
            Err(FormatError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(FormatError::Truncated {
                    expected: header.triangle_count,
                    actual: index,
                });
            }
            Err(e) => return Err(e),
        }
    }

    Ok((header, triangles))
}

/// Write a [`MeshHeader`].
pub fn write_header<W: Write>(writer: &mut W, header: &MeshHeader) -> Result<(), FormatError> {
    writer.write_all(&header.magic)?;
    writer.write_u16::<BigEndian>(header.version)?;
    writer.write_u16::<BigEndian>(header.file_flags)?;
    writer.write_u32::<BigEndian>(header.triangle_count)?;
    write_i16_triple(writer, header.aabb_min)?;
    write_i16_triple(writer, header.aabb_max)?;
    writer.write_u32::<BigEndian>(header.reserved)?;
    Ok(())
}

/// Write one triangle record.
pub fn write_triangle<W: Write>(writer: &mut W, triangle: &ColTriangle) -> Result<(), FormatError> {
    write_i16_triple(writer, triangle.v0)?;
    write_i16_triple(writer, triangle.v1)?;
    write_i16_triple(writer, triangle.v2)?;
    for component in triangle.normal {
        writer.write_i8(component)?;
    }
    writer.write_u8(triangle.material)?;
    writer.write_u16::<BigEndian>(triangle.flags.bits())?;
    writer.write_all(&triangle.reserved)?;
    Ok(())
}

fn read_i16_triple<R: Read>(reader: &mut R) -> Result<[i16; 3], FormatError> {
    Ok([
        reader.read_i16::<BigEndian>()?,
        reader.read_i16::<BigEndian>()?,
        reader.read_i16::<BigEndian>()?,
    ])
}

fn write_i16_triple<W: Write>(writer: &mut W, triple: [i16; 3]) -> Result<(), FormatError> {
    for component in triple {
        writer.write_i16::<BigEndian>(component)?;
    }
    Ok(())
}
