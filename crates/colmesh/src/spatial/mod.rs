//! Spatial partitioning structures
//!
//! Broad-phase acceleration for collision queries. The level footprint
//! is indexed on the XZ plane only; vertical layering is resolved by the
//! narrow phase.

mod grid;

pub use grid::{GridInfo, UniformGrid, CELL_SIZE, MAX_QUERY_CELLS};
