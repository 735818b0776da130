//! # colmesh
//!
//! Static level-geometry collision engine for character-controller games.
//!
//! ## Features
//!
//! - **Compact format**: Quantized binary triangle records, 32 bytes each
//! - **Broad phase**: Uniform XZ grid over the level footprint
//! - **Column probes**: Floor and ceiling queries for grounding and headroom
//! - **Sphere push-out**: Accumulated depenetration against nearby triangles
//! - **Ray casts**: Closest-hit queries for cameras and line-of-sight
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use colmesh::prelude::*;
//!
//! fn main() -> Result<(), colmesh::format::FormatError> {
//!     let mut mesh = CollisionMesh::new();
//!     mesh.load("assets/level1.bcol")?;
//!
//!     let floor = mesh.find_floor(Vec3::new(0.0, 5.0, 0.0), 100.0);
//!     if floor.found {
//!         println!("ground at y = {}", floor.floor_y);
//!     }
//!
//!     let hit = mesh.raycast(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 50.0);
//!     if let Some(hit) = hit {
//!         println!("ray hit triangle {} at distance {}", hit.triangle, hit.distance);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod builder;
pub mod foundation;
pub mod format;
pub mod geometry;
pub mod mesh;
pub mod spatial;

pub use builder::MeshBuilder;
pub use format::{ColTriangle, SurfaceFlags};
pub use mesh::{CollisionMesh, FloorResult, MeshStats, PushResult, RayHit};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        builder::MeshBuilder,
        foundation::math::{Aabb, Vec3},
        format::{ColTriangle, FormatError, SurfaceFlags},
        mesh::{CollisionMesh, FloorResult, MeshStats, PushResult, RayHit},
        spatial::GridInfo,
    };
}
