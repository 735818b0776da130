//! Collision mesh lifecycle and introspection
//!
//! [`CollisionMesh`] owns the decoded triangle set, its level bounds,
//! and the broad-phase grid. It starts unloaded, loads from the binary
//! collision format, and answers the queries defined in [`query`].

mod query;

pub use query::{FloorResult, PushResult, RayHit};

use std::fs;
use std::path::Path;

use crate::foundation::math::Aabb;
use crate::format::{self, ColTriangle, FormatError, SurfaceFlags, FORMAT_VERSION};
use crate::spatial::{GridInfo, UniformGrid};

/// Flag census over a loaded triangle set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshStats {
    /// Total triangles
    pub triangles: u32,
    /// Triangles flagged `WALKABLE`
    pub walkable: u32,
    /// Triangles flagged `WALL`
    pub walls: u32,
    /// Triangles flagged `CEILING`
    pub ceilings: u32,
}

/// Static level collision geometry with its broad-phase index.
///
/// All queries take `&self`; loading and unloading take `&mut self`, so
/// the borrow checker rules out queries racing a reload. Queries on an
/// unloaded mesh return their not-found values rather than failing.
#[derive(Debug, Default)]
pub struct CollisionMesh {
    triangles: Vec<ColTriangle>,
    grid: UniformGrid,
    bounds: Aabb,
    loaded: bool,
}

impl CollisionMesh {
    /// Create an unloaded mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load collision geometry from a file.
    ///
    /// Any currently-loaded geometry is released first; on failure the
    /// mesh is left unloaded.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), FormatError> {
        self.unload();
        let bytes = fs::read(path.as_ref())?;
        self.load_from_bytes(&bytes)
    }

    /// Load collision geometry from an in-memory payload.
    pub fn load_from_bytes(&mut self, bytes: &[u8]) -> Result<(), FormatError> {
        self.unload();

        let mut reader = bytes;
        let (header, triangles) = format::read_mesh(&mut reader)?;
        if header.version != FORMAT_VERSION {
            log::warn!(
                "collision payload declares version {}, engine speaks {}",
                header.version,
                FORMAT_VERSION
            );
        }

        *self = Self::from_parts(triangles, header.aabb());

        let info = self.grid.info();
        log::debug!(
            "collision mesh loaded: {} triangles, {}x{} grid cells",
            self.triangles.len(),
            info.width,
            info.height
        );
        Ok(())
    }

    /// Assemble a mesh from already-decoded parts, building the grid.
    pub(crate) fn from_parts(triangles: Vec<ColTriangle>, bounds: Aabb) -> Self {
        let grid = UniformGrid::build(&triangles, bounds);
        Self {
            triangles,
            grid,
            bounds,
            loaded: true,
        }
    }

    /// Release all geometry.
    ///
    /// Idempotent; calling on a never-loaded mesh is fine.
    pub fn unload(&mut self) {
        self.triangles = Vec::new();
        self.grid = UniformGrid::default();
        self.bounds = Aabb::default();
        self.loaded = false;
    }

    /// Whether geometry is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number of loaded triangles.
    pub fn triangle_count(&self) -> u32 {
        self.triangles.len() as u32
    }

    /// Triangle record by the index reported in query results.
    pub fn triangle(&self, index: u32) -> Option<&ColTriangle> {
        self.triangles.get(index as usize)
    }

    /// Level bounds as declared by the file header.
    pub fn aabb(&self) -> Aabb {
        self.bounds
    }

    /// Broad-phase grid placement and dimensions.
    pub fn grid_info(&self) -> GridInfo {
        self.grid.info()
    }

    /// Triangles listed in the grid cell at (`cell_x`, `cell_z`); zero
    /// outside the grid.
    pub fn grid_cell_triangle_count(&self, cell_x: i32, cell_z: i32) -> usize {
        self.grid.cell_triangle_count(cell_x, cell_z)
    }

    /// Count triangles per classification flag.
    pub fn stats(&self) -> MeshStats {
        let mut stats = MeshStats {
            triangles: self.triangles.len() as u32,
            ..MeshStats::default()
        };
        for triangle in &self.triangles {
            if triangle.has_flag(SurfaceFlags::WALKABLE) {
                stats.walkable += 1;
            }
            if triangle.has_flag(SurfaceFlags::WALL) {
                stats.walls += 1;
            }
            if triangle.has_flag(SurfaceFlags::CEILING) {
                stats.ceilings += 1;
            }
        }
        stats
    }

    /// Log a census of the loaded geometry at debug level, with the
    /// first few records at trace level.
    pub fn log_summary(&self) {
        if !self.loaded {
            log::debug!("collision mesh: unloaded");
            return;
        }

        let stats = self.stats();
        let info = self.grid.info();
        log::debug!(
            "collision mesh: {} triangles ({} walkable, {} walls, {} ceilings)",
            stats.triangles,
            stats.walkable,
            stats.walls,
            stats.ceilings
        );
        log::debug!(
            "bounds: ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2})",
            self.bounds.min.x,
            self.bounds.min.y,
            self.bounds.min.z,
            self.bounds.max.x,
            self.bounds.max.y,
            self.bounds.max.z
        );
        log::debug!(
            "grid: {}x{} cells of {:.1} units from ({:.2}, {:.2})",
            info.width,
            info.height,
            info.cell_size,
            info.origin_x,
            info.origin_z
        );
        for (i, triangle) in self.triangles.iter().take(5).enumerate() {
            let [a, _, _] = triangle.vertices();
            log::trace!(
                "tri[{i}]: v0 = ({:.1}, {:.1}, {:.1}), flags = {:#06x}",
                a.x,
                a.y,
                a.z,
                triangle.flags.bits()
            );
        }
    }
}
