//! Point, sphere, and ray queries against a loaded mesh
//!
//! All queries are read-only and total: a miss is reported through a
//! `found` field or `None`, never a panic. Broad-phase candidates come
//! from the XZ grid; a triangle listed in several probed cells is tested
//! once thanks to a small stack-local seen-set.

use crate::foundation::math::Vec3;
use crate::format::SurfaceFlags;
use crate::geometry;
use crate::spatial::MAX_QUERY_CELLS;

use super::CollisionMesh;

/// Radius added around a query column when gathering grid cells, so
/// triangles poking in from a neighboring cell are not missed.
const PROBE_RADIUS: f32 = 2.0;

/// A floor marginally above the query point still counts, up to this
/// tolerance, so a climbing step does not lose the ground.
const FLOOR_TOLERANCE: f32 = 0.5;

/// Minimum computed normal Y for unflagged geometry to act as a floor.
const WALKABLE_NORMAL_Y: f32 = 0.3;

/// Maximum stored normal Y for a triangle to act as a ceiling.
const CEILING_NORMAL_Y: f32 = -0.5;

/// Near-zero guard on normal Y before solving a plane for its height.
const PLANE_Y_EPSILON: f32 = 1e-3;

/// Capacity of the per-query seen-set.
const MAX_CHECKED_TRIS: usize = 64;

/// Vertical range searched by [`CollisionMesh::is_point_inside`].
const INSIDE_PROBE_RANGE: f32 = 1000.0;

/// Rays shorter than this have no usable direction.
const MIN_RAY_LENGTH: f32 = 1e-4;

/// Result of a floor or ceiling probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorResult {
    /// Whether a qualifying surface was found
    pub found: bool,
    /// Resolved surface height. When nothing was found this holds the
    /// probe sentinel: query Y minus `max_drop` for floors, query Y plus
    /// `max_height` for ceilings.
    pub floor_y: f32,
    /// Surface normal of the hit; a probe-facing unit axis when nothing
    /// was found
    pub normal: Vec3,
    /// Index of the hit triangle, resolvable via
    /// [`CollisionMesh::triangle`]
    pub triangle: Option<u32>,
    /// Flags of the hit triangle
    pub flags: SurfaceFlags,
}

/// Accumulated push-out from a sphere overlap test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushResult {
    /// Whether any triangle intersected the sphere
    pub collided: bool,
    /// Sum of the per-triangle push vectors. Deliberately not averaged
    /// or normalized; opposing contacts cancel and corner contacts add,
    /// which is what a depenetration step wants.
    pub push: Vec3,
    /// Number of triangles that contributed to `push`
    pub hit_count: u32,
    /// Union of the flags of every contributing triangle
    pub flags: SurfaceFlags,
}

/// Closest hit reported by [`CollisionMesh::raycast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Distance from the ray origin along the normalized direction
    pub distance: f32,
    /// Index of the hit triangle
    pub triangle: u32,
}

/// Fixed-capacity seen-set deduplicating candidates across probed cells.
///
/// Once full, new indices are no longer recorded, so an extremely
/// crowded probe may test a late duplicate twice; memory stays bounded
/// and no candidate is ever dropped.
struct CheckedSet {
    entries: [u32; MAX_CHECKED_TRIS],
    len: usize,
}

impl CheckedSet {
    fn new() -> Self {
        Self {
            entries: [0; MAX_CHECKED_TRIS],
            len: 0,
        }
    }

    /// True if the index has not been seen before; records it if there
    /// is room.
    fn insert(&mut self, index: u32) -> bool {
        if self.entries[..self.len].contains(&index) {
            return false;
        }
        if self.len < MAX_CHECKED_TRIS {
            self.entries[self.len] = index;
            self.len += 1;
        }
        true
    }
}

impl CollisionMesh {
    /// Find the highest standable surface at or below `pos` (allowing a
    /// small margin above, see the acceptance rule).
    ///
    /// A triangle qualifies if it is flagged `WALKABLE`, or failing
    /// that if its computed face normal is upright enough to stand on.
    /// Among qualifying surfaces whose plane height at the query column
    /// is at most `pos.y` plus a step tolerance, the highest wins. When
    /// nothing qualifies within `max_drop` below, `found` is false and
    /// `floor_y` holds `pos.y - max_drop`.
    pub fn find_floor(&self, pos: Vec3, max_drop: f32) -> FloorResult {
        let mut result = FloorResult {
            found: false,
            floor_y: pos.y - max_drop,
            normal: Vec3::new(0.0, 1.0, 0.0),
            triangle: None,
            flags: SurfaceFlags::empty(),
        };
        if !self.loaded {
            return result;
        }

        let mut cells = [0u32; MAX_QUERY_CELLS];
        let cell_count = self
            .grid
            .overlapping_cells(pos.x, pos.z, PROBE_RADIUS, &mut cells);

        let mut best_y = pos.y - max_drop;
        let mut checked = CheckedSet::new();

        for &cell in &cells[..cell_count] {
            for &triangle_index in self.grid.cell_triangles(cell as usize) {
                if !checked.insert(triangle_index) {
                    continue;
                }

                let triangle = &self.triangles[triangle_index as usize];
                let [a, b, c] = triangle.vertices();

                // The actual plane decides the height, so use the exact
                // computed normal rather than the quantized one
                let normal = match geometry::face_normal(a, b, c) {
                    Some(n) => n,
                    None => continue,
                };

                // Unflagged steep geometry is not standable
                if !triangle.has_flag(SurfaceFlags::WALKABLE) && normal.y < WALKABLE_NORMAL_Y {
                    continue;
                }
                if normal.y.abs() < PLANE_Y_EPSILON {
                    continue;
                }
                if !geometry::point_in_triangle_xz(a, b, c, pos.x, pos.z) {
                    continue;
                }

                let floor_y =
                    a.y - (normal.x * (pos.x - a.x) + normal.z * (pos.z - a.z)) / normal.y;

                if floor_y <= pos.y + FLOOR_TOLERANCE && floor_y > best_y {
                    best_y = floor_y;
                    result = FloorResult {
                        found: true,
                        floor_y,
                        normal,
                        triangle: Some(triangle_index),
                        flags: triangle.flags,
                    };
                }
            }
        }
        result
    }

    /// Find the closest overhead surface at or above `pos`.
    ///
    /// Candidates come from the same cell probe as [`find_floor`] and
    /// qualify by their stored normal facing sufficiently downward. The
    /// lowest plane height at or above `pos.y` wins. When nothing
    /// qualifies within `max_height` above, `found` is false and
    /// `floor_y` holds `pos.y + max_height`.
    pub fn find_ceiling(&self, pos: Vec3, max_height: f32) -> FloorResult {
        let mut result = FloorResult {
            found: false,
            floor_y: pos.y + max_height,
            normal: Vec3::new(0.0, -1.0, 0.0),
            triangle: None,
            flags: SurfaceFlags::empty(),
        };
        if !self.loaded {
            return result;
        }

        let mut cells = [0u32; MAX_QUERY_CELLS];
        let cell_count = self
            .grid
            .overlapping_cells(pos.x, pos.z, PROBE_RADIUS, &mut cells);

        let mut best_y = pos.y + max_height;
        let mut checked = CheckedSet::new();

        for &cell in &cells[..cell_count] {
            for &triangle_index in self.grid.cell_triangles(cell as usize) {
                if !checked.insert(triangle_index) {
                    continue;
                }

                let triangle = &self.triangles[triangle_index as usize];
                let normal = triangle.unit_normal();
                if normal.y > CEILING_NORMAL_Y {
                    continue;
                }

                let [a, b, c] = triangle.vertices();
                if !geometry::point_in_triangle_xz(a, b, c, pos.x, pos.z) {
                    continue;
                }
                if normal.y.abs() < PLANE_Y_EPSILON {
                    continue;
                }

                let d = normal.dot(&a);
                let ceiling_y = (d - normal.x * pos.x - normal.z * pos.z) / normal.y;

                if ceiling_y >= pos.y && ceiling_y < best_y {
                    best_y = ceiling_y;
                    result = FloorResult {
                        found: true,
                        floor_y: ceiling_y,
                        normal,
                        triangle: Some(triangle_index),
                        flags: triangle.flags,
                    };
                }
            }
        }
        result
    }

    /// Accumulate push-out vectors for a sphere against nearby
    /// triangles.
    ///
    /// A non-empty `mask` restricts the test to triangles sharing at
    /// least one masked flag bit; an empty mask tests everything.
    pub fn check_sphere(&self, center: Vec3, radius: f32, mask: SurfaceFlags) -> PushResult {
        let mut result = PushResult {
            collided: false,
            push: Vec3::zeros(),
            hit_count: 0,
            flags: SurfaceFlags::empty(),
        };
        if !self.loaded {
            return result;
        }

        let mut cells = [0u32; MAX_QUERY_CELLS];
        let cell_count =
            self.grid
                .overlapping_cells(center.x, center.z, radius + PROBE_RADIUS, &mut cells);

        let mut checked = CheckedSet::new();
        for &cell in &cells[..cell_count] {
            for &triangle_index in self.grid.cell_triangles(cell as usize) {
                if !checked.insert(triangle_index) {
                    continue;
                }

                let triangle = &self.triangles[triangle_index as usize];
                if !mask.is_empty() && !triangle.flags.intersects(mask) {
                    continue;
                }

                let [a, b, c] = triangle.vertices();
                if let Some(push) = geometry::sphere_triangle_push(a, b, c, center, radius) {
                    result.collided = true;
                    result.push += push;
                    result.hit_count += 1;
                    result.flags |= triangle.flags;
                }
            }
        }
        result
    }

    /// Closest triangle hit along a ray, strictly within `max_dist`.
    ///
    /// `direction` is normalized internally, so the reported distance is
    /// in world units whatever the input length. The scan is linear over
    /// the whole triangle set; rays are occasional (cameras,
    /// line-of-sight) rather than per-frame-per-entity, and a vertical
    /// ray would defeat an XZ cell walk anyway.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_dist: f32) -> Option<RayHit> {
        if !self.loaded {
            return None;
        }
        let length = direction.magnitude();
        if length < MIN_RAY_LENGTH {
            return None;
        }
        let direction = direction / length;

        let mut closest: Option<RayHit> = None;
        let mut closest_t = max_dist;
        for (index, triangle) in self.triangles.iter().enumerate() {
            let [a, b, c] = triangle.vertices();
            if let Some(t) = geometry::ray_triangle_intersect(a, b, c, origin, direction) {
                if t < closest_t {
                    closest_t = t;
                    closest = Some(RayHit {
                        distance: t,
                        triangle: index as u32,
                    });
                }
            }
        }
        closest
    }

    /// Whether `pos` is vertically bracketed by level geometry, with a
    /// floor below and a ceiling above within a generous range.
    pub fn is_point_inside(&self, pos: Vec3) -> bool {
        let floor = self.find_floor(pos, INSIDE_PROBE_RANGE);
        let ceiling = self.find_ceiling(pos, INSIDE_PROBE_RANGE);
        floor.found && ceiling.found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MeshBuilder;
    use approx::assert_relative_eq;

    /// Floor triangle pair covering x and z in [-10, 10] at the given
    /// height, wound so the face normals point up.
    fn push_floor_quad(builder: &mut MeshBuilder, y: f32, surface: SurfaceFlags) {
        builder.push_triangle(
            Vec3::new(-10.0, y, -10.0),
            Vec3::new(-10.0, y, 10.0),
            Vec3::new(10.0, y, -10.0),
            0,
            surface,
        );
        builder.push_triangle(
            Vec3::new(10.0, y, -10.0),
            Vec3::new(-10.0, y, 10.0),
            Vec3::new(10.0, y, 10.0),
            0,
            surface,
        );
    }

    /// Ceiling triangle pair over the same footprint, normals down.
    fn push_ceiling_quad(builder: &mut MeshBuilder, y: f32) {
        builder.push_triangle(
            Vec3::new(-10.0, y, -10.0),
            Vec3::new(10.0, y, -10.0),
            Vec3::new(-10.0, y, 10.0),
            0,
            SurfaceFlags::empty(),
        );
        builder.push_triangle(
            Vec3::new(10.0, y, -10.0),
            Vec3::new(10.0, y, 10.0),
            Vec3::new(-10.0, y, 10.0),
            0,
            SurfaceFlags::empty(),
        );
    }

    /// Wall quad in the x = 0 plane, y in [0, 10], z in [-10, 10].
    fn push_wall_quad(builder: &mut MeshBuilder, surface: SurfaceFlags) {
        builder.push_triangle(
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 10.0, 10.0),
            0,
            surface,
        );
        builder.push_triangle(
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::new(0.0, 10.0, 10.0),
            Vec3::new(0.0, 10.0, -10.0),
            0,
            surface,
        );
    }

    #[test]
    fn test_find_floor_on_flat_ground() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::empty());
        let mesh = builder.build();

        let floor = mesh.find_floor(Vec3::new(0.0, 5.0, 0.0), 100.0);
        assert!(floor.found);
        assert_relative_eq!(floor.floor_y, 0.0, epsilon = 1e-3);
        assert_relative_eq!(floor.normal.y, 1.0, epsilon = 1e-3);
        assert!(floor.flags.contains(SurfaceFlags::WALKABLE));
        assert!(floor.triangle.is_some());
    }

    #[test]
    fn test_find_floor_sentinel_when_nothing_below() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::empty());
        let mesh = builder.build();

        let floor = mesh.find_floor(Vec3::new(500.0, 5.0, 500.0), 100.0);
        assert!(!floor.found);
        assert_relative_eq!(floor.floor_y, -95.0);
        assert_eq!(floor.triangle, None);
        assert!(floor.flags.is_empty());
    }

    #[test]
    fn test_find_floor_picks_highest_below_query() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::empty());
        push_floor_quad(&mut builder, 3.0, SurfaceFlags::empty());
        // Above the acceptance window at query height 5
        push_floor_quad(&mut builder, 7.0, SurfaceFlags::empty());
        let mesh = builder.build();

        let floor = mesh.find_floor(Vec3::new(0.0, 5.0, 0.0), 100.0);
        assert!(floor.found);
        assert_relative_eq!(floor.floor_y, 3.0, epsilon = 1e-3);
    }

    #[test]
    fn test_find_floor_accepts_step_just_above() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::empty());
        push_floor_quad(&mut builder, 5.3, SurfaceFlags::empty());
        let mesh = builder.build();

        let floor = mesh.find_floor(Vec3::new(0.0, 5.0, 0.0), 100.0);
        assert!(floor.found);
        assert_relative_eq!(floor.floor_y, 5.3, epsilon = 0.04);
    }

    #[test]
    fn test_find_floor_moderate_slope_by_fallback() {
        // Plane y = 1.75 x: computed normal y is about 0.5, so not
        // flagged walkable but still standable
        let mut builder = MeshBuilder::new();
        builder.push_triangle(
            Vec3::new(-8.0, -14.0, -8.0),
            Vec3::new(0.0, 0.0, 8.0),
            Vec3::new(8.0, 14.0, -8.0),
            0,
            SurfaceFlags::empty(),
        );
        let mesh = builder.build();
        assert!(mesh.triangle(0).unwrap().has_flag(SurfaceFlags::WALL));

        let floor = mesh.find_floor(Vec3::new(0.0, 2.0, 0.0), 100.0);
        assert!(floor.found);
        assert_relative_eq!(floor.floor_y, 0.0, epsilon = 0.05);
    }

    #[test]
    fn test_find_floor_skips_steep_unflagged_slope() {
        // Plane y = 5 x: computed normal y is about 0.2
        let mut builder = MeshBuilder::new();
        builder.push_triangle(
            Vec3::new(-8.0, -40.0, -8.0),
            Vec3::new(0.0, 0.0, 8.0),
            Vec3::new(8.0, 40.0, -8.0),
            0,
            SurfaceFlags::empty(),
        );
        let mesh = builder.build();

        let floor = mesh.find_floor(Vec3::new(0.0, 5.0, 0.0), 100.0);
        assert!(!floor.found);
        assert_relative_eq!(floor.floor_y, -95.0);
    }

    #[test]
    fn test_find_ceiling_overhead() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::empty());
        push_ceiling_quad(&mut builder, 20.0);
        let mesh = builder.build();

        let ceiling = mesh.find_ceiling(Vec3::new(0.0, 5.0, 0.0), 50.0);
        assert!(ceiling.found);
        assert_relative_eq!(ceiling.floor_y, 20.0, epsilon = 1e-3);
        assert_relative_eq!(ceiling.normal.y, -1.0, epsilon = 1e-2);
        assert!(ceiling.flags.contains(SurfaceFlags::CEILING));
    }

    #[test]
    fn test_find_ceiling_sentinel_above_everything() {
        let mut builder = MeshBuilder::new();
        push_ceiling_quad(&mut builder, 20.0);
        let mesh = builder.build();

        let ceiling = mesh.find_ceiling(Vec3::new(0.0, 25.0, 0.0), 50.0);
        assert!(!ceiling.found);
        assert_relative_eq!(ceiling.floor_y, 75.0);
        assert_relative_eq!(ceiling.normal.y, -1.0);
    }

    #[test]
    fn test_find_ceiling_ignores_floors() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 10.0, SurfaceFlags::empty());
        let mesh = builder.build();

        let ceiling = mesh.find_ceiling(Vec3::new(0.0, 5.0, 0.0), 50.0);
        assert!(!ceiling.found);
    }

    #[test]
    fn test_find_ceiling_from_neighboring_cell() {
        // A ceiling wedge whose footprint ends a hair west of the cell
        // boundary at x = 64, probed from just east of the boundary.
        // The probe radius must pull in the neighboring cell, and the
        // barycentric slack must accept the column.
        let mut builder = MeshBuilder::new();
        // Anchors pin the level bounds to x in [0, 96], three cells
        builder.push_triangle(
            Vec3::new(0.0, 0.0, -16.0),
            Vec3::new(0.0, 0.0, 16.0),
            Vec3::new(8.0, 0.0, 0.0),
            0,
            SurfaceFlags::empty(),
        );
        builder.push_triangle(
            Vec3::new(96.0, 0.0, -16.0),
            Vec3::new(88.0, 0.0, 0.0),
            Vec3::new(96.0, 0.0, 16.0),
            0,
            SurfaceFlags::empty(),
        );
        // The ceiling wedge, apex at x = 63.9375
        builder.push_triangle(
            Vec3::new(48.0625, 10.0, -16.0),
            Vec3::new(63.9375, 10.0, 0.0),
            Vec3::new(48.0625, 10.0, 16.0),
            0,
            SurfaceFlags::empty(),
        );
        let mesh = builder.build();
        assert_eq!(mesh.grid_info().width, 3);
        assert!(mesh.triangle(2).unwrap().has_flag(SurfaceFlags::CEILING));

        let ceiling = mesh.find_ceiling(Vec3::new(64.05, 5.0, 0.0), 50.0);
        assert!(ceiling.found);
        assert_relative_eq!(ceiling.floor_y, 10.0, epsilon = 1e-2);
        assert_eq!(ceiling.triangle, Some(2));
    }

    #[test]
    fn test_check_sphere_pushes_away_from_wall() {
        let mut builder = MeshBuilder::new();
        push_wall_quad(&mut builder, SurfaceFlags::empty());
        let mesh = builder.build();

        let result = mesh.check_sphere(Vec3::new(2.0, 5.0, 0.0), 3.0, SurfaceFlags::empty());
        assert!(result.collided);
        assert!(result.hit_count >= 1);
        assert!(result.push.x > 0.0);
        assert!(result.flags.contains(SurfaceFlags::WALL));
    }

    #[test]
    fn test_check_sphere_miss_reports_nothing() {
        let mut builder = MeshBuilder::new();
        push_wall_quad(&mut builder, SurfaceFlags::empty());
        let mesh = builder.build();

        let result = mesh.check_sphere(Vec3::new(8.0, 5.0, 0.0), 3.0, SurfaceFlags::empty());
        assert!(!result.collided);
        assert_eq!(result.hit_count, 0);
        assert_relative_eq!(result.push.magnitude(), 0.0);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_check_sphere_mask_filters_candidates() {
        let mut builder = MeshBuilder::new();
        push_wall_quad(&mut builder, SurfaceFlags::empty());
        let mesh = builder.build();
        let center = Vec3::new(2.0, 5.0, 0.0);

        assert!(mesh.check_sphere(center, 3.0, SurfaceFlags::WALL).collided);
        assert!(!mesh.check_sphere(center, 3.0, SurfaceFlags::WATER).collided);
        assert!(
            mesh.check_sphere(center, 3.0, SurfaceFlags::empty())
                .collided
        );
    }

    #[test]
    fn test_check_sphere_carries_surface_flags() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::WATER);
        let mesh = builder.build();

        let result = mesh.check_sphere(Vec3::new(0.0, 0.5, 0.0), 2.0, SurfaceFlags::empty());
        assert!(result.collided);
        assert!(
            result
                .flags
                .contains(SurfaceFlags::WALKABLE | SurfaceFlags::WATER)
        );
    }

    #[test]
    fn test_check_sphere_counts_each_triangle_once() {
        // A floor spanning two grid columns; both triangles are listed
        // in both probed cells, but each may contribute only once
        let mut builder = MeshBuilder::new();
        builder.push_triangle(
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(64.0, 0.0, -10.0),
            0,
            SurfaceFlags::empty(),
        );
        builder.push_triangle(
            Vec3::new(64.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(64.0, 0.0, 10.0),
            0,
            SurfaceFlags::empty(),
        );
        let mesh = builder.build();
        assert_eq!(mesh.grid_info().width, 2);

        let result = mesh.check_sphere(Vec3::new(32.0, 0.5, 0.0), 2.0, SurfaceFlags::empty());
        assert_eq!(result.hit_count, 2);
        assert_relative_eq!(result.push.y, 3.0, epsilon = 1e-3);
    }

    #[test]
    fn test_raycast_down_reports_distance_and_triangle() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::empty());
        let mesh = builder.build();

        let hit = mesh
            .raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 20.0)
            .unwrap();
        assert_relative_eq!(hit.distance, 10.0, epsilon = 1e-3);
        assert!(mesh.triangle(hit.triangle).is_some());
    }

    #[test]
    fn test_raycast_returns_closest_of_two() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::empty());
        push_floor_quad(&mut builder, 5.0, SurfaceFlags::empty());
        let mesh = builder.build();

        let hit = mesh
            .raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 20.0)
            .unwrap();
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-3);
    }

    #[test]
    fn test_raycast_normalizes_direction() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::empty());
        let mesh = builder.build();

        let hit = mesh
            .raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -8.0, 0.0), 20.0)
            .unwrap();
        assert_relative_eq!(hit.distance, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_raycast_respects_max_distance() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::empty());
        let mesh = builder.build();

        let hit = mesh.raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 5.0);
        assert!(hit.is_none());
    }

    #[test]
    fn test_raycast_rejects_zero_direction() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::empty());
        let mesh = builder.build();

        assert!(mesh.raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::zeros(), 20.0).is_none());
    }

    #[test]
    fn test_is_point_inside_bracketed_column() {
        let mut builder = MeshBuilder::new();
        push_floor_quad(&mut builder, 0.0, SurfaceFlags::empty());
        push_ceiling_quad(&mut builder, 20.0);
        let mesh = builder.build();

        assert!(mesh.is_point_inside(Vec3::new(0.0, 5.0, 0.0)));
        // Above the ceiling
        assert!(!mesh.is_point_inside(Vec3::new(0.0, 25.0, 0.0)));
        // Below the floor
        assert!(!mesh.is_point_inside(Vec3::new(0.0, -5.0, 0.0)));
        // Outside the footprint
        assert!(!mesh.is_point_inside(Vec3::new(200.0, 5.0, 200.0)));
    }

    #[test]
    fn test_queries_on_unloaded_mesh() {
        let mesh = CollisionMesh::new();

        let floor = mesh.find_floor(Vec3::new(1.0, 2.0, 3.0), 50.0);
        assert!(!floor.found);
        assert_relative_eq!(floor.floor_y, -48.0);

        let ceiling = mesh.find_ceiling(Vec3::new(1.0, 2.0, 3.0), 50.0);
        assert!(!ceiling.found);
        assert_relative_eq!(ceiling.floor_y, 52.0);

        let push = mesh.check_sphere(Vec3::zeros(), 5.0, SurfaceFlags::empty());
        assert!(!push.collided);

        assert!(mesh.raycast(Vec3::zeros(), Vec3::new(0.0, -1.0, 0.0), 100.0).is_none());
        assert!(!mesh.is_point_inside(Vec3::zeros()));
    }

    #[test]
    fn test_checked_set_deduplicates() {
        let mut set = CheckedSet::new();
        assert!(set.insert(7));
        assert!(!set.insert(7));
        assert!(set.insert(9));
        assert!(!set.insert(9));
        assert!(!set.insert(7));
    }

    #[test]
    fn test_checked_set_keeps_accepting_past_capacity() {
        let mut set = CheckedSet::new();
        for i in 0..MAX_CHECKED_TRIS as u32 {
            assert!(set.insert(i));
        }
        // Recorded entries still dedup; unrecorded ones pass through
        assert!(!set.insert(0));
        assert!(set.insert(1000));
        assert!(set.insert(1000));
    }
}
