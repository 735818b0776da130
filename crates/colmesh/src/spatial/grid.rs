//! Uniform XZ grid over a collision triangle set
//!
//! Divides the level footprint into fixed-size cells on the XZ plane;
//! each cell lists the indices of every triangle whose XZ bounding box
//! overlaps it. Storage is a flat index buffer addressed by per-cell
//! offsets, built with a count/prefix-sum/fill pass, so crowded cells
//! never drop triangles and lookups never allocate.

use crate::foundation::math::Aabb;
use crate::format::ColTriangle;

/// Edge length of one grid cell in world units.
pub const CELL_SIZE: f32 = 32.0;

/// Upper bound on cells collected by a single overlap query.
pub const MAX_QUERY_CELLS: usize = 16;

/// Placement and dimensions of a built grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridInfo {
    /// Cell columns along X
    pub width: i32,
    /// Cell rows along Z
    pub height: i32,
    /// World X of the western grid edge
    pub origin_x: f32,
    /// World Z of the northern grid edge
    pub origin_z: f32,
    /// Edge length of one cell
    pub cell_size: f32,
}

/// Broad-phase acceleration structure for triangle queries.
///
/// The default value is an empty zero-by-zero grid; every lookup on it
/// reports no cells and no triangles.
#[derive(Debug, Clone, Default)]
pub struct UniformGrid {
    width: i32,
    height: i32,
    origin_x: f32,
    origin_z: f32,
    /// Row starts into `indices`; length is `width * height + 1`
    offsets: Vec<u32>,
    /// Triangle indices grouped per cell
    indices: Vec<u32>,
}

impl UniformGrid {
    /// Build a grid covering `bounds` in XZ.
    ///
    /// Each triangle is listed in every cell its XZ bounding box touches.
    /// Triangles are expected to lie inside `bounds`; cell ranges are
    /// clamped to the grid either way.
    pub fn build(triangles: &[ColTriangle], bounds: Aabb) -> Self {
        let width = (((bounds.max.x - bounds.min.x) / CELL_SIZE).ceil() as i32).max(1);
        let height = (((bounds.max.z - bounds.min.z) / CELL_SIZE).ceil() as i32).max(1);
        let origin_x = bounds.min.x;
        let origin_z = bounds.min.z;
        let cell_count = (width as usize) * (height as usize);

        // Count triangles per cell
        let mut counts = vec![0u32; cell_count];
        for triangle in triangles {
            for cell in cell_range(triangle, origin_x, origin_z, width, height) {
                counts[cell] += 1;
            }
        }

        // Prefix-sum the counts into row starts
        let mut offsets = vec![0u32; cell_count + 1];
        for i in 0..cell_count {
            offsets[i + 1] = offsets[i] + counts[i];
        }

        // Fill, advancing a per-cell cursor
        let mut cursors: Vec<u32> = offsets[..cell_count].to_vec();
        let mut indices = vec![0u32; offsets[cell_count] as usize];
        for (triangle_index, triangle) in triangles.iter().enumerate() {
            for cell in cell_range(triangle, origin_x, origin_z, width, height) {
                indices[cursors[cell] as usize] = triangle_index as u32;
                cursors[cell] += 1;
            }
        }

        Self {
            width,
            height,
            origin_x,
            origin_z,
            offsets,
            indices,
        }
    }

    /// Linear index of the cell containing the XZ point, or `None`
    /// outside the grid.
    ///
    /// The cast truncates toward zero, so points less than one cell
    /// outside the min corner land in the edge cells.
    pub fn cell_index(&self, x: f32, z: f32) -> Option<usize> {
        let cx = ((x - self.origin_x) / CELL_SIZE) as i32;
        let cz = ((z - self.origin_z) / CELL_SIZE) as i32;
        if cx < 0 || cx >= self.width || cz < 0 || cz >= self.height {
            return None;
        }
        Some((cz * self.width + cx) as usize)
    }

    /// Collect every cell whose footprint may intersect the circle at
    /// (`x`, `z`) with `radius`, writing linear indices into `out`.
    ///
    /// Returns the number of cells written. Cells beyond the buffer are
    /// silently omitted; callers size `out` for their probe radius
    /// ([`MAX_QUERY_CELLS`] covers every query radius the engine uses).
    pub fn overlapping_cells(&self, x: f32, z: f32, radius: f32, out: &mut [u32]) -> usize {
        // Whole-grid rejection before any per-cell work
        if x + radius < self.origin_x
            || x - radius > self.origin_x + self.width as f32 * CELL_SIZE
            || z + radius < self.origin_z
            || z - radius > self.origin_z + self.height as f32 * CELL_SIZE
        {
            return 0;
        }

        let min_cx = (((x - radius - self.origin_x) / CELL_SIZE).floor() as i32).max(0);
        let max_cx = (((x + radius - self.origin_x) / CELL_SIZE).floor() as i32).min(self.width - 1);
        let min_cz = (((z - radius - self.origin_z) / CELL_SIZE).floor() as i32).max(0);
        let max_cz =
            (((z + radius - self.origin_z) / CELL_SIZE).floor() as i32).min(self.height - 1);

        let mut count = 0;
        for cz in min_cz..=max_cz {
            for cx in min_cx..=max_cx {
                if count == out.len() {
                    return count;
                }
                out[count] = (cz * self.width + cx) as u32;
                count += 1;
            }
        }
        count
    }

    /// Triangle indices listed in the given cell.
    ///
    /// Out-of-range cells yield an empty slice.
    pub fn cell_triangles(&self, cell: usize) -> &[u32] {
        match (self.offsets.get(cell), self.offsets.get(cell + 1)) {
            (Some(&start), Some(&end)) => &self.indices[start as usize..end as usize],
            _ => &[],
        }
    }

    /// Number of triangles listed in the cell at (`cell_x`, `cell_z`),
    /// zero outside the grid.
    pub fn cell_triangle_count(&self, cell_x: i32, cell_z: i32) -> usize {
        if cell_x < 0 || cell_x >= self.width || cell_z < 0 || cell_z >= self.height {
            return 0;
        }
        self.cell_triangles((cell_z * self.width + cell_x) as usize)
            .len()
    }

    /// Grid placement and dimensions.
    pub fn info(&self) -> GridInfo {
        GridInfo {
            width: self.width,
            height: self.height,
            origin_x: self.origin_x,
            origin_z: self.origin_z,
            cell_size: CELL_SIZE,
        }
    }
}

/// Linear indices of the cells a triangle's XZ bounding box touches.
///
/// The range is empty for triangles entirely outside the grid.
fn cell_range(
    triangle: &ColTriangle,
    origin_x: f32,
    origin_z: f32,
    width: i32,
    height: i32,
) -> impl Iterator<Item = usize> {
    let [a, b, c] = triangle.vertices();
    let min_x = a.x.min(b.x).min(c.x);
    let max_x = a.x.max(b.x).max(c.x);
    let min_z = a.z.min(b.z).min(c.z);
    let max_z = a.z.max(b.z).max(c.z);

    let min_cx = (((min_x - origin_x) / CELL_SIZE) as i32).max(0);
    let max_cx = (((max_x - origin_x) / CELL_SIZE) as i32).min(width - 1);
    let min_cz = (((min_z - origin_z) / CELL_SIZE) as i32).max(0);
    let max_cz = (((max_z - origin_z) / CELL_SIZE) as i32).min(height - 1);

    (min_cz..=max_cz)
        .flat_map(move |cz| (min_cx..=max_cx).map(move |cx| (cz * width + cx) as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::format::SurfaceFlags;

    fn quantized_triangle(v0: Vec3, v1: Vec3, v2: Vec3) -> ColTriangle {
        let quantize = |v: Vec3| {
            [
                (v.x * 16.0).round() as i16,
                (v.y * 16.0).round() as i16,
                (v.z * 16.0).round() as i16,
            ]
        };
        ColTriangle {
            v0: quantize(v0),
            v1: quantize(v1),
            v2: quantize(v2),
            normal: [0, 127, 0],
            material: 0,
            flags: SurfaceFlags::WALKABLE,
            reserved: [0; 8],
        }
    }

    fn test_bounds() -> Aabb {
        Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(96.0, 10.0, 64.0))
    }

    #[test]
    fn test_dimensions_cover_bounds() {
        let grid = UniformGrid::build(&[], test_bounds());
        let info = grid.info();
        assert_eq!(info.width, 3);
        assert_eq!(info.height, 2);
        assert_eq!(info.origin_x, 0.0);
        assert_eq!(info.cell_size, CELL_SIZE);
    }

    #[test]
    fn test_tiny_bounds_still_get_one_cell() {
        let bounds = Aabb::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let info = UniformGrid::build(&[], bounds).info();
        assert_eq!(info.width, 1);
        assert_eq!(info.height, 1);
    }

    #[test]
    fn test_triangle_listed_in_every_overlapped_cell() {
        // Spans x 16..80, crossing the boundaries at 32 and 64
        let tri = quantized_triangle(
            Vec3::new(16.0, 0.0, 8.0),
            Vec3::new(80.0, 0.0, 8.0),
            Vec3::new(48.0, 0.0, 24.0),
        );
        let grid = UniformGrid::build(&[tri], test_bounds());

        for cell_x in 0..3 {
            assert_eq!(
                grid.cell_triangle_count(cell_x, 0),
                1,
                "missing from cell {cell_x}"
            );
        }
        // Row z = 1 is untouched
        assert_eq!(grid.cell_triangle_count(0, 1), 0);
    }

    #[test]
    fn test_small_triangle_listed_once() {
        let tri = quantized_triangle(
            Vec3::new(40.0, 0.0, 40.0),
            Vec3::new(44.0, 0.0, 40.0),
            Vec3::new(42.0, 0.0, 44.0),
        );
        let grid = UniformGrid::build(&[tri], test_bounds());

        let total: usize = (0..3)
            .flat_map(|x| (0..2).map(move |z| (x, z)))
            .map(|(x, z)| grid.cell_triangle_count(x, z))
            .sum();
        assert_eq!(total, 1);
        assert_eq!(grid.cell_triangle_count(1, 1), 1);
    }

    #[test]
    fn test_cell_index_inside_and_outside() {
        let grid = UniformGrid::build(&[], test_bounds());
        assert_eq!(grid.cell_index(1.0, 1.0), Some(0));
        assert_eq!(grid.cell_index(40.0, 40.0), Some(4));
        assert_eq!(grid.cell_index(-40.0, 1.0), None);
        assert_eq!(grid.cell_index(1.0, 100.0), None);
    }

    #[test]
    fn test_overlapping_cells_straddles_boundary() {
        let grid = UniformGrid::build(&[], test_bounds());
        let mut cells = [0u32; MAX_QUERY_CELLS];

        // Radius 2 around x = 32 touches columns 0 and 1
        let count = grid.overlapping_cells(32.0, 8.0, 2.0, &mut cells);
        assert_eq!(count, 2);
        assert_eq!(&cells[..2], &[0, 1]);
    }

    #[test]
    fn test_overlapping_cells_far_outside_is_empty() {
        let grid = UniformGrid::build(&[], test_bounds());
        let mut cells = [0u32; MAX_QUERY_CELLS];
        assert_eq!(grid.overlapping_cells(500.0, 500.0, 4.0, &mut cells), 0);
        assert_eq!(grid.overlapping_cells(-500.0, 8.0, 4.0, &mut cells), 0);
    }

    #[test]
    fn test_overlapping_cells_respects_buffer_capacity() {
        let bounds = Aabb::new(Vec3::zeros(), Vec3::new(320.0, 10.0, 320.0));
        let grid = UniformGrid::build(&[], bounds);

        // Radius 100 covers far more than four cells
        let mut cells = [0u32; 4];
        let count = grid.overlapping_cells(160.0, 160.0, 100.0, &mut cells);
        assert_eq!(count, 4);
    }

    #[test]
    fn test_empty_grid_is_total() {
        let grid = UniformGrid::default();
        let mut cells = [0u32; MAX_QUERY_CELLS];
        assert_eq!(grid.overlapping_cells(0.0, 0.0, 10.0, &mut cells), 0);
        assert_eq!(grid.cell_index(0.0, 0.0), None);
        assert!(grid.cell_triangles(0).is_empty());
        assert_eq!(grid.cell_triangle_count(0, 0), 0);
    }
}
