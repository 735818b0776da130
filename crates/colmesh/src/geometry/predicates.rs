//! Primitive intersection predicates for collision triangles
//!
//! Free functions rather than shape types: triangles arrive as decoded
//! records, so every predicate takes three vertices directly. All
//! predicates are total; degenerate input reports a miss instead of
//! producing NaN.

use crate::foundation::math::Vec3;

/// Slack applied to barycentric bounds.
///
/// Points sitting exactly on an edge shared by two triangles must be
/// accepted by at least one of them, so the bounds are loosened slightly
/// in both directions.
pub const BARY_EPSILON: f32 = 0.01;

/// Determinant threshold below which a ray counts as parallel to a plane.
const RAY_PARALLEL_EPSILON: f32 = 1e-5;

/// Minimum accepted ray parameter, filtering hits at the ray origin.
const RAY_MIN_T: f32 = 1e-4;

/// Lengths and denominators below this count as degenerate.
const DEGENERATE_EPSILON: f32 = 1e-4;

/// Unit face normal from the winding order, or `None` for a sliver
/// triangle with near-zero area.
pub fn face_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Option<Vec3> {
    let normal = (v1 - v0).cross(&(v2 - v0));
    let length = normal.magnitude();
    if length < DEGENERATE_EPSILON {
        return None;
    }
    Some(normal / length)
}

/// Test whether the vertical line through (`x`, `z`) passes through the
/// triangle's footprint in the XZ plane.
///
/// Y coordinates are ignored entirely; floor and ceiling probes resolve
/// the height on the triangle plane afterwards.
pub fn point_in_triangle_xz(a: Vec3, b: Vec3, c: Vec3, x: f32, z: f32) -> bool {
    let (v0x, v0z) = (c.x - a.x, c.z - a.z);
    let (v1x, v1z) = (b.x - a.x, b.z - a.z);
    let (v2x, v2z) = (x - a.x, z - a.z);

    let dot00 = v0x * v0x + v0z * v0z;
    let dot01 = v0x * v1x + v0z * v1z;
    let dot02 = v0x * v2x + v0z * v2z;
    let dot11 = v1x * v1x + v1z * v1z;
    let dot12 = v1x * v2x + v1z * v2z;

    let denom = dot00 * dot11 - dot01 * dot01;
    // Degenerate footprint (collinear in XZ, e.g. a vertical wall)
    if denom.abs() < DEGENERATE_EPSILON {
        return false;
    }

    let inv = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv;
    let v = (dot00 * dot12 - dot01 * dot02) * inv;

    u >= -BARY_EPSILON && v >= -BARY_EPSILON && u + v <= 1.0 + BARY_EPSILON
}

/// Möller-Trumbore ray-triangle intersection.
///
/// `direction` must be normalized; the returned parameter is then the
/// world-space distance from `origin` to the hit point. Hits closer than
/// a small threshold are rejected so a ray starting on a surface does
/// not immediately hit it.
pub fn ray_triangle_intersect(
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    origin: Vec3,
    direction: Vec3,
) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = direction.cross(&edge2);
    let det = edge1.dot(&h);

    // Ray parallel to triangle?
    if det.abs() < RAY_PARALLEL_EPSILON {
        return None;
    }

    let inv = 1.0 / det;
    let s = origin - v0;
    let u = inv * s.dot(&h);
    if u < 0.0 || u > 1.0 {
        return None;
    }

    let q = s.cross(&edge1);
    let v = inv * direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = inv * edge2.dot(&q);
    if t > RAY_MIN_T {
        Some(t)
    } else {
        None
    }
}

/// Sphere-triangle intersection returning the push-out vector.
///
/// Two tiers: if the sphere center projects inside the triangle the push
/// is along the face normal by the penetration depth; otherwise the
/// closest point on the three edges decides, pushing radially away from
/// the contact. `None` means no contact (or a contact too degenerate to
/// derive a direction from).
pub fn sphere_triangle_push(
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    center: Vec3,
    radius: f32,
) -> Option<Vec3> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let cross = edge1.cross(&edge2);
    let cross_len = cross.magnitude();
    if cross_len < DEGENERATE_EPSILON {
        return None;
    }
    let normal = cross / cross_len;

    // Signed distance from the triangle plane
    let dist = normal.dot(&center) - normal.dot(&v0);
    if dist.abs() > radius {
        return None;
    }

    // Project the center onto the plane and test the footprint
    let projected = center - normal * dist;
    let to_projected = projected - v0;

    let dot00 = edge2.dot(&edge2);
    let dot01 = edge2.dot(&edge1);
    let dot02 = edge2.dot(&to_projected);
    let dot11 = edge1.dot(&edge1);
    let dot12 = edge1.dot(&to_projected);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() < DEGENERATE_EPSILON {
        return None;
    }
    let inv = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv;
    let v = (dot00 * dot12 - dot01 * dot02) * inv;

    if u >= -BARY_EPSILON && v >= -BARY_EPSILON && u + v <= 1.0 + BARY_EPSILON {
        // Face contact: push along the normal, away from whichever side
        // the center sits on
        let depth = radius - dist.abs();
        let push = normal * depth;
        return Some(if dist < 0.0 { -push } else { push });
    }

    // Outside the face: closest approach is to one of the edges
    let mut closest = v0;
    let mut closest_dist2 = radius * radius + 1.0;
    for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
        let candidate = closest_point_on_segment(a, b, center);
        let dist2 = (center - candidate).magnitude_squared();
        if dist2 < closest_dist2 {
            closest_dist2 = dist2;
            closest = candidate;
        }
    }

    if closest_dist2 > radius * radius {
        return None;
    }
    let edge_dist = closest_dist2.sqrt();
    // Center on the edge itself: no direction to push along
    if edge_dist < DEGENERATE_EPSILON {
        return None;
    }
    Some((center - closest) / edge_dist * (radius - edge_dist))
}

/// Closest point to `point` on the segment from `a` to `b`.
///
/// The denominator is padded so a zero-length segment yields `a` instead
/// of NaN.
pub fn closest_point_on_segment(a: Vec3, b: Vec3, point: Vec3) -> Vec3 {
    let ab = b - a;
    let t = (point - a).dot(&ab) / (ab.magnitude_squared() + DEGENERATE_EPSILON);
    a + ab * t.clamp(0.0, 1.0)
}
