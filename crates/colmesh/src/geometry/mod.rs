//! Narrow-phase geometric predicates
//!
//! Pure functions over decoded triangle vertices. The broad phase hands
//! candidate triangles to these tests; nothing here allocates or keeps
//! state.

mod predicates;

pub use predicates::{
    closest_point_on_segment, face_normal, point_in_triangle_xz, ray_triangle_intersect,
    sphere_triangle_push, BARY_EPSILON,
};
