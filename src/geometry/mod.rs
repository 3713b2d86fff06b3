//! Polygon kernel for footprints, rooms and workspaces
//!
//! Boolean algebra is delegated to the `i_overlay` float overlay; buffering,
//! predicates and metrics are built on top of it. All predicates share the
//! tolerances below so "touching" is classified the same way everywhere.

pub mod buffer;
pub mod error;
pub mod hull;
pub mod ops;
pub mod types;

pub use buffer::{boundary_buffer, buffer, circle, JoinStyle};
pub use error::GeometryError;
pub use hull::convex_hull;
pub use ops::{
    contains, difference, distance, intersection, intersects, touches_or_intersects, union,
    union_all,
};
pub use types::{Bounds, MultiPolygon, Point, Polygon};

/// Distance below which two shapes are considered touching
pub const EPSILON: f64 = 1e-6;

/// Area below which an overlap or a ring is considered degenerate
pub const AREA_EPSILON: f64 = 1e-6;

/// Segments used per quarter circle when approximating arcs
pub const QUAD_SEGMENTS: usize = 16;
