//! Free-space resolution: boundary minus excluded footprints
//!
//! Results are never cached here; callers recompute after every placement.

use crate::geometry::{difference, intersection, union_all, MultiPolygon, Polygon};

/// `difference(boundary, union(excluded))`, clipped to the boundary
pub fn free_space<'a, I>(boundary: &MultiPolygon, excluded: I) -> MultiPolygon
where
    I: IntoIterator<Item = &'a MultiPolygon>,
{
    if boundary.is_empty() {
        return MultiPolygon::empty();
    }
    let blocked = union_all(excluded);
    let remaining = difference(boundary, &blocked);
    intersection(&remaining, boundary)
}

/// Largest component of a region, for callers that need a single polygon
pub fn largest_component(region: &MultiPolygon) -> Option<Polygon> {
    region.largest().cloned()
}
