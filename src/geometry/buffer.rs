//! Buffering (Minkowski offset) and circle construction
//!
//! Offsets are delegated to the overlay backend: `outline` for polygon
//! buffers and a closed `stroke` for bands around rings. The backend wants
//! exteriors clockwise and holes counter-clockwise, the reverse of
//! [`Polygon`]'s own orientation.

use std::f64::consts::PI;

use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::mesh::outline::offset::OutlineOffset;
use i_overlay::mesh::stroke::offset::StrokeOffset;
use i_overlay::mesh::style::{LineJoin, OutlineStyle, StrokeStyle};

use super::error::GeometryError;
use super::ops::{from_shapes, overlay, Contour, Planar, Shapes};
use super::types::{MultiPolygon, Point, Polygon};
use super::{EPSILON, QUAD_SEGMENTS};

/// How offset edges are connected at vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoinStyle {
    /// Circular arc around each vertex
    Round,
    /// Extend edges to their intersection; corners whose mitre would reach
    /// past `limit` times the buffer distance are clipped
    Mitre { limit: f64 },
    /// Straight cut between the offset edge ends
    Bevel,
}

impl Default for JoinStyle {
    fn default() -> Self {
        JoinStyle::Round
    }
}

impl JoinStyle {
    fn line_join(self) -> LineJoin<f64> {
        match self {
            // arc step of one circle segment
            JoinStyle::Round => LineJoin::Round(PI / (2.0 * QUAD_SEGMENTS as f64)),
            // a mitre of length `limit * d` at a corner of angle a has
            // 1 / sin(a / 2) = limit, so sharper corners get clipped
            JoinStyle::Mitre { limit } => LineJoin::Miter(2.0 * (1.0 / limit.max(1.0)).asin()),
            JoinStyle::Bevel => LineJoin::Bevel,
        }
    }
}

fn circle_contour(center: Point, radius: f64) -> Contour {
    let n = 4 * QUAD_SEGMENTS;
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            [center.x + radius * angle.cos(), center.y + radius * angle.sin()]
        })
        .collect()
}

/// Regular polygon approximating a disk
pub fn circle(center: Point, radius: f64) -> Result<Polygon, GeometryError> {
    if !(radius > EPSILON) {
        return Err(GeometryError::invalid(format!(
            "circle radius must be positive, got {}",
            radius
        )));
    }
    Polygon::from_points(circle_contour(center, radius).into_iter().map(Point::from))
}

/// Open ring without its closing point
fn open_ring(ring: &[Point]) -> Contour {
    ring[..ring.len().saturating_sub(1)].iter().map(|&p| p.into()).collect()
}

/// Offset a shape outward (positive distance) or inward (negative distance)
///
/// Zero returns the shape unchanged. Inward buffers that consume the whole
/// shape return an empty multi-polygon.
pub fn buffer<G>(shape: &G, distance: f64, join: JoinStyle) -> MultiPolygon
where
    G: Planar + ?Sized,
{
    if distance.abs() <= EPSILON {
        return overlay(shape.to_shapes(), Vec::new(), OverlayRule::Union);
    }
    let mut subject: Shapes = shape.to_shapes();
    for contour in subject.iter_mut().flatten() {
        contour.reverse();
    }
    if subject.is_empty() {
        return MultiPolygon::empty();
    }
    let style = OutlineStyle::new(distance).line_join(join.line_join());
    from_shapes(subject.outline(style))
}

/// Buffer the boundary of a polygon: a closed band of half-width `distance`
/// centred on every ring
pub fn boundary_buffer(polygon: &Polygon, distance: f64, join: JoinStyle) -> MultiPolygon {
    if distance <= EPSILON {
        return MultiPolygon::empty();
    }
    let rings: Vec<Contour> = polygon.rings().map(open_ring).collect();
    let style = StrokeStyle::<[f64; 2], f64>::new(2.0 * distance).line_join(join.line_join());
    from_shapes(rings.stroke(style, true))
}
