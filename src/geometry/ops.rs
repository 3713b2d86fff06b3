//! Boolean operations and predicates
//!
//! Collision tests use [`intersects`], which ignores shapes that only touch.
//! Topology tests (rooms sharing a wall) use [`touches_or_intersects`].

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;

use super::types::{segment_distance, signed_ring_area, Bounds, MultiPolygon, Point, Polygon};
use super::{AREA_EPSILON, EPSILON};

pub(crate) type Contour = Vec<[f64; 2]>;
pub(crate) type Shapes = Vec<Vec<Contour>>;

/// Anything the overlay backend can consume
pub trait Planar {
    /// Open contours grouped per polygon: exterior first, then holes
    fn to_shapes(&self) -> Shapes;

    /// Axis-aligned extent, `None` when there is nothing to bound
    fn extent(&self) -> Option<Bounds>;

    /// Every ring of every component
    fn ring_list(&self) -> Vec<&[Point]>;
}

fn polygon_contours(polygon: &Polygon) -> Vec<Contour> {
    polygon
        .rings()
        .map(|ring| ring[..ring.len() - 1].iter().map(|&p| p.into()).collect())
        .collect()
}

impl Planar for Polygon {
    fn to_shapes(&self) -> Shapes {
        vec![polygon_contours(self)]
    }

    fn extent(&self) -> Option<Bounds> {
        Some(self.bounds())
    }

    fn ring_list(&self) -> Vec<&[Point]> {
        self.rings().collect()
    }
}

impl Planar for MultiPolygon {
    fn to_shapes(&self) -> Shapes {
        self.iter().map(polygon_contours).collect()
    }

    fn extent(&self) -> Option<Bounds> {
        self.bounds()
    }

    fn ring_list(&self) -> Vec<&[Point]> {
        self.iter().flat_map(|p| p.rings()).collect()
    }
}

fn close_contour(contour: Contour) -> Vec<Point> {
    let mut ring: Vec<Point> = contour.into_iter().map(Point::from).collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    ring
}

pub(crate) fn from_shapes(shapes: Shapes) -> MultiPolygon {
    shapes
        .into_iter()
        .filter_map(|shape| {
            let mut rings: Vec<Vec<Point>> = shape
                .into_iter()
                .map(close_contour)
                .filter(|ring| ring.len() >= 4 && signed_ring_area(ring).abs() > AREA_EPSILON)
                .collect();
            if rings.is_empty() {
                return None;
            }
            let outer = rings
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| {
                    signed_ring_area(a)
                        .abs()
                        .total_cmp(&signed_ring_area(b).abs())
                })
                .map(|(i, _)| i)
                .unwrap_or(0);
            let exterior = rings.swap_remove(outer);
            Some(Polygon::from_closed_rings(exterior, rings))
        })
        .collect()
}

pub(crate) fn overlay(subject: Shapes, clip: Shapes, rule: OverlayRule) -> MultiPolygon {
    if subject.is_empty() && clip.is_empty() {
        return MultiPolygon::empty();
    }
    from_shapes(subject.overlay(&clip, rule, FillRule::NonZero))
}

/// Union of two shapes
pub fn union<A, B>(a: &A, b: &B) -> MultiPolygon
where
    A: Planar + ?Sized,
    B: Planar + ?Sized,
{
    overlay(a.to_shapes(), b.to_shapes(), OverlayRule::Union)
}

/// Union of any number of shapes in a single overlay pass
pub fn union_all<'a, I, G>(shapes: I) -> MultiPolygon
where
    I: IntoIterator<Item = &'a G>,
    G: Planar + ?Sized + 'a,
{
    let subject: Shapes = shapes.into_iter().flat_map(|g| g.to_shapes()).collect();
    overlay(subject, Vec::new(), OverlayRule::Union)
}

/// Part of `a` not covered by `b`
pub fn difference<A, B>(a: &A, b: &B) -> MultiPolygon
where
    A: Planar + ?Sized,
    B: Planar + ?Sized,
{
    match (a.extent(), b.extent()) {
        (None, _) => MultiPolygon::empty(),
        (Some(ea), Some(eb)) if ea.overlaps(&eb) => {
            overlay(a.to_shapes(), b.to_shapes(), OverlayRule::Difference)
        }
        _ => overlay(a.to_shapes(), Vec::new(), OverlayRule::Union),
    }
}

/// Area shared by `a` and `b`; empty when they only touch
pub fn intersection<A, B>(a: &A, b: &B) -> MultiPolygon
where
    A: Planar + ?Sized,
    B: Planar + ?Sized,
{
    match (a.extent(), b.extent()) {
        (Some(ea), Some(eb)) if ea.overlaps(&eb) => {
            overlay(a.to_shapes(), b.to_shapes(), OverlayRule::Intersect)
        }
        _ => MultiPolygon::empty(),
    }
}

/// Interiors overlap by more than [`AREA_EPSILON`]; touching is not a hit
pub fn intersects<A, B>(a: &A, b: &B) -> bool
where
    A: Planar + ?Sized,
    B: Planar + ?Sized,
{
    match (a.extent(), b.extent()) {
        (Some(ea), Some(eb)) if ea.overlaps(&eb) => intersection(a, b).area() > AREA_EPSILON,
        _ => false,
    }
}

/// Shapes overlap or come within [`EPSILON`] of each other
pub fn touches_or_intersects<A, B>(a: &A, b: &B) -> bool
where
    A: Planar + ?Sized,
    B: Planar + ?Sized,
{
    match (a.extent(), b.extent()) {
        (Some(ea), Some(eb)) if ea.expanded(EPSILON).overlaps(&eb.expanded(EPSILON)) => {
            distance(a, b) <= EPSILON
        }
        _ => false,
    }
}

/// `b` lies entirely inside `a`
pub fn contains<A, B>(a: &A, b: &B) -> bool
where
    A: Planar + ?Sized,
    B: Planar + ?Sized,
{
    let b_shape = overlay(b.to_shapes(), Vec::new(), OverlayRule::Union);
    if b_shape.is_empty() {
        return false;
    }
    difference(&b_shape, a).area() <= AREA_EPSILON
}

fn contains_any_vertex(container: &MultiPolygon, rings: &[&[Point]]) -> bool {
    rings
        .iter()
        .flat_map(|ring| ring.iter())
        .any(|&p| container.contains_point(p))
}

/// Minimum boundary-to-boundary distance; zero when the shapes overlap
pub fn distance<A, B>(a: &A, b: &B) -> f64
where
    A: Planar + ?Sized,
    B: Planar + ?Sized,
{
    let rings_a = a.ring_list();
    let rings_b = b.ring_list();
    if rings_a.is_empty() || rings_b.is_empty() {
        return f64::INFINITY;
    }

    let shape_a = from_shapes(a.to_shapes());
    let shape_b = from_shapes(b.to_shapes());
    if contains_any_vertex(&shape_a, &rings_b) || contains_any_vertex(&shape_b, &rings_a) {
        return 0.0;
    }

    let mut best = f64::INFINITY;
    for ra in &rings_a {
        for ea in ra.windows(2) {
            for rb in &rings_b {
                for eb in rb.windows(2) {
                    best = best.min(segment_distance(ea[0], ea[1], eb[0], eb[1]));
                    if best == 0.0 {
                        return 0.0;
                    }
                }
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon {
        Polygon::rectangle(min_x, min_y, max_x, max_y).unwrap()
    }

    #[test]
    fn test_union_of_overlapping_squares() {
        let merged = union(&rect(0.0, 0.0, 2.0, 2.0), &rect(1.0, 0.0, 3.0, 2.0));
        assert_eq!(merged.len(), 1);
        assert!((merged.area() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_union_of_disjoint_squares_stays_multi() {
        let merged = union(&rect(0.0, 0.0, 1.0, 1.0), &rect(5.0, 5.0, 6.0, 6.0));
        assert_eq!(merged.len(), 2);
        assert!((merged.area() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_union_all_single_pass() {
        let parts = vec![
            rect(0.0, 0.0, 2.0, 2.0),
            rect(1.0, 1.0, 3.0, 3.0),
            rect(10.0, 10.0, 11.0, 11.0),
        ];
        let merged = union_all(&parts);
        assert_eq!(merged.len(), 2);
        assert!((merged.area() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_difference_cuts_hole() {
        let ring = difference(&rect(0.0, 0.0, 4.0, 4.0), &rect(1.0, 1.0, 3.0, 3.0));
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.polygons()[0].holes().len(), 1);
        assert!((ring.area() - 12.0).abs() < 1e-6);
    }

    #[test]
    fn test_difference_with_disjoint_clip_is_identity() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let d = difference(&a, &rect(3.0, 3.0, 4.0, 4.0));
        assert!((d.area() - 1.0).abs() < 1e-6);
        assert!(difference(&MultiPolygon::empty(), &a).is_empty());
    }

    #[test]
    fn test_intersection_of_touching_squares_is_empty() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 0.0, 2.0, 1.0);
        assert!(intersection(&a, &b).is_empty());
        assert!(!intersects(&a, &b));
        assert!(touches_or_intersects(&a, &b));
    }

    #[test]
    fn test_intersects_overlapping() {
        let a = rect(0.0, 0.0, 2.0, 2.0);
        let b = rect(1.0, 1.0, 3.0, 3.0);
        assert!(intersects(&a, &b));
        assert!((intersection(&a, &b).area() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_separated_squares_do_not_touch() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.5, 0.0, 2.5, 1.0);
        assert!(!touches_or_intersects(&a, &b));
        assert!((distance(&a, &b) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_contains() {
        let outer = rect(0.0, 0.0, 10.0, 10.0);
        let inner = rect(1.0, 1.0, 2.0, 2.0);
        let straddling = rect(9.0, 9.0, 11.0, 11.0);
        assert!(contains(&outer, &inner));
        assert!(!contains(&outer, &straddling));
        assert!(!contains(&inner, &outer));
        assert!(!contains(&outer, &MultiPolygon::empty()));
    }

    #[test]
    fn test_distance_nested_is_zero() {
        let outer = rect(0.0, 0.0, 10.0, 10.0);
        let inner = rect(4.0, 4.0, 5.0, 5.0);
        assert_eq!(distance(&outer, &inner), 0.0);
        assert_eq!(distance(&outer, &MultiPolygon::empty()), f64::INFINITY);
    }
}
