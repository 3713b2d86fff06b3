//! Core planar types: points, bounds, polygons and multi-polygons
//!
//! Rings are stored closed (first point repeated at the end). Exterior rings
//! are normalized to counter-clockwise order and holes to clockwise order, so
//! every polygon handed to the overlay backend has a consistent winding.

use serde::{Deserialize, Serialize};

use super::error::GeometryError;
use super::{AREA_EPSILON, EPSILON};

/// A point in the plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotate around the origin by `angle` radians (counter-clockwise positive)
    pub fn rotated(&self, angle: f64) -> Point {
        let (sin_a, cos_a) = angle.sin_cos();
        Point::new(
            self.x * cos_a - self.y * sin_a,
            self.x * sin_a + self.y * cos_a,
        )
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    pub(crate) fn approx_eq(&self, other: Point) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Axis-aligned extent of a shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest bounds containing every point, `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc, p| {
            Some(match acc {
                None => Bounds::new(p.x, p.y, p.x, p.y),
                Some(b) => Bounds::new(
                    b.min_x.min(p.x),
                    b.min_y.min(p.y),
                    b.max_x.max(p.x),
                    b.max_y.max(p.y),
                ),
            })
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// `(xmin, ymin, xmax, ymax)`
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.min_y, self.max_x, self.max_y)
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn expanded(&self, margin: f64) -> Bounds {
        Bounds::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }

    /// Interiors overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Signed shoelace area of a closed ring (positive when counter-clockwise)
pub(crate) fn signed_ring_area(ring: &[Point]) -> f64 {
    ring.windows(2)
        .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
        .sum::<f64>()
        / 2.0
}

/// Close a ring in place, dropping consecutive duplicates
fn close_ring(mut points: Vec<Point>) -> Vec<Point> {
    points.dedup_by(|a, b| a.approx_eq(*b));
    if let (Some(first), Some(last)) = (points.first().copied(), points.last().copied()) {
        if !first.approx_eq(last) {
            points.push(first);
        } else if let Some(end) = points.last_mut() {
            *end = first;
        }
    }
    points
}

/// Reorient a closed ring so its signed area has the requested sign
fn orient_ring(mut ring: Vec<Point>, counter_clockwise: bool) -> Vec<Point> {
    if (signed_ring_area(&ring) > 0.0) != counter_clockwise {
        ring.reverse();
    }
    ring
}

pub(crate) fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

/// Segments `ab` and `cd` share at least one point
pub(crate) fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let d1 = orientation(c, d, a);
    let d2 = orientation(c, d, b);
    let d3 = orientation(a, b, c);
    let d4 = orientation(a, b, d);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1.abs() <= EPSILON && on_segment(c, d, a))
        || (d2.abs() <= EPSILON && on_segment(c, d, b))
        || (d3.abs() <= EPSILON && on_segment(a, b, c))
        || (d4.abs() <= EPSILON && on_segment(a, b, d))
}

pub(crate) fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

pub(crate) fn segment_distance(a: Point, b: Point, c: Point, d: Point) -> f64 {
    if segments_intersect(a, b, c, d) {
        return 0.0;
    }
    point_segment_distance(a, c, d)
        .min(point_segment_distance(b, c, d))
        .min(point_segment_distance(c, a, b))
        .min(point_segment_distance(d, a, b))
}

fn ring_is_simple(ring: &[Point]) -> bool {
    let n = ring.len() - 1;
    for i in 0..n {
        for j in (i + 1)..n {
            // neighbouring edges share a vertex by construction
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            if segments_intersect(ring[i], ring[i + 1], ring[j], ring[j + 1]) {
                return false;
            }
        }
    }
    true
}

/// Even-odd crossing test against a closed ring
fn ring_contains_point(ring: &[Point], p: Point) -> bool {
    let mut inside = false;
    for w in ring.windows(2) {
        let (a, b) = (w[0], w[1]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

fn ring_centroid(ring: &[Point]) -> (f64, f64, f64) {
    let mut cx = 0.0;
    let mut cy = 0.0;
    let mut twice_area = 0.0;
    for w in ring.windows(2) {
        let cross = w[0].x * w[1].y - w[1].x * w[0].y;
        twice_area += cross;
        cx += (w[0].x + w[1].x) * cross;
        cy += (w[0].y + w[1].y) * cross;
    }
    (cx, cy, twice_area)
}

/// A simple polygon with optional holes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    exterior: Vec<Point>,
    holes: Vec<Vec<Point>>,
}

impl Polygon {
    /// Build a polygon, validating every ring
    ///
    /// Rings may be given open or closed and in either orientation. Each ring
    /// must have at least three distinct points, enclose a positive area and
    /// not cross itself; every hole must lie inside the exterior.
    pub fn new(exterior: Vec<Point>, holes: Vec<Vec<Point>>) -> Result<Self, GeometryError> {
        let exterior = validate_ring(exterior, "exterior")?;
        let mut checked_holes = Vec::with_capacity(holes.len());
        for (i, hole) in holes.into_iter().enumerate() {
            let hole = validate_ring(hole, &format!("hole {}", i))?;
            if !ring_contains_point(&exterior, hole[0]) {
                return Err(GeometryError::invalid(format!(
                    "hole {} lies outside the exterior ring",
                    i
                )));
            }
            checked_holes.push(orient_ring(hole, false));
        }
        Ok(Self {
            exterior: orient_ring(exterior, true),
            holes: checked_holes,
        })
    }

    /// Build from rings that are already closed and valid (overlay output)
    pub(crate) fn from_closed_rings(exterior: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        Self {
            exterior: orient_ring(exterior, true),
            holes: holes.into_iter().map(|h| orient_ring(h, false)).collect(),
        }
    }

    /// Build a polygon without holes from a list of vertices
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Result<Self, GeometryError> {
        Self::new(points.into_iter().collect(), Vec::new())
    }

    /// Axis-aligned rectangle from its extremes
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, GeometryError> {
        if max_x - min_x <= EPSILON || max_y - min_y <= EPSILON {
            return Err(GeometryError::invalid(format!(
                "rectangle [{}, {}] x [{}, {}] has no area",
                min_x, max_x, min_y, max_y
            )));
        }
        Self::from_points([
            Point::new(min_x, min_y),
            Point::new(max_x, min_y),
            Point::new(max_x, max_y),
            Point::new(min_x, max_y),
        ])
    }

    /// Closed exterior ring, counter-clockwise
    pub fn exterior(&self) -> &[Point] {
        &self.exterior
    }

    /// Closed hole rings, clockwise
    pub fn holes(&self) -> &[Vec<Point>] {
        &self.holes
    }

    pub fn rings(&self) -> impl Iterator<Item = &[Point]> {
        std::iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(|h| h.as_slice()))
    }

    /// Same polygon with its holes filled
    pub fn without_holes(&self) -> Polygon {
        Self {
            exterior: self.exterior.clone(),
            holes: Vec::new(),
        }
    }

    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(|h| signed_ring_area(h).abs()).sum();
        (signed_ring_area(&self.exterior).abs() - holes).max(0.0)
    }

    pub fn bounds(&self) -> Bounds {
        // a validated exterior always has points
        Bounds::from_points(self.exterior.iter().copied())
            .unwrap_or_else(|| Bounds::new(0.0, 0.0, 0.0, 0.0))
    }

    pub fn centroid(&self) -> Point {
        let (mut cx, mut cy, mut twice_area) = (0.0, 0.0, 0.0);
        for ring in self.rings() {
            let (x, y, a) = ring_centroid(ring);
            cx += x;
            cy += y;
            twice_area += a;
        }
        if twice_area.abs() <= AREA_EPSILON {
            let n = (self.exterior.len() - 1).max(1) as f64;
            let (sx, sy) = self.exterior[..self.exterior.len() - 1]
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            return Point::new(sx / n, sy / n);
        }
        Point::new(cx / (3.0 * twice_area), cy / (3.0 * twice_area))
    }

    /// Point lies inside the exterior and outside every hole
    pub fn contains_point(&self, p: Point) -> bool {
        self.bounds().contains_point(p)
            && ring_contains_point(&self.exterior, p)
            && !self.holes.iter().any(|h| ring_contains_point(h, p))
    }

    /// Rotate by `yaw` around the origin, then translate
    pub fn transformed(&self, yaw: f64, dx: f64, dy: f64) -> Polygon {
        let map = |ring: &Vec<Point>| -> Vec<Point> {
            ring.iter()
                .map(|p| p.rotated(yaw).translated(dx, dy))
                .collect()
        };
        Self {
            exterior: map(&self.exterior),
            holes: self.holes.iter().map(map).collect(),
        }
    }
}

fn validate_ring(points: Vec<Point>, label: &str) -> Result<Vec<Point>, GeometryError> {
    if points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(GeometryError::invalid(format!(
            "{} ring has non-finite coordinates",
            label
        )));
    }
    let ring = close_ring(points);
    if ring.len() < 4 {
        return Err(GeometryError::invalid(format!(
            "{} ring has fewer than 3 distinct points",
            label
        )));
    }
    if signed_ring_area(&ring).abs() <= AREA_EPSILON {
        return Err(GeometryError::invalid(format!("{} ring has zero area", label)));
    }
    if !ring_is_simple(&ring) {
        return Err(GeometryError::invalid(format!(
            "{} ring intersects itself",
            label
        )));
    }
    Ok(ring)
}

/// Zero or more disjoint polygons; the result type of boolean operations
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MultiPolygon(Vec<Polygon>);

impl MultiPolygon {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self(polygons)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.0
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No component or no area left
    pub fn is_empty(&self) -> bool {
        self.area() <= AREA_EPSILON
    }

    pub fn area(&self) -> f64 {
        self.0.iter().map(Polygon::area).sum()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.0
            .iter()
            .map(Polygon::bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Area-weighted centroid, `None` when empty
    pub fn centroid(&self) -> Option<Point> {
        let total = self.area();
        if total <= AREA_EPSILON {
            return self.0.first().map(Polygon::centroid);
        }
        let (sx, sy) = self.0.iter().fold((0.0, 0.0), |(sx, sy), poly| {
            let c = poly.centroid();
            let a = poly.area();
            (sx + c.x * a, sy + c.y * a)
        });
        Some(Point::new(sx / total, sy / total))
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.0.iter().any(|poly| poly.contains_point(p))
    }

    /// Largest component by area
    pub fn largest(&self) -> Option<&Polygon> {
        self.0
            .iter()
            .max_by(|a, b| a.area().total_cmp(&b.area()))
    }

    /// Every component with its holes filled
    pub fn without_holes(&self) -> MultiPolygon {
        Self(self.0.iter().map(Polygon::without_holes).collect())
    }

    pub fn transformed(&self, yaw: f64, dx: f64, dy: f64) -> MultiPolygon {
        Self(self.0.iter().map(|p| p.transformed(yaw, dx, dy)).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Polygon> {
        self.0.iter()
    }
}

impl From<Polygon> for MultiPolygon {
    fn from(polygon: Polygon) -> Self {
        Self(vec![polygon])
    }
}

impl FromIterator<Polygon> for MultiPolygon {
    fn from_iter<I: IntoIterator<Item = Polygon>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Polygon {
        Polygon::rectangle(0.0, 0.0, size, size).unwrap()
    }

    #[test]
    fn test_rectangle_is_closed_and_ccw() {
        let poly = square(2.0);
        assert_eq!(poly.exterior().len(), 5);
        assert_eq!(poly.exterior().first(), poly.exterior().last());
        assert!(signed_ring_area(poly.exterior()) > 0.0);
    }

    #[test]
    fn test_clockwise_input_is_reoriented() {
        let poly = Polygon::from_points([
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ])
        .unwrap();
        assert!(signed_ring_area(poly.exterior()) > 0.0);
        assert!((poly.area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_self_intersecting_ring_rejected() {
        let bowtie = Polygon::from_points([
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        ]);
        assert!(matches!(bowtie, Err(GeometryError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_degenerate_rings_rejected() {
        let line = Polygon::from_points([
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ]);
        assert!(line.is_err());
        let two = Polygon::from_points([Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert!(two.is_err());
        assert!(Polygon::rectangle(0.0, 0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_hole_area_and_containment() {
        let poly = Polygon::new(
            square(4.0).exterior().to_vec(),
            vec![vec![
                Point::new(1.0, 1.0),
                Point::new(3.0, 1.0),
                Point::new(3.0, 3.0),
                Point::new(1.0, 3.0),
            ]],
        )
        .unwrap();
        assert!((poly.area() - 12.0).abs() < 1e-12);
        assert!(poly.contains_point(Point::new(0.5, 0.5)));
        assert!(!poly.contains_point(Point::new(2.0, 2.0)));
        assert!(!poly.contains_point(Point::new(5.0, 2.0)));
        assert!((poly.without_holes().area() - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_hole_outside_exterior_rejected() {
        let result = Polygon::new(
            square(1.0).exterior().to_vec(),
            vec![vec![
                Point::new(5.0, 5.0),
                Point::new(6.0, 5.0),
                Point::new(6.0, 6.0),
            ]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_bounds_and_centroid() {
        let poly = Polygon::rectangle(-1.0, -2.0, 3.0, 4.0).unwrap();
        assert_eq!(poly.bounds().as_tuple(), (-1.0, -2.0, 3.0, 4.0));
        let c = poly.centroid();
        assert!((c.x - 1.0).abs() < 1e-12);
        assert!((c.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_rotates_then_translates() {
        let poly = Polygon::rectangle(0.0, 0.0, 2.0, 1.0).unwrap();
        let moved = poly.transformed(std::f64::consts::FRAC_PI_2, 10.0, 0.0);
        let b = moved.bounds();
        assert!((b.min_x - 9.0).abs() < 1e-9);
        assert!((b.max_x - 10.0).abs() < 1e-9);
        assert!((b.min_y - 0.0).abs() < 1e-9);
        assert!((b.max_y - 2.0).abs() < 1e-9);
        assert!((moved.area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_multipolygon_largest_and_empty() {
        let multi = MultiPolygon::new(vec![square(1.0), Polygon::rectangle(5.0, 5.0, 8.0, 8.0).unwrap()]);
        assert_eq!(multi.len(), 2);
        assert!((multi.largest().unwrap().area() - 9.0).abs() < 1e-12);
        assert!(MultiPolygon::empty().is_empty());
        assert!(MultiPolygon::empty().bounds().is_none());
        assert!(MultiPolygon::empty().centroid().is_none());
    }
}
