//! Convex hull (Andrew's monotone chain)

use super::error::GeometryError;
use super::types::{orientation, Point, Polygon};

/// Convex hull of a point set as a polygon
///
/// Fails when fewer than three non-collinear points are given.
pub fn convex_hull(points: &[Point]) -> Result<Polygon, GeometryError> {
    let mut sorted: Vec<Point> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup_by(|a, b| a.approx_eq(*b));

    if sorted.len() < 3 {
        return Err(GeometryError::invalid(format!(
            "convex hull needs at least 3 distinct points, got {}",
            sorted.len()
        )));
    }

    let mut lower: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in &sorted {
        while lower.len() >= 2 && orientation(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }

    let mut upper: Vec<Point> = Vec::with_capacity(sorted.len());
    for &p in sorted.iter().rev() {
        while upper.len() >= 2 && orientation(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);

    if lower.len() < 3 {
        return Err(GeometryError::invalid("convex hull points are collinear"));
    }
    Polygon::from_points(lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hull_drops_interior_points() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
            Point::new(0.0, 4.0),
            Point::new(2.0, 2.0),
            Point::new(1.0, 3.0),
        ];
        let hull = convex_hull(&points).unwrap();
        assert_eq!(hull.exterior().len(), 5);
        assert!((hull.area() - 16.0).abs() < 1e-12);
    }

    #[test]
    fn test_hull_collinear_fails() {
        let points = [Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
        assert!(convex_hull(&points).is_err());
        assert!(convex_hull(&points[..2]).is_err());
    }
}
