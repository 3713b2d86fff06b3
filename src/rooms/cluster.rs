//! Merged-rectangle clusters and triangulated free-form rooms

use rand::RngCore;
use serde::Deserialize;

use crate::geometry::{convex_hull, touches_or_intersects, union_all, Polygon};

use super::primitives::{random_points, rectangle, sample_center, RectangleSize};
use super::{Room, RoomError, RoomLayout};

/// Rectangles merged into one boundary; each new rectangle must touch or
/// overlap one already kept
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "ClusterFields")]
pub struct ClusterConfig {
    pub n_rect: usize,
    pub x_center: (f64, f64),
    pub y_center: (f64, f64),
    pub size: RectangleSize,
    pub max_attempts: usize,
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ClusterFields {
    n_rect: usize,
    x_center: (f64, f64),
    y_center: (f64, f64),
    delta_x_min: f64,
    delta_x_max: f64,
    delta_y_min: f64,
    delta_y_max: f64,
    max_attempts: usize,
}

impl Default for ClusterFields {
    fn default() -> Self {
        let config = ClusterConfig::default();
        Self {
            n_rect: config.n_rect,
            x_center: config.x_center,
            y_center: config.y_center,
            delta_x_min: config.size.delta_x_min,
            delta_x_max: config.size.delta_x_max,
            delta_y_min: config.size.delta_y_min,
            delta_y_max: config.size.delta_y_max,
            max_attempts: config.max_attempts,
        }
    }
}

impl From<ClusterFields> for ClusterConfig {
    fn from(fields: ClusterFields) -> Self {
        Self {
            n_rect: fields.n_rect,
            x_center: fields.x_center,
            y_center: fields.y_center,
            size: RectangleSize::new(
                (fields.delta_x_min, fields.delta_x_max),
                (fields.delta_y_min, fields.delta_y_max),
            ),
            max_attempts: fields.max_attempts,
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            n_rect: 5,
            x_center: (-10.0, 10.0),
            y_center: (-10.0, 10.0),
            size: RectangleSize::default(),
            max_attempts: 10_000,
        }
    }
}

impl ClusterConfig {
    pub fn with_rectangles(mut self, n_rect: usize) -> Self {
        self.n_rect = n_rect;
        self
    }

    pub fn with_size(mut self, size: RectangleSize) -> Self {
        self.size = size;
        self
    }
}

pub fn synthesize_cluster(config: &ClusterConfig, rng: &mut dyn RngCore) -> Result<RoomLayout, RoomError> {
    if config.n_rect < 2 {
        return Err(RoomError::invalid(format!(
            "a rectangle cluster needs at least 2 rectangles, got {}",
            config.n_rect
        )));
    }
    config.size.validate()?;

    let mut rectangles: Vec<Polygon> = Vec::with_capacity(config.n_rect);
    let mut attempts = 0;
    while rectangles.len() < config.n_rect {
        if attempts >= config.max_attempts {
            return Err(RoomError::AttemptsExhausted {
                room: format!("cluster rectangle {}", rectangles.len()),
                attempts,
            });
        }
        attempts += 1;

        let center = sample_center(rng, config.x_center, config.y_center)?;
        let (dx, dy) = config.size.sample(rng);
        let candidate = rectangle(center.x, center.y, dx, dy)?;
        if rectangles.is_empty() || rectangles.iter().any(|r| touches_or_intersects(r, &candidate)) {
            tracing::trace!(index = rectangles.len(), attempts, "cluster rectangle accepted");
            rectangles.push(candidate);
        }
    }

    let boundary = union_all(&rectangles);
    tracing::debug!(area = boundary.area(), attempts, "rectangle cluster synthesized");
    let rooms = rectangles
        .into_iter()
        .enumerate()
        .map(|(i, rect)| Room::new(format!("rect_{}", i), rect))
        .collect();
    Ok(RoomLayout::new(boundary, rooms))
}

/// Convex room spanned by random points (the union of their triangulation)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriangulationConfig {
    pub n_points: usize,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl Default for TriangulationConfig {
    fn default() -> Self {
        Self {
            n_points: 10,
            x_range: (-10.0, 10.0),
            y_range: (-10.0, 10.0),
        }
    }
}

pub fn synthesize_triangulated(
    config: &TriangulationConfig,
    rng: &mut dyn RngCore,
) -> Result<RoomLayout, RoomError> {
    if config.n_points < 3 {
        return Err(RoomError::invalid(format!(
            "triangulation needs at least 3 points, got {}",
            config.n_points
        )));
    }
    let points = random_points(config.n_points, config.x_range, config.y_range, rng)?;
    let hull = convex_hull(&points)?;
    tracing::debug!(area = hull.area(), points = points.len(), "triangulated room synthesized");
    Ok(RoomLayout::new(hull.clone().into(), vec![Room::new("room", hull)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::contains;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cluster_is_connected_union() {
        let config = ClusterConfig::default().with_rectangles(4);
        let mut rng = StdRng::seed_from_u64(5);
        let layout = synthesize_cluster(&config, &mut rng).unwrap();
        assert_eq!(layout.rooms.len(), 4);
        for room in &layout.rooms {
            assert!(contains(&layout.boundary, &room.rectangle));
        }
        let sum: f64 = layout.rooms.iter().map(|r| r.rectangle.area()).sum();
        assert!(layout.boundary.area() <= sum + 1e-6);
    }

    #[test]
    fn test_cluster_requires_two_rectangles() {
        let config = ClusterConfig::default().with_rectangles(1);
        let mut rng = StdRng::seed_from_u64(5);
        assert!(matches!(
            synthesize_cluster(&config, &mut rng),
            Err(RoomError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_cluster_attempt_ceiling() {
        let mut config = ClusterConfig::default().with_rectangles(3);
        config.x_center = (-1000.0, 1000.0);
        config.y_center = (-1000.0, 1000.0);
        config.size = RectangleSize::new((0.1, 0.2), (0.1, 0.2));
        config.max_attempts = 5;
        let mut rng = StdRng::seed_from_u64(9);
        assert!(matches!(
            synthesize_cluster(&config, &mut rng),
            Err(RoomError::AttemptsExhausted { attempts: 5, .. })
        ));
    }

    #[test]
    fn test_triangulated_room_contains_points_hull() {
        let mut rng = StdRng::seed_from_u64(2);
        let layout = synthesize_triangulated(&TriangulationConfig::default(), &mut rng).unwrap();
        assert_eq!(layout.boundary.len(), 1);
        let b = layout.boundary.bounds().unwrap();
        assert!(b.min_x >= -10.0 && b.max_x <= 10.0);
        assert!(layout.boundary.area() > 0.0);
    }

    #[test]
    fn test_triangulated_needs_three_points() {
        let config = TriangulationConfig {
            n_points: 2,
            ..TriangulationConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        assert!(synthesize_triangulated(&config, &mut rng).is_err());
    }
}
