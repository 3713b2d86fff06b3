//! Room synthesis by rejection sampling
//!
//! Every synthesizer draws from the caller's stream and returns a
//! [`RoomLayout`]. Each rejection loop has an attempt ceiling and reports
//! [`RoomError::AttemptsExhausted`] instead of spinning forever.

mod cluster;
mod multi_room;
mod primitives;

pub use cluster::{synthesize_cluster, synthesize_triangulated, ClusterConfig, TriangulationConfig};
pub use multi_room::{synthesize_multi_room, Archetype, DoorPlacement, MultiRoomConfig};
pub use primitives::{random_points, random_rectangle, rectangle, RectangleConfig, RectangleSize};

pub(crate) use primitives::uniform;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{boundary_buffer, union_all, GeometryError, JoinStyle, MultiPolygon, Point, Polygon};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoomError {
    #[error("could not place {room} after {attempts} attempts")]
    AttemptsExhausted { room: String, attempts: usize },

    #[error("invalid room configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl RoomError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        RoomError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Side of a room rectangle a door sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorSide {
    Left,
    Right,
    Bottom,
    Top,
}

impl DoorSide {
    pub const ALL: [DoorSide; 4] = [DoorSide::Left, DoorSide::Right, DoorSide::Bottom, DoorSide::Top];

    /// 0 = left (x min), 1 = right (x max), 2 = bottom (y min), 3 = top (y max)
    pub fn index(&self) -> usize {
        match self {
            DoorSide::Left => 0,
            DoorSide::Right => 1,
            DoorSide::Bottom => 2,
            DoorSide::Top => 3,
        }
    }
}

/// One room rectangle of a layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub name: String,
    pub rectangle: Polygon,
    pub center: Point,
}

impl Room {
    pub fn new(name: impl Into<String>, rectangle: Polygon) -> Self {
        let center = rectangle.centroid();
        Self {
            name: name.into(),
            rectangle,
            center,
        }
    }
}

/// A room reached through a door, with its own wall ring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SatelliteRoom {
    pub name: String,
    /// Wall band around the rectangle with the door circle cut out
    pub walls: MultiPolygon,
    pub door: Polygon,
    pub side: DoorSide,
    pub center: Point,
}

/// Output of a room synthesis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomLayout {
    /// Union of every room rectangle
    pub boundary: MultiPolygon,
    pub rooms: Vec<Room>,
    /// Overlaps between core rooms
    pub shared_walls: Vec<MultiPolygon>,
    pub satellites: Vec<SatelliteRoom>,
}

impl RoomLayout {
    pub fn new(boundary: MultiPolygon, rooms: Vec<Room>) -> Self {
        Self {
            boundary,
            rooms,
            shared_walls: Vec::new(),
            satellites: Vec::new(),
        }
    }

    /// Outer wall band of the given thickness, centred on the boundary
    pub fn boundary_walls(&self, thickness: f64) -> MultiPolygon {
        let bands: Vec<MultiPolygon> = self
            .boundary
            .iter()
            .map(|polygon| boundary_buffer(polygon, thickness / 2.0, JoinStyle::Mitre { limit: 2.0 }))
            .collect();
        union_all(&bands)
    }
}

/// Which synthesizer to run, with its parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoomRequest {
    Rectangle(RectangleConfig),
    Cluster(ClusterConfig),
    Triangulated(TriangulationConfig),
    MultiRoom(MultiRoomConfig),
}

impl RoomRequest {
    pub fn name(&self) -> &'static str {
        match self {
            RoomRequest::Rectangle(_) => "rectangle",
            RoomRequest::Cluster(_) => "cluster",
            RoomRequest::Triangulated(_) => "triangulated",
            RoomRequest::MultiRoom(_) => "multi_room",
        }
    }

    pub fn synthesize(&self, rng: &mut dyn RngCore) -> Result<RoomLayout, RoomError> {
        tracing::debug!(kind = self.name(), "synthesizing rooms");
        match self {
            RoomRequest::Rectangle(config) => {
                let rect = random_rectangle(config, rng)?;
                Ok(RoomLayout::new(rect.clone().into(), vec![Room::new("room", rect)]))
            }
            RoomRequest::Cluster(config) => synthesize_cluster(config, rng),
            RoomRequest::Triangulated(config) => synthesize_triangulated(config, rng),
            RoomRequest::MultiRoom(config) => synthesize_multi_room(config, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rectangle_request() {
        let request = RoomRequest::Rectangle(RectangleConfig::new(RectangleSize::new((15.0, 20.0), (15.0, 20.0))));
        let mut rng = StdRng::seed_from_u64(1);
        let layout = request.synthesize(&mut rng).unwrap();
        assert_eq!(layout.rooms.len(), 1);
        let width = layout.boundary.bounds().unwrap().width();
        assert!((15.0..20.0).contains(&width));
        assert!(layout.satellites.is_empty());
    }

    #[test]
    fn test_boundary_walls_band() {
        let layout = RoomLayout::new(
            Polygon::rectangle(-5.0, -5.0, 5.0, 5.0).unwrap().into(),
            Vec::new(),
        );
        let walls = layout.boundary_walls(0.2);
        // 10.2^2 - 9.8^2
        assert!((walls.area() - 8.0).abs() < 1e-4);
    }

    #[test]
    fn test_request_from_toml() {
        let request: RoomRequest = toml::from_str(
            r#"
            kind = "cluster"
            n_rect = 3
            delta_x_max = 6.0
            "#,
        )
        .unwrap();
        match request {
            RoomRequest::Cluster(config) => {
                assert_eq!(config.n_rect, 3);
                assert_eq!(config.size.delta_x_max, 6.0);
                assert_eq!(config.size.delta_y_max, 15.0);
            }
            other => panic!("expected cluster, got {:?}", other),
        }
    }

    #[test]
    fn test_request_rejects_unknown_keys() {
        for source in [
            "kind = \"rectangle\"\ndelta_x_mx = 6.0",
            "kind = \"cluster\"\nn_rects = 3",
            "kind = \"triangulated\"\nn_point = 4",
            "kind = \"multi_room\"\ncore_room = 2",
        ] {
            let err = toml::from_str::<RoomRequest>(source).unwrap_err();
            assert!(err.to_string().contains("unknown field"), "{}: {}", source, err);
        }
    }

    #[test]
    fn test_door_side_index() {
        let indices: Vec<usize> = DoorSide::ALL.iter().map(DoorSide::index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }
}
