//! Multi-room floor plans: core rooms sharing walls plus satellite rooms
//! reached through doors

use rand::RngCore;
use serde::Deserialize;

use crate::geometry::{
    boundary_buffer, circle, contains, difference, distance, intersection, intersects, union_all,
    JoinStyle, MultiPolygon, Point, Polygon,
};

use super::primitives::{rectangle, sample_center, uniform};
use super::{DoorSide, Room, RoomError, RoomLayout, SatelliteRoom};

/// Distance kept between a door centre and the ends of its side
const DOOR_INSET: f64 = 0.5;

/// A room kind with its fixed floor size
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Archetype {
    pub name: String,
    pub size: (f64, f64),
}

impl Archetype {
    pub fn new(name: impl Into<String>, width: f64, depth: f64) -> Self {
        Self {
            name: name.into(),
            size: (width, depth),
        }
    }
}

/// Where on its side a satellite door is centred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorPlacement {
    /// Side midpoint
    Midpoint,
    /// Uniformly along the side, kept [`DOOR_INSET`] away from the corners
    #[default]
    AlongSide,
}

/// How a new core room has to overlap the core rooms placed before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreOverlapRule {
    /// Overlap at least one earlier room, and every overlapped room within the band
    #[default]
    Intersecting,
    /// Overlap every earlier room within the band
    Every,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MultiRoomConfig {
    /// Rooms in placement order; the first one sits at the origin
    pub archetypes: Vec<Archetype>,
    /// How many leading archetypes are core rooms
    pub core_rooms: usize,
    pub x_center: (f64, f64),
    pub y_center: (f64, f64),
    /// Open interval for the overlap area between core rooms
    pub core_overlap: (f64, f64),
    pub core_rule: CoreOverlapRule,
    /// Open interval for the overlap area between a satellite and its core room
    pub satellite_overlap: (f64, f64),
    /// Gap kept around satellite rooms
    pub clearance: f64,
    pub wall_half_thickness: f64,
    pub door_radius: f64,
    /// Radius kept free around a door
    pub door_clearance_radius: f64,
    pub door_placement: DoorPlacement,
    /// Attempt ceiling per room
    pub max_attempts: usize,
}

impl Default for MultiRoomConfig {
    fn default() -> Self {
        Self {
            archetypes: vec![
                Archetype::new("living_room", 10.0, 10.0),
                Archetype::new("kitchen", 4.0, 8.0),
                Archetype::new("hallway", 8.0, 2.0),
                Archetype::new("bedroom", 4.0, 6.0),
                Archetype::new("bathroom", 6.0, 3.0),
                Archetype::new("dining_room", 8.0, 4.0),
            ],
            core_rooms: 3,
            x_center: (-10.0, 10.0),
            y_center: (-10.0, 10.0),
            core_overlap: (1.0, 1.6),
            core_rule: CoreOverlapRule::default(),
            satellite_overlap: (0.01, 1.4),
            clearance: 0.5,
            wall_half_thickness: 0.15,
            door_radius: 0.5,
            door_clearance_radius: 1.0,
            door_placement: DoorPlacement::default(),
            max_attempts: 100_000,
        }
    }
}

impl MultiRoomConfig {
    pub fn with_archetypes(mut self, archetypes: Vec<Archetype>, core_rooms: usize) -> Self {
        self.archetypes = archetypes;
        self.core_rooms = core_rooms;
        self
    }

    pub fn with_core_rule(mut self, rule: CoreOverlapRule) -> Self {
        self.core_rule = rule;
        self
    }

    pub fn with_door_placement(mut self, placement: DoorPlacement) -> Self {
        self.door_placement = placement;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn validate(&self) -> Result<(), RoomError> {
        if self.core_rooms == 0 || self.core_rooms > self.archetypes.len() {
            return Err(RoomError::invalid(format!(
                "core_rooms must be in 1..={}, got {}",
                self.archetypes.len(),
                self.core_rooms
            )));
        }
        for archetype in &self.archetypes {
            if !(archetype.size.0 > 0.0) || !(archetype.size.1 > 0.0) {
                return Err(RoomError::invalid(format!(
                    "room '{}' must have a positive size",
                    archetype.name
                )));
            }
        }
        for (label, band) in [("core_overlap", self.core_overlap), ("satellite_overlap", self.satellite_overlap)] {
            if !(band.0 >= 0.0 && band.0 < band.1) {
                return Err(RoomError::invalid(format!(
                    "{} must satisfy 0 <= min < max, got ({}, {})",
                    label, band.0, band.1
                )));
            }
        }
        if !(self.door_radius > 0.0) || self.door_clearance_radius < self.door_radius {
            return Err(RoomError::invalid(format!(
                "need 0 < door_radius <= door_clearance_radius, got {} and {}",
                self.door_radius, self.door_clearance_radius
            )));
        }
        if !(self.wall_half_thickness > 0.0) || self.clearance < 0.0 {
            return Err(RoomError::invalid(
                "wall_half_thickness must be positive and clearance non-negative",
            ));
        }
        if self.door_placement == DoorPlacement::AlongSide {
            let sides_too_short = self.archetypes[self.core_rooms..]
                .iter()
                .find(|a| a.size.0 < 2.0 * DOOR_INSET || a.size.1 < 2.0 * DOOR_INSET);
            if let Some(archetype) = sides_too_short {
                return Err(RoomError::invalid(format!(
                    "room '{}' is too small for a door along its sides",
                    archetype.name
                )));
            }
        }
        Ok(())
    }
}

fn in_band(area: f64, band: (f64, f64)) -> bool {
    area > band.0 && area < band.1
}

/// Door side and centre for a rectangle; draws the side, then the offset
/// along it when placing along the side
fn sample_door(rect: &Polygon, placement: DoorPlacement, rng: &mut dyn RngCore) -> (DoorSide, Point) {
    let b = rect.bounds();
    let side = DoorSide::ALL[(uniform(rng, 0.0, 4.0) as usize).min(3)];
    let along = |lo: f64, hi: f64, rng: &mut dyn RngCore| match placement {
        DoorPlacement::Midpoint => (lo + hi) / 2.0,
        DoorPlacement::AlongSide => uniform(rng, lo + DOOR_INSET, hi - DOOR_INSET),
    };
    let center = match side {
        DoorSide::Left => Point::new(b.min_x, along(b.min_y, b.max_y, rng)),
        DoorSide::Right => Point::new(b.max_x, along(b.min_y, b.max_y, rng)),
        DoorSide::Bottom => Point::new(along(b.min_x, b.max_x, rng), b.min_y),
        DoorSide::Top => Point::new(along(b.min_x, b.max_x, rng), b.max_y),
    };
    (side, center)
}

fn place_core_rooms(
    config: &MultiRoomConfig,
    rng: &mut dyn RngCore,
) -> Result<(Vec<Room>, Vec<MultiPolygon>), RoomError> {
    let mut rooms: Vec<Room> = Vec::with_capacity(config.core_rooms);
    let mut shared_walls = Vec::new();

    let first = &config.archetypes[0];
    rooms.push(Room::new(first.name.clone(), rectangle(0.0, 0.0, first.size.0, first.size.1)?));

    for archetype in &config.archetypes[1..config.core_rooms] {
        let mut attempts = 0;
        loop {
            if attempts >= config.max_attempts {
                return Err(RoomError::AttemptsExhausted {
                    room: archetype.name.clone(),
                    attempts,
                });
            }
            attempts += 1;

            let center = sample_center(rng, config.x_center, config.y_center)?;
            let candidate = rectangle(center.x, center.y, archetype.size.0, archetype.size.1)?;

            let mut overlaps = Vec::new();
            let mut accepted = true;
            for room in &rooms {
                let overlap = intersection(&room.rectangle, &candidate);
                let hit = !overlap.is_empty();
                if hit && in_band(overlap.area(), config.core_overlap) {
                    overlaps.push(overlap);
                } else if hit || config.core_rule == CoreOverlapRule::Every {
                    accepted = false;
                    break;
                }
            }
            if accepted && !overlaps.is_empty() {
                tracing::debug!(room = %archetype.name, attempts, shared = overlaps.len(), "core room accepted");
                shared_walls.extend(overlaps);
                rooms.push(Room::new(archetype.name.clone(), candidate));
                break;
            }
            tracing::trace!(room = %archetype.name, attempts, "core room rejected");
        }
    }
    Ok((rooms, shared_walls))
}

/// Rejection reason for a satellite candidate, `None` when accepted
fn satellite_conflict(
    config: &MultiRoomConfig,
    candidate: &Polygon,
    door: &Polygon,
    door_clearance: &Polygon,
    core: &[Room],
    shared_walls: &[MultiPolygon],
    satellites: &[Room],
) -> Option<&'static str> {
    let too_close = satellites.iter().any(|s| {
        distance(&s.rectangle, candidate) < 2.0 * config.clearance
            || distance(&s.rectangle, door_clearance) < config.clearance
    });
    if too_close {
        return Some("too close to a satellite room");
    }
    if shared_walls
        .iter()
        .any(|w| intersects(w, candidate) || intersects(w, door_clearance))
    {
        return Some("crosses a shared wall");
    }

    let mut hits = core.iter().filter(|room| intersects(&room.rectangle, candidate));
    let (Some(host), None) = (hits.next(), hits.next()) else {
        return Some("must overlap exactly one core room");
    };
    if !in_band(intersection(&host.rectangle, candidate).area(), config.satellite_overlap) {
        return Some("overlap outside the band");
    }
    if !contains(&host.rectangle, door) {
        return Some("door does not open into the core room");
    }
    None
}

/// Place the core rooms, then each satellite with its door
///
/// Draw order per attempt: centre x, centre y; satellites then draw the
/// door side and, when placing along the side, the door offset.
pub fn synthesize_multi_room(config: &MultiRoomConfig, rng: &mut dyn RngCore) -> Result<RoomLayout, RoomError> {
    config.validate()?;
    let (core, shared_walls) = place_core_rooms(config, rng)?;

    let mut placed: Vec<Room> = Vec::new();
    let mut satellites = Vec::new();
    for archetype in &config.archetypes[config.core_rooms..] {
        let mut attempts = 0;
        loop {
            if attempts >= config.max_attempts {
                return Err(RoomError::AttemptsExhausted {
                    room: archetype.name.clone(),
                    attempts,
                });
            }
            attempts += 1;

            let center = sample_center(rng, config.x_center, config.y_center)?;
            let candidate = rectangle(center.x, center.y, archetype.size.0, archetype.size.1)?;
            let (side, door_center) = sample_door(&candidate, config.door_placement, rng);
            let door = circle(door_center, config.door_radius)?;
            let door_clearance = circle(door_center, config.door_clearance_radius)?;

            let conflict =
                satellite_conflict(config, &candidate, &door, &door_clearance, &core, &shared_walls, &placed);
            if let Some(reason) = conflict {
                tracing::trace!(room = %archetype.name, attempts, reason, "satellite rejected");
                continue;
            }

            tracing::debug!(room = %archetype.name, attempts, side = side.index(), "satellite room accepted");
            let band = boundary_buffer(&candidate, config.wall_half_thickness, JoinStyle::Round);
            satellites.push(SatelliteRoom {
                name: archetype.name.clone(),
                walls: difference(&band, &door),
                door,
                side,
                center,
            });
            placed.push(Room::new(archetype.name.clone(), candidate));
            break;
        }
    }

    let rooms: Vec<Room> = core.into_iter().chain(placed).collect();
    let boundary = union_all(rooms.iter().map(|r| &r.rectangle));
    tracing::info!(rooms = rooms.len(), area = boundary.area(), "multi-room layout synthesized");
    Ok(RoomLayout {
        boundary,
        rooms,
        shared_walls,
        satellites,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_config() -> MultiRoomConfig {
        MultiRoomConfig::default().with_archetypes(
            vec![
                Archetype::new("living_room", 10.0, 10.0),
                Archetype::new("kitchen", 4.0, 8.0),
                Archetype::new("bedroom", 4.0, 6.0),
            ],
            2,
        )
    }

    #[test]
    fn test_core_rooms_share_walls_within_band() {
        let mut rng = StdRng::seed_from_u64(21);
        let layout = synthesize_multi_room(&small_config(), &mut rng).unwrap();
        assert_eq!(layout.rooms.len(), 3);
        assert_eq!(layout.shared_walls.len(), 1);
        let shared = layout.shared_walls[0].area();
        assert!(shared > 1.0 && shared < 1.6);
        assert_eq!(layout.rooms[0].rectangle.bounds().as_tuple(), (-5.0, -5.0, 5.0, 5.0));
    }

    #[test]
    fn test_satellite_door_opens_into_one_core_room() {
        let mut rng = StdRng::seed_from_u64(4);
        let layout = synthesize_multi_room(&small_config(), &mut rng).unwrap();
        let satellite = &layout.satellites[0];
        let rect = &layout.rooms[2].rectangle;
        let hosts: Vec<&Room> = layout.rooms[..2]
            .iter()
            .filter(|r| intersects(&r.rectangle, rect))
            .collect();
        assert_eq!(hosts.len(), 1);
        assert!(contains(&hosts[0].rectangle, &satellite.door));
        let overlap = intersection(&hosts[0].rectangle, rect).area();
        assert!(overlap > 0.01 && overlap < 1.4);
    }

    #[test]
    fn test_walls_plus_door_rebuild_the_band() {
        let mut rng = StdRng::seed_from_u64(8);
        let layout = synthesize_multi_room(&small_config(), &mut rng).unwrap();
        let satellite = &layout.satellites[0];
        let band = boundary_buffer(&layout.rooms[2].rectangle, 0.15, JoinStyle::Round);
        let rebuilt = crate::geometry::union(&satellite.walls, &satellite.door);
        assert!(contains(&rebuilt, &band));
        let gap = difference(&band, &satellite.walls);
        assert!(gap.area() > 0.0);
        assert!(contains(&satellite.door, &gap));
    }

    #[test]
    fn test_strict_core_rule_with_two_cores() {
        let config = small_config().with_core_rule(CoreOverlapRule::Every);
        let mut rng = StdRng::seed_from_u64(13);
        let layout = synthesize_multi_room(&config, &mut rng).unwrap();
        assert_eq!(layout.shared_walls.len(), 1);
    }

    #[test]
    fn test_attempt_ceiling_reports_room() {
        let config = small_config().with_max_attempts(1);
        let mut rng = StdRng::seed_from_u64(0);
        match synthesize_multi_room(&config, &mut rng) {
            Err(RoomError::AttemptsExhausted { room, attempts }) => {
                assert_eq!(attempts, 1);
                assert!(room == "kitchen" || room == "bedroom");
            }
            other => panic!("expected AttemptsExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_core_count() {
        let config = small_config().with_archetypes(vec![Archetype::new("only", 2.0, 2.0)], 2);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            synthesize_multi_room(&config, &mut rng),
            Err(RoomError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_midpoint_door_sits_on_side_middle() {
        let rect = rectangle(0.0, 0.0, 4.0, 6.0).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..20 {
            let (side, center) = sample_door(&rect, DoorPlacement::Midpoint, &mut rng);
            let expected = match side {
                DoorSide::Left => Point::new(-2.0, 0.0),
                DoorSide::Right => Point::new(2.0, 0.0),
                DoorSide::Bottom => Point::new(0.0, -3.0),
                DoorSide::Top => Point::new(0.0, 3.0),
            };
            assert_eq!(center, expected);
        }
    }
}
