//! Room synthesizers driven through the public API

use rand::rngs::StdRng;
use rand::SeedableRng;
use scenegen::geometry::{contains, intersection, intersects, touches_or_intersects};
use scenegen::rooms::{
    random_rectangle, synthesize_cluster, synthesize_multi_room, ClusterConfig, MultiRoomConfig, RectangleConfig,
    RectangleSize, RoomError, RoomRequest,
};

#[test]
fn rectangle_sides_fall_in_range() {
    let config = RectangleConfig::new(RectangleSize::new((15.0, 20.0), (15.0, 20.0)));
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let bounds = random_rectangle(&config, &mut rng).unwrap().bounds();
        assert!((15.0..20.0).contains(&bounds.width()), "width {}", bounds.width());
        assert!((15.0..20.0).contains(&bounds.height()), "height {}", bounds.height());
    }
}

#[test]
fn cluster_rectangles_are_connected() {
    let config = ClusterConfig::default().with_rectangles(4);
    let mut rng = StdRng::seed_from_u64(12);
    let layout = synthesize_cluster(&config, &mut rng).unwrap();
    assert_eq!(layout.rooms.len(), 4);
    for room in &layout.rooms[1..] {
        let touching = layout
            .rooms
            .iter()
            .filter(|r| r.name != room.name)
            .any(|r| touches_or_intersects(&r.rectangle, &room.rectangle));
        assert!(touching, "{} is isolated", room.name);
    }
    let summed: f64 = layout.rooms.iter().map(|r| r.rectangle.area()).sum();
    assert!(layout.boundary.area() <= summed + 1e-6);
}

#[test]
fn default_multi_room_doors_open_into_one_core_room() {
    let config = MultiRoomConfig::default();
    let mut built = 0;
    for seed in 0..6 {
        let mut rng = StdRng::seed_from_u64(seed);
        let layout = match synthesize_multi_room(&config, &mut rng) {
            Ok(layout) => layout,
            Err(RoomError::AttemptsExhausted { .. }) => continue,
            Err(e) => panic!("unexpected error: {}", e),
        };
        built += 1;

        let core = &layout.rooms[..config.core_rooms];
        for satellite in &layout.satellites {
            let room = layout
                .rooms
                .iter()
                .find(|r| r.name == satellite.name)
                .unwrap();
            let hosts: Vec<_> = core.iter().filter(|c| intersects(&c.rectangle, &room.rectangle)).collect();
            assert_eq!(hosts.len(), 1, "{} touches one core room", satellite.name);
            assert!(contains(&hosts[0].rectangle, &satellite.door));
            let overlap = intersection(&hosts[0].rectangle, &room.rectangle).area();
            assert!(overlap > 0.01 && overlap < 1.4, "{} overlap {}", satellite.name, overlap);
        }
        for shared in &layout.shared_walls {
            assert!(shared.area() > 1.0 && shared.area() < 1.6);
        }
    }
    assert!(built > 0, "no seed produced a layout");
}

#[test]
fn request_from_toml() {
    let request: RoomRequest = toml::from_str(
        r#"
        kind = "rectangle"
        delta_x_min = 3.0
        delta_x_max = 4.0
        delta_y_min = 3.0
        delta_y_max = 4.0
        "#,
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let layout = request.synthesize(&mut rng).unwrap();
    assert_eq!(layout.rooms.len(), 1);
    assert!(layout.satellites.is_empty());
    let area = layout.boundary.area();
    assert!((9.0..16.0).contains(&area));
}
