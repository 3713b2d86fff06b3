//! End-to-end placement through the generator

use std::f64::consts::PI;

use pretty_assertions::assert_eq;
use scenegen::assets::{Asset, ShapeAsset, ShapeDescription};
use scenegen::constraints::Constraint;
use scenegen::generator::{Generator, GeneratorConfig};
use scenegen::geometry::{intersects, Polygon};
use scenegen::placement::{DofPolicy, PlacementPolicy, RandomPoseConfig, RandomPoseEngine};
use scenegen::pose::{Dof, Pose};

fn square_room(seed: u64) -> Generator {
    let mut generator = Generator::new(GeneratorConfig::new().with_seed(seed));
    let square = Polygon::rectangle(-10.0, -10.0, 10.0, 10.0).unwrap();
    generator.world_mut().set_boundary(square.clone().into());

    generator
        .add_asset(Asset::new(
            "box",
            ShapeAsset::new(ShapeDescription::cuboid(1.0, 1.0, 1.0), false).unwrap(),
        ))
        .unwrap();
    generator
        .add_asset(Asset::new(
            "cylinder",
            ShapeAsset::new(ShapeDescription::cylinder(0.5, 1.0), false).unwrap(),
        ))
        .unwrap();
    generator
        .add_constraint("room", Constraint::workspace("room", square.into()).unwrap())
        .unwrap();
    generator.add_constraint("ground", Constraint::ground()).unwrap();

    generator
        .add_engine(RandomPoseEngine::new(
            "scatter",
            RandomPoseConfig::new(&["box", "cylinder"])
                .with_max_num("box", 3)
                .with_max_num("cylinder", 3)
                .with_constraint("box", "ground")
                .with_constraint("cylinder", "ground")
                .with_policy(PlacementPolicy::new(vec![
                    DofPolicy::workspace("room"),
                    DofPolicy::uniform(vec![Dof::Yaw], -PI, PI),
                ])),
        ))
        .unwrap();
    generator
}

fn poses(generator: &Generator) -> Vec<(String, Pose)> {
    generator
        .world()
        .iter()
        .map(|m| (m.name().to_string(), *m.pose()))
        .collect()
}

#[test]
fn square_room_gets_every_instance_without_overlap() {
    let mut generator = square_room(42);
    let report = generator.run_engines().unwrap();

    assert!(report.is_complete());
    assert_eq!(generator.world().count("box"), 3);
    assert_eq!(generator.world().count("cylinder"), 3);

    let models = generator.world().models();
    for (i, a) in models.iter().enumerate() {
        let pose = a.pose();
        assert!((-10.0..=10.0).contains(&pose.x), "{} x = {}", a.name(), pose.x);
        assert!((-10.0..=10.0).contains(&pose.y), "{} y = {}", a.name(), pose.y);
        assert!((-PI..=PI).contains(&pose.yaw));
        assert!((pose.z - 0.5).abs() < 1e-6, "{} rests on the ground", a.name());
        for b in &models[i + 1..] {
            assert!(!intersects(a.footprint(), b.footprint()), "{} overlaps {}", a.name(), b.name());
        }
    }
}

#[test]
fn same_seed_same_world() {
    let mut first = square_room(7);
    first.run_engines().unwrap();
    let mut second = square_room(7);
    second.run_engines().unwrap();
    assert_eq!(poses(&first), poses(&second));
}

#[test]
fn different_seeds_differ() {
    let mut first = square_room(1);
    first.run_engines().unwrap();
    let mut second = square_room(2);
    second.run_engines().unwrap();
    assert_ne!(poses(&first), poses(&second));
}

#[test]
fn free_space_is_stable_between_calls() {
    let mut generator = square_room(3);
    generator.run_engines().unwrap();
    let once = generator.free_space_polygon(&[], &[]);
    let twice = generator.free_space_polygon(&[], &[]);
    assert_eq!(once, twice);

    let occupied: f64 = generator.world().iter().map(|m| m.footprint().area()).sum();
    assert!(once.area() < 400.0);
    assert!(once.area() > 400.0 - occupied - 1e-3);
}

#[test]
fn ignored_models_stay_in_free_space() {
    let mut generator = square_room(3);
    generator.run_engines().unwrap();
    let without_boxes = generator.free_space_polygon(&[], &["box"]);
    let full = generator.free_space_polygon(&[], &[]);
    assert!(without_boxes.area() > full.area());
}
