//! TOML scenario files
//!
//! A scenario declares the seed, an optional room request with its walls,
//! assets, constraints and engines. Everything is resolved into typed values
//! when the file is loaded; unknown variant names and unknown keys are
//! rejected there.
//!
//! ```toml
//! seed = 7
//! on_engine_failure = "continue"
//!
//! [rooms]
//! kind = "rectangle"
//! delta_x_min = 15.0
//! delta_x_max = 20.0
//!
//! [walls]
//! thickness = 0.2
//!
//! [[assets]]
//! tag = "box"
//! shape = "box"
//! size = [{ min = 0.1, max = 1.0 }, 0.5, 0.5]
//!
//! [[constraints]]
//! name = "floor"
//! type = "free_space"
//! ground_plane_models = ["walls"]
//!
//! [[engines]]
//! name = "scatter"
//! type = "random_pose"
//! models = ["box"]
//! max_num = { box = 4 }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::assets::{Asset, AssetError, Scalar, ShapeAsset, ShapeDescription};
use crate::constraints::{Constraint, ConstraintError};
use crate::generator::{FailurePolicy, Generator, GeneratorConfig, GeneratorError};
use crate::geometry::{GeometryError, Point, Polygon};
use crate::placement::{
    ConstraintBinding, Engine, ExhaustionPolicy, FixedPoseEngine, PickerKind, PlacementPolicy, RandomPoseConfig,
    RandomPoseEngine,
};
use crate::pose::Pose;
use crate::rooms::RoomRequest;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlScenario {
    #[serde(default)]
    seed: u64,
    #[serde(default)]
    on_engine_failure: FailurePolicy,
    rooms: Option<RoomRequest>,
    #[serde(default)]
    walls: TomlWalls,
    #[serde(default)]
    assets: Vec<TomlAsset>,
    #[serde(default)]
    constraints: Vec<TomlConstraint>,
    #[serde(default)]
    engines: Vec<TomlEngine>,
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct TomlWalls {
    enabled: bool,
    thickness: f64,
    height: f64,
}

impl Default for TomlWalls {
    fn default() -> Self {
        Self {
            enabled: true,
            thickness: 0.15,
            height: 2.0,
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case", deny_unknown_fields)]
enum TomlAsset {
    Box {
        tag: String,
        size: [Scalar; 3],
        #[serde(default)]
        is_static: bool,
    },
    Cylinder {
        tag: String,
        radius: Scalar,
        length: Scalar,
        #[serde(default)]
        is_static: bool,
    },
    Sphere {
        tag: String,
        radius: Scalar,
        #[serde(default)]
        is_static: bool,
    },
    Prism {
        tag: String,
        points: Vec<[f64; 2]>,
        height: Scalar,
        #[serde(default)]
        is_static: bool,
    },
}

impl TomlAsset {
    fn into_asset(self) -> Result<Asset, ScenarioError> {
        let (tag, description, is_static) = match self {
            TomlAsset::Box { tag, size, is_static } => (tag, ShapeDescription::Box { size }, is_static),
            TomlAsset::Cylinder {
                tag,
                radius,
                length,
                is_static,
            } => (tag, ShapeDescription::Cylinder { radius, length }, is_static),
            TomlAsset::Sphere { tag, radius, is_static } => (tag, ShapeDescription::Sphere { radius }, is_static),
            TomlAsset::Prism {
                tag,
                points,
                height,
                is_static,
            } => {
                let footprint = Polygon::from_points(points.into_iter().map(Point::from))?.into();
                (tag, ShapeDescription::Prism { footprint, height }, is_static)
            }
        };
        Ok(Asset::new(tag, ShapeAsset::new(description, is_static)?))
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
enum TomlConstraint {
    Workspace {
        name: String,
        points: Vec<[f64; 2]>,
    },
    FreeSpace {
        name: String,
        #[serde(default)]
        ground_plane_models: Vec<String>,
        #[serde(default)]
        ignore_models: Vec<String>,
    },
    Tangent {
        name: String,
        #[serde(default)]
        origin: [f64; 3],
        normal: [f64; 3],
    },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlAssignment {
    model: String,
    pose: [f64; 6],
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
enum TomlEngine {
    FixedPose {
        name: String,
        poses: Vec<TomlAssignment>,
    },
    RandomPose {
        name: String,
        models: Vec<String>,
        #[serde(default)]
        max_num: HashMap<String, usize>,
        #[serde(default)]
        policies: Vec<PlacementPolicy>,
        #[serde(default)]
        constraints: Vec<ConstraintBinding>,
        no_collision: Option<bool>,
        min_distance: Option<f64>,
        max_attempts: Option<usize>,
        max_point_attempts: Option<usize>,
        #[serde(default)]
        model_picker: PickerKind,
        #[serde(default)]
        on_exhausted: ExhaustionPolicy,
    },
}

impl TomlEngine {
    fn into_engine(self) -> Engine {
        match self {
            TomlEngine::FixedPose { name, poses } => Engine::FixedPose(
                poses
                    .into_iter()
                    .fold(FixedPoseEngine::new(name), |engine, a| {
                        engine.with_pose(a.model, Pose::from_array(a.pose))
                    }),
            ),
            TomlEngine::RandomPose {
                name,
                models,
                max_num,
                policies,
                constraints,
                no_collision,
                min_distance,
                max_attempts,
                max_point_attempts,
                model_picker,
                on_exhausted,
            } => {
                let defaults = RandomPoseConfig::default();
                let config = RandomPoseConfig {
                    models,
                    max_num,
                    policies,
                    constraints,
                    no_collision: no_collision.unwrap_or(defaults.no_collision),
                    min_distance: min_distance.unwrap_or(defaults.min_distance),
                    max_attempts: max_attempts.unwrap_or(defaults.max_attempts),
                    max_point_attempts: max_point_attempts.unwrap_or(defaults.max_point_attempts),
                    model_picker,
                    on_exhausted,
                };
                Engine::RandomPose(RandomPoseEngine::new(name, config))
            }
        }
    }
}

/// Room request plus the walls to build around it
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSetup {
    pub request: RoomRequest,
    pub walls: bool,
    pub wall_thickness: f64,
    pub wall_height: f64,
}

/// How a named constraint is obtained
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintSource {
    Fixed(Constraint),
    /// Free space of the world at the time the constraint is registered
    FreeSpace {
        ground_plane_models: Vec<String>,
        ignore_models: Vec<String>,
    },
}

/// A loaded scenario, ready to be turned into a [`Generator`]
#[derive(Debug)]
pub struct Scenario {
    pub seed: u64,
    pub on_engine_failure: FailurePolicy,
    pub rooms: Option<RoomSetup>,
    pub assets: Vec<Asset>,
    pub constraints: Vec<(String, ConstraintSource)>,
    pub engines: Vec<Engine>,
}

impl Scenario {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(source: &str) -> Result<Self, ScenarioError> {
        let toml: TomlScenario = toml::from_str(source)?;

        let walls = toml.walls;
        let rooms = toml.rooms.map(|request| RoomSetup {
            request,
            walls: walls.enabled,
            wall_thickness: walls.thickness,
            wall_height: walls.height,
        });

        let assets = toml
            .assets
            .into_iter()
            .map(TomlAsset::into_asset)
            .collect::<Result<Vec<_>, _>>()?;

        let mut constraints = Vec::with_capacity(toml.constraints.len());
        for constraint in toml.constraints {
            let entry = match constraint {
                TomlConstraint::Workspace { name, points } => {
                    let region = Polygon::from_points(points.into_iter().map(Point::from))?;
                    let constraint = Constraint::workspace(&name, region.into())?;
                    (name, ConstraintSource::Fixed(constraint))
                }
                TomlConstraint::FreeSpace {
                    name,
                    ground_plane_models,
                    ignore_models,
                } => (
                    name,
                    ConstraintSource::FreeSpace {
                        ground_plane_models,
                        ignore_models,
                    },
                ),
                TomlConstraint::Tangent { name, origin, normal } => {
                    (name, ConstraintSource::Fixed(Constraint::tangent(origin, normal)?))
                }
            };
            constraints.push(entry);
        }

        let engines = toml.engines.into_iter().map(TomlEngine::into_engine).collect();

        Ok(Self {
            seed: toml.seed,
            on_engine_failure: toml.on_engine_failure,
            rooms,
            assets,
            constraints,
            engines,
        })
    }

    /// Build the generator: rooms and walls first, then constraints in
    /// file order (free-space ones see the walls), assets and engines
    pub fn into_generator(self, seed: Option<u64>) -> Result<Generator, GeneratorError> {
        let seed = seed.unwrap_or(self.seed);
        let mut generator = Generator::new(
            GeneratorConfig::new()
                .with_seed(seed)
                .with_failure_policy(self.on_engine_failure),
        );

        if let Some(rooms) = &self.rooms {
            generator.synthesize_rooms(&rooms.request)?;
            if rooms.walls {
                generator.commit_walls(rooms.wall_thickness, rooms.wall_height)?;
            }
        }
        for asset in self.assets {
            generator.add_asset(asset)?;
        }
        for (name, source) in self.constraints {
            match source {
                ConstraintSource::Fixed(constraint) => generator.add_constraint(name, constraint)?,
                ConstraintSource::FreeSpace {
                    ground_plane_models,
                    ignore_models,
                } => {
                    let ground: Vec<&str> = ground_plane_models.iter().map(String::as_str).collect();
                    let ignore: Vec<&str> = ignore_models.iter().map(String::as_str).collect();
                    generator.add_free_space_workspace(&name, &ground, &ignore)?;
                }
            }
        }
        for engine in self.engines {
            generator.add_engine(engine)?;
        }
        Ok(generator)
    }
}
