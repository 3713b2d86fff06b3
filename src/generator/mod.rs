//! Layout orchestrator: registries, the world and the shared random stream
//!
//! One seeded [`StdRng`] is owned here and lent to room synthesis and to
//! every engine in registration order, so a seed and a configuration fully
//! determine the resulting world.

mod report;

pub use report::{EngineFailure, RunReport};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use thiserror::Error;

use crate::assets::{Asset, AssetError, AssetRegistry, Body, Shape};
use crate::constraints::{Constraint, ConstraintError, ConstraintRegistry};
use crate::error::{RegistryError, RegistryKind};
use crate::geometry::MultiPolygon;
use crate::placement::{Engine, EngineContext, PlacementError};
use crate::pose::Pose;
use crate::rooms::{RoomError, RoomLayout, RoomRequest};
use crate::world::{World, WorldError};

/// Tag of the outer wall model committed by [`Generator::commit_walls`]
pub const WALLS_TAG: &str = "walls";

/// Tag of the per-room wall models with a door gap
pub const DOOR_WALLS_TAG: &str = "door_walls";

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error("free space '{name}' is empty")]
    EmptyFreeSpace { name: String },

    #[error("no rooms have been synthesized")]
    NoRooms,
}

impl From<WorldError> for GeneratorError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::EmptyFreeSpace { name } => GeneratorError::EmptyFreeSpace { name },
            WorldError::Registry(err) => GeneratorError::Registry(err),
        }
    }
}

/// What [`Generator::run_engines`] does after an engine stops on a
/// recoverable error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Skip the remaining engines
    #[default]
    Stop,
    /// Run the remaining engines against the partial world
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub on_engine_failure: FailurePolicy,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_engine_failure = policy;
        self
    }
}

#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    assets: AssetRegistry,
    constraints: ConstraintRegistry,
    engines: Vec<Engine>,
    world: World,
    rooms: Option<RoomLayout>,
    rng: StdRng,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            assets: AssetRegistry::new(),
            constraints: ConstraintRegistry::new(),
            engines: Vec::new(),
            world: World::new(),
            rooms: None,
            rng,
        }
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    /// Reseed the stream and empty the world; registries are kept
    pub fn reset(&mut self) {
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.world.clear();
        self.rooms = None;
        tracing::debug!(seed = self.config.seed, "generator reset");
    }

    pub fn add_asset(&mut self, asset: Asset) -> Result<(), GeneratorError> {
        Ok(self.assets.add(asset)?)
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, constraint: Constraint) -> Result<(), GeneratorError> {
        Ok(self.constraints.add(name, constraint)?)
    }

    /// Register an engine; engines run in registration order
    pub fn add_engine(&mut self, engine: impl Into<Engine>) -> Result<(), GeneratorError> {
        let engine = engine.into();
        if self.engines.iter().any(|e| e.name() == engine.name()) {
            return Err(RegistryError::duplicate(RegistryKind::Engine, engine.name()).into());
        }
        self.engines.push(engine);
        Ok(())
    }

    pub fn engine(&self, name: &str) -> Result<&Engine, GeneratorError> {
        self.engines.iter().find(|e| e.name() == name).ok_or_else(|| {
            RegistryError::not_found(RegistryKind::Engine, name, self.engines.iter().map(Engine::name)).into()
        })
    }

    pub fn engine_names(&self) -> Vec<&str> {
        self.engines.iter().map(Engine::name).collect()
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn constraints(&self) -> &ConstraintRegistry {
        &self.constraints
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn rooms(&self) -> Option<&RoomLayout> {
        self.rooms.as_ref()
    }

    /// Run a room synthesizer on the shared stream and adopt its boundary
    pub fn synthesize_rooms(&mut self, request: &RoomRequest) -> Result<&RoomLayout, GeneratorError> {
        let layout = request.synthesize(&mut self.rng)?;
        tracing::info!(
            kind = request.name(),
            rooms = layout.rooms.len(),
            area = layout.boundary.area(),
            "rooms synthesized"
        );
        self.world.set_boundary(layout.boundary.clone());
        Ok(self.rooms.insert(layout))
    }

    /// Commit the outer walls and every satellite's door walls as static
    /// prisms standing on z = 0
    pub fn commit_walls(&mut self, thickness: f64, height: f64) -> Result<(), GeneratorError> {
        let layout = self.rooms.as_ref().ok_or(GeneratorError::NoRooms)?;
        let pose = Pose::new(0.0, 0.0, height / 2.0, 0.0, 0.0, 0.0);

        let outer = Body::new(
            Shape::Prism {
                footprint: layout.boundary_walls(thickness),
                height,
            },
            true,
        )?;
        self.world
            .add_named_model(WALLS_TAG, WALLS_TAG, std::sync::Arc::new(outer), pose)?;

        for satellite in &layout.satellites {
            let walls = Body::new(
                Shape::Prism {
                    footprint: satellite.walls.clone(),
                    height,
                },
                true,
            )?;
            let name = format!("{}_walls", satellite.name);
            self.world
                .add_named_model(&name, DOOR_WALLS_TAG, std::sync::Arc::new(walls), pose)?;
        }
        tracing::debug!(satellites = layout.satellites.len(), thickness, height, "walls committed");
        Ok(())
    }

    /// Free space of the current world, recomputed on every call
    pub fn free_space_polygon(&self, ground_plane_models: &[&str], ignore_models: &[&str]) -> MultiPolygon {
        self.world.free_space(ground_plane_models, ignore_models)
    }

    /// Register the current free space as a workspace constraint
    pub fn add_free_space_workspace(
        &mut self,
        name: &str,
        ground_plane_models: &[&str],
        ignore_models: &[&str],
    ) -> Result<(), GeneratorError> {
        let region = self
            .world
            .free_space_checked(name, ground_plane_models, ignore_models)?;
        self.add_constraint(name, Constraint::workspace(name, region)?)
    }

    /// Run every engine in registration order against the shared world
    ///
    /// A recoverable engine error (`SamplingExhausted`, `EmptyFreeSpace`) is
    /// recorded in the report and handled per [`FailurePolicy`]; any other
    /// error aborts the run. Committed models stay in the world either way.
    pub fn run_engines(&mut self) -> Result<RunReport, GeneratorError> {
        let mut report = RunReport::default();
        for engine in &self.engines {
            tracing::info!(engine = engine.name(), "running engine");
            let mut ctx = EngineContext {
                assets: &self.assets,
                constraints: &self.constraints,
                world: &mut self.world,
                rng: &mut self.rng,
            };
            let engine_report = match engine.run(&mut ctx) {
                Ok(engine_report) => engine_report,
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(engine = engine.name(), error = %err, "engine failed");
                    report.failures.push(EngineFailure::new(engine.name(), &err));
                    match self.config.on_engine_failure {
                        FailurePolicy::Stop => break,
                        FailurePolicy::Continue => continue,
                    }
                }
                Err(err) => return Err(err.into()),
            };
            for shortfall in engine_report.shortfalls() {
                tracing::warn!(
                    engine = engine.name(),
                    tag = %shortfall.tag,
                    placed = shortfall.placed,
                    required = shortfall.required,
                    "engine under-placed"
                );
            }
            report.engines.push(engine_report);
        }
        Ok(report)
    }
}
