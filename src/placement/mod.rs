//! Placement engines: fixed poses and collision-aware random poses
//!
//! Engines run against a shared [`EngineContext`]. They read the asset and
//! constraint registries, draw from the caller's stream and commit models to
//! the world as they are accepted.

mod fixed_pose;
mod picker;
mod policy;
mod random_pose;

pub use fixed_pose::FixedPoseEngine;
pub use picker::{ModelPicker, PickerKind, RandomPicker, RoundRobinPicker, SizePicker};
pub use policy::{ConstraintBinding, DofPolicy, PlacementPolicy, SamplingMode};
pub use random_pose::{ExhaustionPolicy, RandomPoseConfig, RandomPoseEngine};

use rand::RngCore;
use serde::Serialize;
use thiserror::Error;

use crate::assets::{AssetError, AssetRegistry};
use crate::constraints::ConstraintRegistry;
use crate::error::RegistryError;
use crate::world::World;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    /// A tag ran out of attempts before its count was met
    #[error(
        "engine '{engine}' exhausted {attempts} attempts for '{tag}': placed {placed} of {required}"
    )]
    SamplingExhausted {
        engine: String,
        tag: String,
        placed: usize,
        required: usize,
        attempts: usize,
        /// Counts for every tag of the engine at the point it stopped
        tags: Vec<TagReport>,
    },

    #[error("free space '{name}' is empty")]
    EmptyFreeSpace { name: String },

    #[error("engine '{engine}' is misconfigured: {reason}")]
    InvalidEngine { engine: String, reason: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

impl PlacementError {
    pub fn invalid(engine: &str, reason: impl Into<String>) -> Self {
        PlacementError::InvalidEngine {
            engine: engine.to_string(),
            reason: reason.into(),
        }
    }

    /// Recoverable at the orchestrator: the world is still consistent
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlacementError::SamplingExhausted { .. } | PlacementError::EmptyFreeSpace { .. }
        )
    }
}

/// What an engine run reads and mutates
pub struct EngineContext<'a> {
    pub assets: &'a AssetRegistry,
    pub constraints: &'a ConstraintRegistry,
    pub world: &'a mut World,
    pub rng: &'a mut dyn RngCore,
}

/// Outcome for one tag of an engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagReport {
    pub tag: String,
    pub placed: usize,
    pub required: usize,
    pub attempts: usize,
}

impl TagReport {
    pub fn is_complete(&self) -> bool {
        self.placed >= self.required
    }
}

/// Outcome of one engine run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineReport {
    pub engine: String,
    pub tags: Vec<TagReport>,
}

impl EngineReport {
    pub fn placed(&self) -> usize {
        self.tags.iter().map(|t| t.placed).sum()
    }

    /// Tags that ended below their required count
    pub fn shortfalls(&self) -> impl Iterator<Item = &TagReport> {
        self.tags.iter().filter(|t| !t.is_complete())
    }
}

/// A registered placement engine
#[derive(Debug)]
pub enum Engine {
    FixedPose(FixedPoseEngine),
    RandomPose(RandomPoseEngine),
}

impl Engine {
    pub fn name(&self) -> &str {
        match self {
            Engine::FixedPose(engine) => engine.name(),
            Engine::RandomPose(engine) => engine.name(),
        }
    }

    pub fn run(&self, ctx: &mut EngineContext<'_>) -> Result<EngineReport, PlacementError> {
        match self {
            Engine::FixedPose(engine) => engine.run(ctx),
            Engine::RandomPose(engine) => engine.run(ctx),
        }
    }
}

impl From<FixedPoseEngine> for Engine {
    fn from(engine: FixedPoseEngine) -> Self {
        Engine::FixedPose(engine)
    }
}

impl From<RandomPoseEngine> for Engine {
    fn from(engine: RandomPoseEngine) -> Self {
        Engine::RandomPose(engine)
    }
}
