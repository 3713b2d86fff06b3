//! scenegen - procedural room layout and constrained object placement
//!
//! Rooms are synthesized by rejection sampling. Their free space becomes a
//! workspace constraint, and placement engines fill it with posed model
//! instances that satisfy per-DOF sampling policies, tangency and
//! no-overlap rules. A single seeded stream drives every draw, so a seed and
//! a scenario reproduce the same world.
//!
//! # Example
//!
//! ```rust
//! use scenegen::generate;
//!
//! let output = generate(r#"
//!     seed = 1
//!
//!     [[assets]]
//!     tag = "box"
//!     shape = "box"
//!     size = [1.0, 1.0, 1.0]
//!
//!     [[constraints]]
//!     name = "area"
//!     type = "workspace"
//!     points = [[-5, -5], [5, -5], [5, 5], [-5, 5]]
//!
//!     [[engines]]
//!     name = "scatter"
//!     type = "random_pose"
//!     models = ["box"]
//!     max_num = { box = 3 }
//!
//!     [[engines.policies]]
//!     [[engines.policies.config]]
//!     dofs = ["x", "y"]
//!     mode = "workspace"
//!     workspace = "area"
//! "#, None).unwrap();
//!
//! assert_eq!(output.world.models.len(), 3);
//! ```

pub mod assets;
pub mod constraints;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod placement;
pub mod pose;
pub mod rooms;
pub mod scenario;
pub mod world;

pub use assets::{Asset, AssetFactory, AssetRegistry, ModelGeometry, ShapeAsset, ShapeDescription};
pub use constraints::{Constraint, ConstraintRegistry};
pub use error::{RegistryError, RegistryKind};
pub use generator::{EngineFailure, FailurePolicy, Generator, GeneratorConfig, GeneratorError, RunReport};
pub use geometry::{GeometryError, MultiPolygon, Point, Polygon};
pub use placement::{Engine, FixedPoseEngine, PlacementError, RandomPoseConfig, RandomPoseEngine};
pub use pose::{Dof, Pose};
pub use rooms::{RoomLayout, RoomRequest};
pub use scenario::{Scenario, ScenarioError};
pub use world::{World, WorldSummary};

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during the generation pipeline
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("generation error: {0}")]
    Generator(#[from] GeneratorError),
}

/// Everything a serializer needs from one generation run
#[derive(Debug, Clone, Serialize)]
pub struct SceneOutput {
    pub seed: u64,
    pub rooms: Option<RoomLayout>,
    pub world: WorldSummary,
    pub report: RunReport,
}

/// Load a scenario from TOML source, run it and summarize the world
///
/// `seed` overrides the scenario's own seed.
pub fn generate(source: &str, seed: Option<u64>) -> Result<SceneOutput, SceneError> {
    let scenario = Scenario::parse(source)?;
    run_scenario(scenario, seed)
}

/// Run a loaded scenario
///
/// An engine that stops on a recoverable error still yields an output; its
/// failure is listed in `report.failures`.
pub fn run_scenario(scenario: Scenario, seed: Option<u64>) -> Result<SceneOutput, SceneError> {
    let mut generator = scenario.into_generator(seed)?;
    let report = generator.run_engines()?;
    Ok(SceneOutput {
        seed: generator.seed(),
        rooms: generator.rooms().cloned(),
        world: generator.world().summary(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_empty_scenario() {
        let output = generate("seed = 4", None).unwrap();
        assert_eq!(output.seed, 4);
        assert!(output.world.models.is_empty());
        assert!(output.rooms.is_none());
    }

    #[test]
    fn test_seed_override() {
        let output = generate("seed = 4", Some(9)).unwrap();
        assert_eq!(output.seed, 9);
    }

    #[test]
    fn test_missing_asset_is_generator_error() {
        let err = generate(
            r#"
            [[engines]]
            name = "scatter"
            type = "random_pose"
            models = ["ghost"]
            "#,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SceneError::Generator(GeneratorError::Placement(_))));
    }

    const TWO_ENGINES: &str = r#"
        [[assets]]
        tag = "box"
        shape = "box"
        size = [1.0, 1.0, 1.0]

        [[constraints]]
        name = "area"
        type = "workspace"
        points = [[-5, -5], [5, -5], [5, 5], [-5, 5]]

        [[constraints]]
        name = "pocket"
        type = "workspace"
        points = [[0, 0], [0.02, 0], [0.02, 0.02], [0, 0.02]]

        [[engines]]
        name = "first"
        type = "random_pose"
        models = ["box"]
        max_num = { box = 2 }
        [[engines.policies]]
        [[engines.policies.config]]
        dofs = ["x", "y"]
        mode = "workspace"
        workspace = "area"

        [[engines]]
        name = "second"
        type = "random_pose"
        models = ["box"]
        max_num = { box = 3 }
        max_attempts = 50
        [[engines.policies]]
        [[engines.policies.config]]
        dofs = ["x", "y"]
        mode = "workspace"
        workspace = "pocket"
    "#;

    #[test]
    fn test_exhausted_engine_keeps_partial_output() {
        let output = generate(TWO_ENGINES, None).unwrap();
        assert!(!output.report.is_complete());
        assert_eq!(output.report.engines.len(), 1);
        assert_eq!(output.report.engines[0].engine, "first");
        assert_eq!(output.report.engines[0].placed(), 2);

        let failure = &output.report.failures[0];
        assert_eq!(failure.engine, "second");
        assert_eq!(failure.required, 3);
        assert_eq!(output.world.models.len(), 2 + failure.placed);
    }

    #[test]
    fn test_parse_error_is_scenario_error() {
        assert!(matches!(generate("seed = ", None), Err(SceneError::Scenario(_))));
    }
}
