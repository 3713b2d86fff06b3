//! Per-DOF sampling policies

use rand::RngCore;
use serde::Deserialize;

use crate::constraints::{sample_in_region, Constraint, ConstraintRegistry};
use crate::pose::{Dof, Pose};
use crate::rooms::uniform;

/// How the values of a DOF group are drawn
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SamplingMode {
    /// Independent draw per DOF in `[min, max)`
    Uniform { min: f64, max: f64 },
    /// One 2D point inside a named workspace constraint
    Workspace { workspace: String },
    /// Literal value for every DOF of the group
    Value { value: f64 },
    /// One pick per DOF from a list
    Choice { values: Vec<f64> },
}

/// A group of DOFs sharing a sampling mode
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "DofGroup")]
pub struct DofPolicy {
    pub dofs: Vec<Dof>,
    pub mode: SamplingMode,
}

/// TOML form of a [`DofPolicy`]: the dofs sit next to the mode's own keys
#[derive(Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case", deny_unknown_fields)]
enum DofGroup {
    Uniform { dofs: Vec<Dof>, min: f64, max: f64 },
    Workspace { dofs: Vec<Dof>, workspace: String },
    Value { dofs: Vec<Dof>, value: f64 },
    Choice { dofs: Vec<Dof>, values: Vec<f64> },
}

impl From<DofGroup> for DofPolicy {
    fn from(group: DofGroup) -> Self {
        match group {
            DofGroup::Uniform { dofs, min, max } => Self::new(dofs, SamplingMode::Uniform { min, max }),
            DofGroup::Workspace { dofs, workspace } => Self::new(dofs, SamplingMode::Workspace { workspace }),
            DofGroup::Value { dofs, value } => Self::new(dofs, SamplingMode::Value { value }),
            DofGroup::Choice { dofs, values } => Self::new(dofs, SamplingMode::Choice { values }),
        }
    }
}

impl DofPolicy {
    pub fn new(dofs: impl Into<Vec<Dof>>, mode: SamplingMode) -> Self {
        Self {
            dofs: dofs.into(),
            mode,
        }
    }

    pub fn uniform(dofs: impl Into<Vec<Dof>>, min: f64, max: f64) -> Self {
        Self::new(dofs, SamplingMode::Uniform { min, max })
    }

    pub fn workspace(name: impl Into<String>) -> Self {
        Self::new(
            vec![Dof::X, Dof::Y],
            SamplingMode::Workspace {
                workspace: name.into(),
            },
        )
    }

    pub fn value(dofs: impl Into<Vec<Dof>>, value: f64) -> Self {
        Self::new(dofs, SamplingMode::Value { value })
    }

    /// Reject malformed groups before any sampling happens
    pub fn validate(&self, constraints: &ConstraintRegistry) -> Result<(), String> {
        if self.dofs.is_empty() {
            return Err("policy group has no dofs".to_string());
        }
        match &self.mode {
            SamplingMode::Uniform { min, max } => {
                if !(min <= max) || !min.is_finite() || !max.is_finite() {
                    return Err(format!("uniform range [{}, {}] is invalid", min, max));
                }
            }
            SamplingMode::Workspace { workspace } => {
                if let Some(dof) = self.dofs.iter().find(|d| !matches!(d, Dof::X | Dof::Y)) {
                    return Err(format!("workspace '{}' can only drive x and y, not {}", workspace, dof.name()));
                }
                match constraints.get(workspace).map_err(|e| e.to_string())? {
                    Constraint::Workspace { region } if !region.is_empty() => {}
                    Constraint::Workspace { .. } => return Err(format!("workspace '{}' has no area", workspace)),
                    other => {
                        return Err(format!(
                            "constraint '{}' is a {} constraint, not a workspace",
                            workspace,
                            other.kind()
                        ))
                    }
                }
            }
            SamplingMode::Value { value } => {
                if !value.is_finite() {
                    return Err(format!("value {} is not finite", value));
                }
            }
            SamplingMode::Choice { values } => {
                if values.is_empty() {
                    return Err("choice needs at least one value".to_string());
                }
            }
        }
        Ok(())
    }

    /// Write this group's values into `pose`
    ///
    /// Returns `false` when a workspace point could not be drawn.
    pub fn sample(
        &self,
        pose: &mut Pose,
        constraints: &ConstraintRegistry,
        max_point_attempts: usize,
        rng: &mut dyn RngCore,
    ) -> bool {
        match &self.mode {
            SamplingMode::Uniform { min, max } => {
                for dof in &self.dofs {
                    pose.set(*dof, uniform(rng, *min, *max));
                }
            }
            SamplingMode::Workspace { workspace } => {
                let Some(region) = constraints.get(workspace).ok().and_then(Constraint::region) else {
                    return false;
                };
                let Some(point) = sample_in_region(region, rng, max_point_attempts) else {
                    return false;
                };
                for dof in &self.dofs {
                    match dof {
                        Dof::X => pose.x = point.x,
                        Dof::Y => pose.y = point.y,
                        _ => {}
                    }
                }
            }
            SamplingMode::Value { value } => {
                for dof in &self.dofs {
                    pose.set(*dof, *value);
                }
            }
            SamplingMode::Choice { values } => {
                for dof in &self.dofs {
                    let index = (uniform(rng, 0.0, values.len() as f64) as usize).min(values.len() - 1);
                    pose.set(*dof, values[index]);
                }
            }
        }
        true
    }
}

/// DOF groups applied to the named models of an engine
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementPolicy {
    /// Models this policy applies to; empty means every model of the engine
    #[serde(default)]
    pub models: Vec<String>,
    pub config: Vec<DofPolicy>,
}

impl PlacementPolicy {
    pub fn new(config: Vec<DofPolicy>) -> Self {
        Self {
            models: Vec::new(),
            config,
        }
    }

    pub fn for_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn applies_to(&self, tag: &str) -> bool {
        self.models.is_empty() || self.models.iter().any(|m| m == tag)
    }

    /// Candidate pose with every group drawn in declaration order; DOFs no
    /// group names stay zero
    pub fn sample_pose(
        &self,
        constraints: &ConstraintRegistry,
        max_point_attempts: usize,
        rng: &mut dyn RngCore,
    ) -> Option<Pose> {
        let mut pose = Pose::default();
        for group in &self.config {
            if !group.sample(&mut pose, constraints, max_point_attempts, rng) {
                return None;
            }
        }
        Some(pose)
    }
}

/// Binds a registered constraint to one model of an engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintBinding {
    pub model: String,
    pub constraint: String,
}

impl ConstraintBinding {
    pub fn new(model: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            constraint: constraint.into(),
        }
    }
}
