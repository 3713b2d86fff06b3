//! Rejection-sampling placement engine

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::assets::ModelGeometry;
use crate::constraints::Constraint;
use crate::geometry::{buffer, intersects, JoinStyle, MultiPolygon};
use crate::world::footprint_at;

use super::{
    ConstraintBinding, EngineContext, EngineReport, PickerKind, PlacementError, PlacementPolicy, TagReport,
};

/// What to do when a tag runs out of attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Stop the engine with `SamplingExhausted`; models already placed stay
    #[default]
    Abort,
    /// Close the tag, keep placing the others and report the shortfall
    AcceptPartial,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RandomPoseConfig {
    /// Asset tags in the pool, in declaration order
    pub models: Vec<String>,
    /// Instance count per tag; tags left out get one instance
    pub max_num: HashMap<String, usize>,
    pub policies: Vec<PlacementPolicy>,
    pub constraints: Vec<ConstraintBinding>,
    pub no_collision: bool,
    /// Clearance kept around every existing footprint
    pub min_distance: f64,
    /// Attempt budget per tag
    pub max_attempts: usize,
    /// Tries for one workspace point before the attempt is rejected
    pub max_point_attempts: usize,
    pub model_picker: PickerKind,
    pub on_exhausted: ExhaustionPolicy,
}

impl Default for RandomPoseConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            max_num: HashMap::new(),
            policies: Vec::new(),
            constraints: Vec::new(),
            no_collision: true,
            min_distance: 0.0,
            max_attempts: 1000,
            max_point_attempts: 1000,
            model_picker: PickerKind::default(),
            on_exhausted: ExhaustionPolicy::default(),
        }
    }
}

impl RandomPoseConfig {
    pub fn new(models: &[&str]) -> Self {
        Self {
            models: models.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_max_num(mut self, tag: &str, count: usize) -> Self {
        self.max_num.insert(tag.to_string(), count);
        self
    }

    pub fn with_policy(mut self, policy: PlacementPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn with_constraint(mut self, model: &str, constraint: &str) -> Self {
        self.constraints.push(ConstraintBinding::new(model, constraint));
        self
    }

    pub fn with_no_collision(mut self, no_collision: bool) -> Self {
        self.no_collision = no_collision;
        self
    }

    pub fn with_min_distance(mut self, min_distance: f64) -> Self {
        self.min_distance = min_distance;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_picker(mut self, picker: PickerKind) -> Self {
        self.model_picker = picker;
        self
    }

    pub fn with_exhaustion(mut self, policy: ExhaustionPolicy) -> Self {
        self.on_exhausted = policy;
        self
    }

    pub fn required(&self, tag: &str) -> usize {
        self.max_num.get(tag).copied().unwrap_or(1)
    }

    /// Policy for a tag; the last one naming it wins
    pub fn policy_for(&self, tag: &str) -> Option<&PlacementPolicy> {
        self.policies.iter().rev().find(|p| p.applies_to(tag))
    }
}

/// Per-tag sampling state of one run
struct TagState {
    tag: String,
    required: usize,
    placed: usize,
    attempts: usize,
    /// Instantiated model awaiting an accepted pose
    pending: Option<Arc<dyn ModelGeometry>>,
    constraints: Vec<Constraint>,
}

impl TagState {
    fn report(&self) -> TagReport {
        TagReport {
            tag: self.tag.clone(),
            placed: self.placed,
            required: self.required,
            attempts: self.attempts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomPoseEngine {
    name: String,
    config: RandomPoseConfig,
}

impl RandomPoseEngine {
    pub fn new(name: impl Into<String>, config: RandomPoseConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RandomPoseConfig {
        &self.config
    }

    /// Check every reference and range without drawing anything
    pub fn validate(&self, ctx: &EngineContext<'_>) -> Result<(), PlacementError> {
        let config = &self.config;
        if config.models.is_empty() {
            return Err(PlacementError::invalid(&self.name, "no models in the pool"));
        }
        for (i, tag) in config.models.iter().enumerate() {
            ctx.assets.get(tag)?;
            if config.models[..i].contains(tag) {
                return Err(PlacementError::invalid(&self.name, format!("model '{}' listed twice", tag)));
            }
        }
        for tag in config.max_num.keys() {
            if !config.models.contains(tag) {
                return Err(PlacementError::invalid(
                    &self.name,
                    format!("max_num names '{}', which is not in the pool", tag),
                ));
            }
        }
        for policy in &config.policies {
            if let Some(tag) = policy.models.iter().find(|m| !config.models.contains(m)) {
                return Err(PlacementError::invalid(
                    &self.name,
                    format!("policy names '{}', which is not in the pool", tag),
                ));
            }
            for group in &policy.config {
                group
                    .validate(ctx.constraints)
                    .map_err(|reason| PlacementError::invalid(&self.name, reason))?;
            }
        }
        for binding in &config.constraints {
            if !config.models.contains(&binding.model) {
                return Err(PlacementError::invalid(
                    &self.name,
                    format!("constraint bound to '{}', which is not in the pool", binding.model),
                ));
            }
            if let Some(region) = ctx.constraints.get(&binding.constraint)?.region() {
                if region.is_empty() {
                    return Err(PlacementError::EmptyFreeSpace {
                        name: binding.constraint.clone(),
                    });
                }
            }
        }
        if !(config.min_distance >= 0.0) {
            return Err(PlacementError::invalid(&self.name, "min_distance must be non-negative"));
        }
        if config.max_attempts == 0 || config.max_point_attempts == 0 {
            return Err(PlacementError::invalid(&self.name, "attempt budgets must be positive"));
        }
        Ok(())
    }

    fn obstacle(&self, footprint: &MultiPolygon) -> MultiPolygon {
        if self.config.min_distance > 0.0 {
            buffer(footprint, self.config.min_distance, JoinStyle::Round)
        } else {
            footprint.clone()
        }
    }

    /// Sample and commit models until every budget is met or exhausted
    ///
    /// Draw order per attempt: picker, then the pending model's dimensions
    /// when a new instance is needed, then the policy groups in order.
    pub fn run(&self, ctx: &mut EngineContext<'_>) -> Result<EngineReport, PlacementError> {
        self.validate(ctx)?;
        let config = &self.config;

        let mut states: Vec<TagState> = Vec::with_capacity(config.models.len());
        for tag in &config.models {
            let mut constraints = Vec::new();
            for binding in config.constraints.iter().filter(|b| &b.model == tag) {
                constraints.push(ctx.constraints.get(&binding.constraint)?.clone());
            }
            states.push(TagState {
                tag: tag.clone(),
                required: config.required(tag),
                placed: 0,
                attempts: 0,
                pending: None,
                constraints,
            });
        }

        let mut obstacles: Vec<MultiPolygon> = if config.no_collision {
            ctx.world.iter().map(|m| self.obstacle(m.footprint())).collect()
        } else {
            Vec::new()
        };

        tracing::info!(engine = %self.name, models = states.len(), "random pose engine started");
        let mut picker = config.model_picker.build();
        let mut remaining: Vec<usize> = states.iter().map(|s| s.required).collect();

        while let Some(index) = picker.pick(&remaining, ctx.rng) {
            let state = &mut states[index];
            if state.attempts >= config.max_attempts {
                tracing::warn!(
                    engine = %self.name,
                    tag = %state.tag,
                    placed = state.placed,
                    required = state.required,
                    "attempt budget exhausted"
                );
                match config.on_exhausted {
                    ExhaustionPolicy::Abort => {
                        let tags: Vec<TagReport> = states.iter().map(TagState::report).collect();
                        let state = &states[index];
                        return Err(PlacementError::SamplingExhausted {
                            engine: self.name.clone(),
                            tag: state.tag.clone(),
                            placed: state.placed,
                            required: state.required,
                            attempts: state.attempts,
                            tags,
                        });
                    }
                    ExhaustionPolicy::AcceptPartial => {
                        remaining[index] = 0;
                        continue;
                    }
                }
            }
            state.attempts += 1;

            let geometry = match &state.pending {
                Some(geometry) => Arc::clone(geometry),
                None => {
                    let geometry = ctx.assets.get(&state.tag)?.instantiate(ctx.rng)?;
                    state.pending = Some(Arc::clone(&geometry));
                    geometry
                }
            };

            let sampled = match config.policy_for(&state.tag) {
                Some(policy) => policy.sample_pose(ctx.constraints, config.max_point_attempts, ctx.rng),
                None => Some(Default::default()),
            };
            let Some(mut pose) = sampled else {
                tracing::trace!(engine = %self.name, tag = %state.tag, "no workspace point drawn");
                continue;
            };

            for constraint in &state.constraints {
                constraint.apply(geometry.as_ref(), &mut pose);
            }
            if !state
                .constraints
                .iter()
                .all(|c| c.is_satisfied(geometry.as_ref(), &pose))
            {
                tracing::trace!(engine = %self.name, tag = %state.tag, "constraint rejected candidate");
                continue;
            }

            let footprint = footprint_at(geometry.as_ref(), &pose);
            if config.no_collision && obstacles.iter().any(|o| intersects(o, &footprint)) {
                tracing::trace!(engine = %self.name, tag = %state.tag, "collision");
                continue;
            }

            let model = ctx.world.add_model(&state.tag, geometry, pose);
            tracing::debug!(engine = %self.name, model = %model.name(), attempts = state.attempts, "model placed");
            if config.no_collision {
                obstacles.push(self.obstacle(model.footprint()));
            }
            state.pending = None;
            state.placed += 1;
            remaining[index] -= 1;
        }

        let report = EngineReport {
            engine: self.name.clone(),
            tags: states.iter().map(TagState::report).collect(),
        };
        tracing::info!(engine = %self.name, placed = report.placed(), "random pose engine finished");
        Ok(report)
    }
}
