use crate::pose::Pose;

use super::{EngineContext, EngineReport, PlacementError, TagReport};

/// Commits a literal list of (asset tag, pose) assignments
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPoseEngine {
    name: String,
    assignments: Vec<(String, Pose)>,
}

impl FixedPoseEngine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assignments: Vec::new(),
        }
    }

    pub fn with_pose(mut self, tag: impl Into<String>, pose: Pose) -> Self {
        self.assignments.push((tag.into(), pose));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn assignments(&self) -> &[(String, Pose)] {
        &self.assignments
    }

    /// Every tag is checked before anything is committed
    pub fn run(&self, ctx: &mut EngineContext<'_>) -> Result<EngineReport, PlacementError> {
        for (tag, _) in &self.assignments {
            ctx.assets.get(tag)?;
        }

        let mut tags: Vec<TagReport> = Vec::new();
        for (tag, pose) in &self.assignments {
            let geometry = ctx.assets.get(tag)?.instantiate(ctx.rng)?;
            let name = ctx.world.add_model(tag, geometry, *pose).name().to_string();
            tracing::debug!(engine = %self.name, model = %name, "fixed pose committed");

            match tags.iter_mut().find(|t| &t.tag == tag) {
                Some(report) => {
                    report.placed += 1;
                    report.required += 1;
                }
                None => tags.push(TagReport {
                    tag: tag.clone(),
                    placed: 1,
                    required: 1,
                    attempts: 0,
                }),
            }
        }
        Ok(EngineReport {
            engine: self.name.clone(),
            tags,
        })
    }
}
