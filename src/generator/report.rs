use serde::Serialize;

use crate::placement::{EngineReport, PlacementError, TagReport};

/// An engine that stopped on a recoverable error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineFailure {
    pub engine: String,
    /// Tag that ran out of attempts, if the failure came from one
    pub tag: Option<String>,
    pub placed: usize,
    pub required: usize,
    /// Every tag of the engine as it stood when it stopped
    pub tags: Vec<TagReport>,
    pub reason: String,
}

impl EngineFailure {
    pub fn new(engine: &str, err: &PlacementError) -> Self {
        let (tag, placed, required, tags) = match err {
            PlacementError::SamplingExhausted {
                tag,
                placed,
                required,
                tags,
                ..
            } => (Some(tag.clone()), *placed, *required, tags.clone()),
            _ => (None, 0, 0, Vec::new()),
        };
        Self {
            engine: engine.to_string(),
            tag,
            placed,
            required,
            tags,
            reason: err.to_string(),
        }
    }
}

/// Per-engine outcome of [`super::Generator::run_engines`]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunReport {
    /// Engines that finished, in run order
    pub engines: Vec<EngineReport>,
    pub failures: Vec<EngineFailure>,
}

impl RunReport {
    /// Models committed by every engine, stopped ones included
    pub fn placed(&self) -> usize {
        let stopped: usize = self.failures.iter().flat_map(|f| &f.tags).map(|t| t.placed).sum();
        self.engines.iter().map(EngineReport::placed).sum::<usize>() + stopped
    }

    /// Every (engine, tag) that ended below its required count
    pub fn shortfalls(&self) -> impl Iterator<Item = (&str, &TagReport)> {
        self.engines
            .iter()
            .flat_map(|e| e.shortfalls().map(move |t| (e.engine.as_str(), t)))
    }

    /// No shortfall and no failed engine
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.shortfalls().next().is_none()
    }
}
