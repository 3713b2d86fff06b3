//! The shared world: placed model instances plus the room boundary
//!
//! Models are kept in placement order. Each model's world footprint is
//! computed once, when it is committed, and never changes afterwards.

mod free_space;

pub use free_space::{free_space, largest_component};

use std::collections::HashMap;
use std::sync::Arc;

use nalgebra::Vector3;
use serde::Serialize;
use thiserror::Error;

use crate::assets::ModelGeometry;
use crate::error::{RegistryError, RegistryKind};
use crate::geometry::{Bounds, MultiPolygon};
use crate::pose::Pose;

/// Errors raised by world queries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    /// A free-space query left no area to place anything in
    #[error("free space '{name}' is empty")]
    EmptyFreeSpace { name: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Footprint of a model geometry at a pose, in world coordinates
pub fn footprint_at(geometry: &dyn ModelGeometry, pose: &Pose) -> MultiPolygon {
    if pose.is_upright() {
        geometry.footprint().transformed(pose.yaw, pose.x, pose.y)
    } else {
        geometry
            .projected_footprint(&pose.rotation())
            .transformed(0.0, pose.x, pose.y)
    }
}

/// Lowest extent of a posed model along `normal`, measured from the origin
pub fn lower_extent(geometry: &dyn ModelGeometry, pose: &Pose, normal: &Vector3<f64>) -> f64 {
    pose.translation().dot(normal) - geometry.support(&pose.rotation(), &(-normal))
}

/// An asset instance bound to a pose
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    tag: String,
    pose: Pose,
    geometry: Arc<dyn ModelGeometry>,
    footprint: MultiPolygon,
}

impl Model {
    pub fn new(
        name: impl Into<String>,
        tag: impl Into<String>,
        geometry: Arc<dyn ModelGeometry>,
        pose: Pose,
    ) -> Self {
        let footprint = footprint_at(geometry.as_ref(), &pose);
        Self {
            name: name.into(),
            tag: tag.into(),
            pose,
            geometry,
            footprint,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn geometry(&self) -> &dyn ModelGeometry {
        self.geometry.as_ref()
    }

    pub fn is_static(&self) -> bool {
        self.geometry.is_static()
    }

    /// Footprint in world coordinates
    pub fn footprint(&self) -> &MultiPolygon {
        &self.footprint
    }

    /// Matches either the instance name or its asset tag
    pub fn matches(&self, key: &str) -> bool {
        self.name == key || self.tag == key
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            name: self.name.clone(),
            tag: self.tag.clone(),
            pose: self.pose,
            is_static: self.is_static(),
            bounds: self.footprint.bounds(),
        }
    }
}

/// Serializable view of a placed model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub tag: String,
    pub pose: Pose,
    pub is_static: bool,
    pub bounds: Option<Bounds>,
}

/// Serializable view of the whole world, models in placement order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSummary {
    pub models: Vec<ModelSummary>,
    pub boundary: Option<MultiPolygon>,
}

/// Mutable set of placed models
#[derive(Debug, Clone, Default)]
pub struct World {
    models: Vec<Model>,
    counters: HashMap<String, usize>,
    boundary: Option<MultiPolygon>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// World seeded with a room boundary
    pub fn with_boundary(boundary: MultiPolygon) -> Self {
        Self {
            boundary: Some(boundary),
            ..Self::default()
        }
    }

    pub fn boundary(&self) -> Option<&MultiPolygon> {
        self.boundary.as_ref()
    }

    pub fn set_boundary(&mut self, boundary: MultiPolygon) {
        self.boundary = Some(boundary);
    }

    fn next_name(&mut self, tag: &str) -> String {
        loop {
            let counter = self.counters.entry(tag.to_string()).or_insert(0);
            let name = format!("{}_{}", tag, counter);
            *counter += 1;
            if self.get(&name).is_none() {
                return name;
            }
        }
    }

    /// Commit a model under an automatic `<tag>_<n>` name
    pub fn add_model(
        &mut self,
        tag: &str,
        geometry: Arc<dyn ModelGeometry>,
        pose: Pose,
    ) -> &Model {
        let name = self.next_name(tag);
        self.models.push(Model::new(name, tag, geometry, pose));
        &self.models[self.models.len() - 1]
    }

    /// Commit a model under an explicit, unique name
    pub fn add_named_model(
        &mut self,
        name: &str,
        tag: &str,
        geometry: Arc<dyn ModelGeometry>,
        pose: Pose,
    ) -> Result<&Model, RegistryError> {
        if self.get(name).is_some() {
            return Err(RegistryError::duplicate(RegistryKind::Model, name));
        }
        self.models.push(Model::new(name, tag, geometry, pose));
        Ok(&self.models[self.models.len() - 1])
    }

    /// Remove a model by name, returning it
    pub fn remove_model(&mut self, name: &str) -> Result<Model, RegistryError> {
        match self.models.iter().position(|m| m.name == name) {
            Some(index) => Ok(self.models.remove(index)),
            None => Err(RegistryError::not_found(
                RegistryKind::Model,
                name,
                self.models.iter().map(|m| m.name.as_str()),
            )),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Models in placement order
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    pub fn models_with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Model> + 'a {
        self.models.iter().filter(move |m| m.tag == tag)
    }

    pub fn count(&self, tag: &str) -> usize {
        self.models_with_tag(tag).count()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Drop every model and the boundary
    pub fn clear(&mut self) {
        self.models.clear();
        self.counters.clear();
        self.boundary = None;
    }

    /// Residual placement area
    ///
    /// The region is the union of the footprints of `ground_plane_models`
    /// with their holes filled, or the world boundary when the list is empty.
    /// Every other model footprint, and the ground-plane models' own
    /// footprints, are removed from it. Models matching `ignore_models` are
    /// skipped entirely. Names match either instance names or asset tags.
    pub fn free_space(&self, ground_plane_models: &[&str], ignore_models: &[&str]) -> MultiPolygon {
        let is_ignored = |m: &Model| ignore_models.iter().any(|key| m.matches(key));
        let is_ground = |m: &Model| ground_plane_models.iter().any(|key| m.matches(key));

        let region = if ground_plane_models.is_empty() {
            self.boundary.clone().unwrap_or_default()
        } else {
            let filled: Vec<MultiPolygon> = self
                .models
                .iter()
                .filter(|m| is_ground(m) && !is_ignored(m))
                .map(|m| m.footprint.without_holes())
                .collect();
            crate::geometry::union_all(&filled)
        };

        let excluded: Vec<&MultiPolygon> = self
            .models
            .iter()
            .filter(|m| !is_ignored(m))
            .map(|m| &m.footprint)
            .collect();

        tracing::debug!(
            region_area = region.area(),
            excluded = excluded.len(),
            "computing free space"
        );
        free_space(&region, excluded)
    }

    /// Like [`World::free_space`], failing when nothing is left or when a
    /// ground-plane name matches no model
    pub fn free_space_checked(
        &self,
        name: &str,
        ground_plane_models: &[&str],
        ignore_models: &[&str],
    ) -> Result<MultiPolygon, WorldError> {
        for key in ground_plane_models {
            if !self.models.iter().any(|m| m.matches(key)) {
                let known = self.models.iter().flat_map(|m| [m.name(), m.tag()]);
                return Err(RegistryError::not_found(RegistryKind::Model, *key, known).into());
            }
        }
        let region = self.free_space(ground_plane_models, ignore_models);
        if region.is_empty() {
            return Err(WorldError::EmptyFreeSpace {
                name: name.to_string(),
            });
        }
        Ok(region)
    }

    pub fn summary(&self) -> WorldSummary {
        WorldSummary {
            models: self.models.iter().map(Model::summary).collect(),
            boundary: self.boundary.clone(),
        }
    }
}
