//! Asset registry keyed by tag

use std::collections::HashMap;
use std::sync::Arc;

use rand::RngCore;

use crate::error::{RegistryError, RegistryKind};

use super::{AssetError, AssetFactory, ModelGeometry};

/// A named asset template
#[derive(Debug, Clone)]
pub struct Asset {
    tag: String,
    factory: Arc<dyn AssetFactory>,
}

impl Asset {
    pub fn new(tag: impl Into<String>, factory: impl AssetFactory + 'static) -> Self {
        Self {
            tag: tag.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn from_factory(tag: impl Into<String>, factory: Arc<dyn AssetFactory>) -> Self {
        Self {
            tag: tag.into(),
            factory,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is_static(&self) -> bool {
        self.factory.is_static()
    }

    /// Instantiate one model
    pub fn instantiate(&self, rng: &mut dyn RngCore) -> Result<Arc<dyn ModelGeometry>, AssetError> {
        self.factory.build(rng)
    }
}

/// Registry of assets in registration order
#[derive(Debug, Default, Clone)]
pub struct AssetRegistry {
    assets: HashMap<String, Asset>,
    order: Vec<String>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset; tags are unique
    pub fn add(&mut self, asset: Asset) -> Result<(), RegistryError> {
        if self.assets.contains_key(asset.tag()) {
            return Err(RegistryError::duplicate(RegistryKind::Asset, asset.tag()));
        }
        self.order.push(asset.tag().to_string());
        self.assets.insert(asset.tag().to_string(), asset);
        Ok(())
    }

    pub fn get(&self, tag: &str) -> Result<&Asset, RegistryError> {
        self.assets.get(tag).ok_or_else(|| {
            RegistryError::not_found(RegistryKind::Asset, tag, self.order.iter().map(String::as_str))
        })
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.assets.contains_key(tag)
    }

    /// Tags in registration order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
