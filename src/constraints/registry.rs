use std::collections::HashMap;

use crate::error::{RegistryError, RegistryKind};

use super::Constraint;

/// Constraints keyed by name, in registration order
#[derive(Debug, Default, Clone)]
pub struct ConstraintRegistry {
    constraints: HashMap<String, Constraint>,
    order: Vec<String>,
}

impl ConstraintRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a constraint; names are never reused or overwritten
    pub fn add(&mut self, name: impl Into<String>, constraint: Constraint) -> Result<(), RegistryError> {
        let name = name.into();
        if self.constraints.contains_key(&name) {
            return Err(RegistryError::duplicate(RegistryKind::Constraint, name));
        }
        tracing::debug!(name = %name, kind = constraint.kind(), "constraint registered");
        self.order.push(name.clone());
        self.constraints.insert(name, constraint);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Constraint, RegistryError> {
        self.constraints.get(name).ok_or_else(|| {
            RegistryError::not_found(RegistryKind::Constraint, name, self.order.iter().map(String::as_str))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constraints.contains_key(name)
    }

    pub fn list_names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
