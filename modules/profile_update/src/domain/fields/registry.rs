use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::{FieldDefinition, FieldSpec};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("field '{name}' is already registered")]
    Duplicate { name: String },

    #[error("field '{name}' is invalid: {reason}")]
    InvalidDefinition { name: String, reason: String },

    #[error("field '{name}' has an invalid pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

/// Registered additional-field definitions.
///
/// Filled during startup and then shared behind an `Arc`; lookups take
/// `&self` so any number of requests can read it concurrently.
#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    fields: Vec<FieldDefinition>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from config entries, failing on the first bad one.
    pub fn from_specs(specs: impl IntoIterator<Item = FieldSpec>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(FieldDefinition::try_from(spec)?)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, def: FieldDefinition) -> Result<(), RegistryError> {
        if self.index.contains_key(def.name()) {
            return Err(RegistryError::Duplicate {
                name: def.name().to_string(),
            });
        }
        def.check()
            .map_err(|reason| RegistryError::InvalidDefinition {
                name: def.name().to_string(),
                reason,
            })?;

        debug!(field = def.name(), kind = %def.kind(), required = def.is_required(), "registered field");
        self.index.insert(def.name().to_string(), self.fields.len());
        self.fields.push(def);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FieldDefinition> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// All definitions in registration order.
    pub fn all(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter()
    }

    pub fn required(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|d| d.is_required())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
