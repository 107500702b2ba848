//! Persisted-definition fallback store
//!
//! A simple keyed store of (entity type, name) → definition. The registry
//! consults it for attribute names the schema does not declare, and the
//! bootstrap path seeds it from the schema idempotently.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::RegistryError;
use crate::model::AttributeDefinition;

/// Keyed definition storage the registry falls back to.
pub trait DefinitionStore: Send + Sync {
    /// Entity types the store has definitions for.
    fn entity_types(&self) -> Result<Vec<String>, RegistryError>;

    /// All definitions persisted for one entity type.
    fn load(&self, entity_type: &str) -> Result<Vec<AttributeDefinition>, RegistryError>;

    /// Whether a definition already exists for (entity type, name).
    fn contains(&self, entity_type: &str, name: &str) -> Result<bool, RegistryError>;

    /// Persist one definition, keyed by (entity type, name).
    fn save(&self, definition: &AttributeDefinition) -> Result<(), RegistryError>;
}

/// In-memory store, used in tests and as the no-persistence default.
#[derive(Debug, Default)]
pub struct InMemoryDefinitionStore {
    inner: RwLock<BTreeMap<(String, String), AttributeDefinition>>,
}

impl InMemoryDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DefinitionStore for InMemoryDefinitionStore {
    fn entity_types(&self) -> Result<Vec<String>, RegistryError> {
        let inner = self.inner.read().unwrap();
        let mut types: Vec<String> = inner.keys().map(|(t, _)| t.clone()).collect();
        types.dedup();
        Ok(types)
    }

    fn load(&self, entity_type: &str) -> Result<Vec<AttributeDefinition>, RegistryError> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .iter()
            .filter(|((t, _), _)| t == entity_type)
            .map(|(_, d)| d.clone())
            .collect())
    }

    fn contains(&self, entity_type: &str, name: &str) -> Result<bool, RegistryError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.contains_key(&(entity_type.to_string(), name.to_string())))
    }

    fn save(&self, definition: &AttributeDefinition) -> Result<(), RegistryError> {
        let mut inner = self.inner.write().unwrap();
        inner.insert(
            (definition.entity_type.clone(), definition.name.clone()),
            definition.clone(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeType;

    #[test]
    fn save_and_load_round_trip() {
        let store = InMemoryDefinitionStore::new();
        let def = AttributeDefinition::new("device", "color", AttributeType::String, false);
        store.save(&def).unwrap();

        assert!(store.contains("device", "color").unwrap());
        assert!(!store.contains("device", "area").unwrap());
        assert_eq!(store.load("device").unwrap(), vec![def]);
        assert_eq!(store.entity_types().unwrap(), vec!["device".to_string()]);
    }
}
