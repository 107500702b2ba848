//! Schema source for attribute definitions
//!
//! A schema document describes the attributes of one entity type: name, type,
//! required-ness, and any declared constraints (including names of custom
//! rules). The presence of a document is what makes an entity type
//! "supported". The default implementation reads JSON documents from a
//! directory at the convention path `<root>/<entity_type>.json`.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::RegistryError;
use crate::model::{AttributeType, ConstraintRule};

/// One declared constraint in a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaConstraint {
    pub rule: ConstraintRule,
    #[serde(default)]
    pub value: Option<String>,
}

/// One attribute declaration in a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: AttributeType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub constraints: Vec<SchemaConstraint>,
}

/// A whole schema document for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaDocument {
    pub attributes: Vec<SchemaAttribute>,
}

/// Where schema documents come from.
///
/// The registry treats this source as authoritative: anything it declares
/// wins over the persisted fallback store.
pub trait SchemaSource: Send + Sync {
    /// Entity types for which a schema document exists.
    fn supported_types(&self) -> Result<BTreeSet<String>, RegistryError>;

    /// The document for one entity type, or `None` when the type has no
    /// schema (and is therefore served from the fallback store only).
    fn load(&self, entity_type: &str) -> Result<Option<SchemaDocument>, RegistryError>;
}

/// Schema documents as JSON files under a root directory, one per entity
/// type, named `<entity_type>.json`.
#[derive(Debug, Clone)]
pub struct DirectorySchemaSource {
    root: PathBuf,
}

impl DirectorySchemaSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SchemaSource for DirectorySchemaSource {
    fn supported_types(&self) -> Result<BTreeSet<String>, RegistryError> {
        let mut types = BTreeSet::new();
        let entries = fs::read_dir(&self.root).map_err(RegistryError::SchemaSource)?;
        for entry in entries {
            let entry = entry.map_err(RegistryError::SchemaSource)?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                types.insert(stem.to_string());
            }
        }
        Ok(types)
    }

    fn load(&self, entity_type: &str) -> Result<Option<SchemaDocument>, RegistryError> {
        let path = self.root.join(format!("{entity_type}.json"));
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|e| RegistryError::Schema {
            entity_type: entity_type.to_string(),
            reason: e.to_string(),
        })?;
        let document: SchemaDocument =
            serde_json::from_str(&text).map_err(|e| RegistryError::Schema {
                entity_type: entity_type.to_string(),
                reason: e.to_string(),
            })?;
        debug!(
            entity_type,
            attributes = document.attributes.len(),
            "loaded schema document"
        );
        Ok(Some(document))
    }
}
