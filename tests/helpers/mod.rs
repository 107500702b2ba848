#![allow(dead_code)]

//! Shared fixtures for integration tests.

use std::fs;
use std::sync::Arc;

use asset_core::{
    AttributeDefinitionRegistry, DirectorySchemaSource, InMemoryDefinitionStore,
};
use tempfile::TempDir;

/// Schema document for the "equipment" entity type used across tests.
pub const EQUIPMENT_SCHEMA: &str = r#"{
    "attributes": [
        {
            "name": "name",
            "type": "STRING",
            "required": true,
            "constraints": [{"rule": "CUSTOM", "value": "name-matches-code"}]
        },
        {"name": "code", "type": "STRING"},
        {
            "name": "status",
            "type": "STRING",
            "constraints": [{"rule": "ENUM", "value": "draft,active,archived"}]
        },
        {
            "name": "label",
            "type": "STRING",
            "constraints": [{"rule": "LENGTH", "value": "5"}]
        },
        {
            "name": "area",
            "type": "DECIMAL",
            "constraints": [{"rule": "MIN_MAX", "value": "10,20"}]
        },
        {"name": "installed_at", "type": "DATE"},
        {"name": "active", "type": "BOOLEAN"}
    ]
}"#;

/// Logging for tests; safe to call from every test, first caller wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("asset_core=debug")
        .try_init();
}

/// Build a registry over a temporary schema directory holding one document.
///
/// The returned `TempDir` must stay alive as long as the registry is used.
pub fn registry_with_schema(
    entity_type: &str,
    schema_json: &str,
) -> (TempDir, Arc<AttributeDefinitionRegistry>, Arc<InMemoryDefinitionStore>) {
    init_tracing();
    let dir = TempDir::new().expect("create temp schema dir");
    fs::write(dir.path().join(format!("{entity_type}.json")), schema_json)
        .expect("write schema document");
    let store = Arc::new(InMemoryDefinitionStore::new());
    let registry = AttributeDefinitionRegistry::new(
        Arc::new(DirectorySchemaSource::new(dir.path())),
        store.clone(),
    )
    .expect("build registry");
    (dir, Arc::new(registry), store)
}

/// Registry for the standard "equipment" schema.
pub fn equipment_registry() -> (TempDir, Arc<AttributeDefinitionRegistry>) {
    let (dir, registry, _) = registry_with_schema("equipment", EQUIPMENT_SCHEMA);
    (dir, registry)
}
