//! Attribute definition registry
//!
//! Merges the schema source (authoritative) with the persisted fallback
//! store into one immutable snapshot per entity type. The merge is
//! asymmetric: any name the schema declares is answered from the schema;
//! names only the store knows are included as-is. The registry is a pure
//! read path after construction — callers refresh explicitly, there is no
//! TTL and no background invalidation. Refresh builds a whole new snapshot
//! and swaps it atomically, so concurrent readers never observe a partial
//! merge.

pub mod schema;
pub mod store;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::error::RegistryError;
use crate::model::{AttributeDefinition, ConstraintDefinition, ConstraintRule};

pub use schema::{DirectorySchemaSource, SchemaAttribute, SchemaConstraint, SchemaDocument, SchemaSource};
pub use store::{DefinitionStore, InMemoryDefinitionStore};

#[derive(Debug, Default)]
struct Snapshot {
    definitions: HashMap<String, HashMap<String, AttributeDefinition>>,
    constraints: HashMap<String, HashMap<String, Vec<ConstraintDefinition>>>,
    supported: BTreeSet<String>,
}

/// The sole authority for attribute definitions, consulted by both the
/// payload reader and the validator. No other component caches definitions.
pub struct AttributeDefinitionRegistry {
    schema: Arc<dyn SchemaSource>,
    store: Arc<dyn DefinitionStore>,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl AttributeDefinitionRegistry {
    /// Construct and load the initial snapshot.
    pub fn new(
        schema: Arc<dyn SchemaSource>,
        store: Arc<dyn DefinitionStore>,
    ) -> Result<Self, RegistryError> {
        let snapshot = build_snapshot(schema.as_ref(), store.as_ref())?;
        Ok(Self {
            schema,
            store,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Rebuild the merged view and swap it in atomically.
    ///
    /// The new snapshot is built outside the lock; readers keep serving the
    /// old one until the swap and never block on the rebuild.
    pub fn refresh(&self) -> Result<(), RegistryError> {
        let next = build_snapshot(self.schema.as_ref(), self.store.as_ref())?;
        let types = next.supported.len();
        *self.snapshot.write().unwrap() = Arc::new(next);
        info!(supported_types = types, "attribute definition registry refreshed");
        Ok(())
    }

    fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().unwrap().clone()
    }

    /// Merged definitions for one entity type, keyed by attribute name.
    pub fn definitions(&self, entity_type: &str) -> HashMap<String, AttributeDefinition> {
        self.current()
            .definitions
            .get(entity_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Constraint chains for one entity type, keyed by attribute name.
    ///
    /// Every definition yields at least a TYPE constraint (and REQUIRED when
    /// declared required); schema-declared value rules follow in declaration
    /// order with CUSTOM rules last.
    pub fn constraints(&self, entity_type: &str) -> HashMap<String, Vec<ConstraintDefinition>> {
        self.current()
            .constraints
            .get(entity_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Entity types for which a schema document exists.
    pub fn supported_types(&self) -> BTreeSet<String> {
        self.current().supported.clone()
    }

    pub fn is_supported(&self, entity_type: &str) -> bool {
        self.current().supported.contains(entity_type)
    }

    /// Seed the fallback store with schema-derived definitions, skipping any
    /// (entity type, name) already present. Returns how many were written.
    pub fn seed_store(&self) -> Result<usize, RegistryError> {
        let mut written = 0;
        for entity_type in self.schema.supported_types()? {
            let Some(document) = self.schema.load(&entity_type)? else {
                continue;
            };
            for attribute in &document.attributes {
                if self.store.contains(&entity_type, &attribute.name)? {
                    continue;
                }
                let definition = AttributeDefinition::new(
                    &entity_type,
                    &attribute.name,
                    attribute.value_type,
                    attribute.required,
                );
                self.store.save(&definition)?;
                written += 1;
            }
        }
        if written > 0 {
            info!(written, "seeded definition store from schema");
        }
        Ok(written)
    }
}

fn build_snapshot(
    schema: &dyn SchemaSource,
    store: &dyn DefinitionStore,
) -> Result<Snapshot, RegistryError> {
    let mut snapshot = Snapshot {
        supported: schema.supported_types()?,
        ..Snapshot::default()
    };

    // Schema first: authoritative.
    for entity_type in snapshot.supported.clone() {
        let Some(document) = schema.load(&entity_type)? else {
            warn!(entity_type = %entity_type, "supported entity type has no loadable schema");
            continue;
        };
        let defs = snapshot.definitions.entry(entity_type.clone()).or_default();
        let cons = snapshot.constraints.entry(entity_type.clone()).or_default();
        for attribute in &document.attributes {
            let definition = AttributeDefinition::new(
                &entity_type,
                &attribute.name,
                attribute.value_type,
                attribute.required,
            );
            cons.insert(
                attribute.name.clone(),
                constraint_chain(&definition, &attribute.constraints),
            );
            defs.insert(attribute.name.clone(), definition);
        }
    }

    // Fallback store: only names the schema does not declare.
    for entity_type in store.entity_types()? {
        for definition in store.load(&entity_type)? {
            let defs = snapshot.definitions.entry(entity_type.clone()).or_default();
            if defs.contains_key(&definition.name) {
                continue;
            }
            snapshot
                .constraints
                .entry(entity_type.clone())
                .or_default()
                .insert(definition.name.clone(), constraint_chain(&definition, &[]));
            defs.insert(definition.name.clone(), definition);
        }
    }

    Ok(snapshot)
}

/// Deterministic constraint order for one attribute: TYPE, then REQUIRED,
/// then declared value-shape rules in declaration order, CUSTOM rules last.
fn constraint_chain(
    definition: &AttributeDefinition,
    declared: &[SchemaConstraint],
) -> Vec<ConstraintDefinition> {
    let mut chain = vec![ConstraintDefinition::new(
        definition.clone(),
        ConstraintRule::Type,
    )];
    if definition.required {
        chain.push(ConstraintDefinition::new(
            definition.clone(),
            ConstraintRule::Required,
        ));
    }
    let declared_rule = |c: &SchemaConstraint| ConstraintDefinition {
        definition: definition.clone(),
        rule: c.rule,
        rule_value: c.value.clone(),
    };
    // TYPE and REQUIRED are implied by the definition; a redundant
    // declaration must not run twice.
    chain.extend(
        declared
            .iter()
            .filter(|c| {
                !matches!(c.rule, ConstraintRule::Type | ConstraintRule::Required)
                    && c.rule != ConstraintRule::Custom
            })
            .map(declared_rule),
    );
    chain.extend(
        declared
            .iter()
            .filter(|c| c.rule == ConstraintRule::Custom)
            .map(declared_rule),
    );
    chain
}
