//! Asset-to-target link model
//!
//! A link relates an asset to an external target code under an
//! (entity type, entity subtype) pair. How many active links may exist on
//! either side is governed by the link definition's cardinality.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many active links each side of the relationship admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkCardinality {
    AssetOneTargetOne,
    AssetManyTargetOne,
    AssetOneTargetMany,
}

impl LinkCardinality {
    /// The asset may hold at most one active link under the definition.
    pub fn asset_side_limited(&self) -> bool {
        matches!(
            self,
            LinkCardinality::AssetOneTargetOne | LinkCardinality::AssetOneTargetMany
        )
    }

    /// The target may be linked to at most one asset under the definition.
    pub fn target_side_limited(&self) -> bool {
        matches!(
            self,
            LinkCardinality::AssetOneTargetOne | LinkCardinality::AssetManyTargetOne
        )
    }
}

/// Declared link kind for an (entity type, entity subtype) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDefinition {
    pub entity_type: String,
    pub entity_subtype: String,
    pub cardinality: LinkCardinality,
    pub active: bool,
}

/// A persisted relationship row. Created active; deactivation is a soft
/// flag — this core never hard-deletes a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLink {
    pub id: Uuid,
    pub asset_id: String,
    pub entity_type: String,
    pub entity_subtype: String,
    pub target_code: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create (activate) a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLinkCommand {
    pub asset_id: String,
    pub entity_type: String,
    pub entity_subtype: String,
    pub target_code: String,
}

impl CreateLinkCommand {
    pub fn new(
        asset_id: impl Into<String>,
        entity_type: impl Into<String>,
        entity_subtype: impl Into<String>,
        target_code: impl Into<String>,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            entity_type: entity_type.into(),
            entity_subtype: entity_subtype.into(),
            target_code: target_code.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinality_sides() {
        assert!(LinkCardinality::AssetOneTargetOne.asset_side_limited());
        assert!(LinkCardinality::AssetOneTargetOne.target_side_limited());
        assert!(LinkCardinality::AssetOneTargetMany.asset_side_limited());
        assert!(!LinkCardinality::AssetOneTargetMany.target_side_limited());
        assert!(!LinkCardinality::AssetManyTargetOne.asset_side_limited());
        assert!(LinkCardinality::AssetManyTargetOne.target_side_limited());
    }
}
