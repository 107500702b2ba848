//! Link cardinality enforcement
//!
//! Validates link-definition state and cardinality invariants before a
//! relationship is created. The invariants range over the set of currently
//! active links for an (entity type, entity subtype) pair, read through the
//! [`LinkStore`] collaborator.
//!
//! The checks here are check-then-act: reads followed by a conditional
//! write. Under concurrent requests for the same asset or target the window
//! between them is a race, so the true mutual-exclusion guarantee must come
//! from a uniqueness constraint in the backing store (see [`LinkStore`]).
//! The application-level checks exist to produce precise error messages.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CardinalitySide, LinkError};
use crate::model::{AssetLink, CreateLinkCommand, LinkDefinition};

/// Persistence collaborator for links.
///
/// All operations run inside the ambient transaction boundary the caller
/// supplies; the core manages no transactions, retries or timeouts.
///
/// Contract: implementations must back the cardinality invariant with a
/// uniqueness constraint of their own — the service's read-then-write
/// sequence alone cannot exclude concurrent writers.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// The link definition for (entity type, entity subtype), if declared.
    async fn find_definition(
        &self,
        entity_type: &str,
        entity_subtype: &str,
    ) -> anyhow::Result<Option<LinkDefinition>>;

    /// The active link matching the exact
    /// (asset, entity type, entity subtype, target) tuple, if any.
    async fn find_active(
        &self,
        asset_id: &str,
        entity_type: &str,
        entity_subtype: &str,
        target_code: &str,
    ) -> anyhow::Result<Option<AssetLink>>;

    /// All active links the asset holds under (entity type, entity subtype).
    async fn active_for_asset(
        &self,
        asset_id: &str,
        entity_type: &str,
        entity_subtype: &str,
    ) -> anyhow::Result<Vec<AssetLink>>;

    /// All active links the target participates in under
    /// (entity type, entity subtype).
    async fn active_for_target(
        &self,
        target_code: &str,
        entity_type: &str,
        entity_subtype: &str,
    ) -> anyhow::Result<Vec<AssetLink>>;

    /// Persist a newly created link row.
    async fn insert(&self, link: &AssetLink) -> anyhow::Result<()>;

    /// Persist a changed link row (deactivation).
    async fn update(&self, link: &AssetLink) -> anyhow::Result<()>;
}

/// Runs the definition, duplicate and cardinality checks in front of the
/// store.
pub struct LinkService<S: LinkStore> {
    store: S,
}

impl<S: LinkStore> LinkService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a new active link, enforcing definition state, duplicate
    /// exclusion and cardinality.
    pub async fn create_link(&self, command: &CreateLinkCommand) -> Result<AssetLink, LinkError> {
        let definition = self
            .store
            .find_definition(&command.entity_type, &command.entity_subtype)
            .await?
            .ok_or_else(|| LinkError::DefinitionNotFound {
                entity_type: command.entity_type.clone(),
                entity_subtype: command.entity_subtype.clone(),
            })?;
        if !definition.active {
            return Err(LinkError::DefinitionInactive {
                entity_type: command.entity_type.clone(),
                entity_subtype: command.entity_subtype.clone(),
            });
        }

        if self
            .store
            .find_active(
                &command.asset_id,
                &command.entity_type,
                &command.entity_subtype,
                &command.target_code,
            )
            .await?
            .is_some()
        {
            return Err(LinkError::AlreadyExists {
                asset_id: command.asset_id.clone(),
                target_code: command.target_code.clone(),
                entity_type: command.entity_type.clone(),
                entity_subtype: command.entity_subtype.clone(),
            });
        }

        // The exact tuple is excluded above, so any remaining active link is
        // "another" link for cardinality purposes.
        if definition.cardinality.asset_side_limited() {
            let existing = self
                .store
                .active_for_asset(
                    &command.asset_id,
                    &command.entity_type,
                    &command.entity_subtype,
                )
                .await?;
            if !existing.is_empty() {
                warn!(
                    asset_id = %command.asset_id,
                    entity_type = %command.entity_type,
                    entity_subtype = %command.entity_subtype,
                    "link rejected: asset side cardinality exhausted"
                );
                return Err(LinkError::CardinalityViolation {
                    side: CardinalitySide::Asset,
                    id: command.asset_id.clone(),
                    entity_type: command.entity_type.clone(),
                    entity_subtype: command.entity_subtype.clone(),
                });
            }
        }
        if definition.cardinality.target_side_limited() {
            let existing = self
                .store
                .active_for_target(
                    &command.target_code,
                    &command.entity_type,
                    &command.entity_subtype,
                )
                .await?;
            if !existing.is_empty() {
                warn!(
                    target_code = %command.target_code,
                    entity_type = %command.entity_type,
                    entity_subtype = %command.entity_subtype,
                    "link rejected: target side cardinality exhausted"
                );
                return Err(LinkError::CardinalityViolation {
                    side: CardinalitySide::Target,
                    id: command.target_code.clone(),
                    entity_type: command.entity_type.clone(),
                    entity_subtype: command.entity_subtype.clone(),
                });
            }
        }

        let now = Utc::now();
        let link = AssetLink {
            id: Uuid::new_v4(),
            asset_id: command.asset_id.clone(),
            entity_type: command.entity_type.clone(),
            entity_subtype: command.entity_subtype.clone(),
            target_code: command.target_code.clone(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(&link).await?;
        info!(
            link_id = %link.id,
            asset_id = %link.asset_id,
            target_code = %link.target_code,
            "link created"
        );
        Ok(link)
    }

    /// Soft-deactivate the active link for the exact tuple.
    ///
    /// No cardinality checks run here — cardinality is only enforced on
    /// activation. The row is kept, flagged inactive.
    pub async fn deactivate_link(
        &self,
        asset_id: &str,
        entity_type: &str,
        entity_subtype: &str,
        target_code: &str,
    ) -> Result<AssetLink, LinkError> {
        let mut link = self
            .store
            .find_active(asset_id, entity_type, entity_subtype, target_code)
            .await?
            .ok_or_else(|| LinkError::NotFound {
                asset_id: asset_id.to_string(),
                target_code: target_code.to_string(),
                entity_type: entity_type.to_string(),
                entity_subtype: entity_subtype.to_string(),
            })?;
        link.active = false;
        link.updated_at = Utc::now();
        self.store.update(&link).await?;
        info!(link_id = %link.id, "link deactivated");
        Ok(link)
    }
}
