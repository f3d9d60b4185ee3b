//! Change records for the optional remote boundary.
//!
//! Each committed store mutation queues one [`Change`]. Changes are
//! immutable and carry the full JSON of the entity, so a backend can
//! apply them without knowing the entity's Rust type.

use crate::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(Uuid);

impl ChangeId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ChangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happened to the entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum ChangePayload {
    EntityInserted { json_data: serde_json::Value },
    /// Carries the full entity after the update.
    EntityUpdated { json_data: serde_json::Value },
    EntityRemoved,
}

/// One committed mutation of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub id: ChangeId,
    pub entity_id: EntityId,
    /// The entity kind (e.g., "tyre", "test_case").
    pub entity_kind: String,
    pub timestamp: Timestamp,
    /// Commit number from the store's [`Services`](crate::Services);
    /// orders changes across stores that share them.
    #[serde(default)]
    pub sequence: u64,
    pub payload: ChangePayload,
}

impl Change {
    #[must_use]
    pub fn new(
        entity_id: EntityId,
        entity_kind: impl Into<String>,
        timestamp: Timestamp,
        payload: ChangePayload,
    ) -> Self {
        Self {
            id: ChangeId::new(),
            entity_id,
            entity_kind: entity_kind.into(),
            timestamp,
            sequence: 0,
            payload,
        }
    }

    #[must_use]
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    #[must_use]
    pub fn inserted(
        entity_id: EntityId,
        entity_kind: impl Into<String>,
        timestamp: Timestamp,
        json_data: serde_json::Value,
    ) -> Self {
        Self::new(
            entity_id,
            entity_kind,
            timestamp,
            ChangePayload::EntityInserted { json_data },
        )
    }

    #[must_use]
    pub fn updated(
        entity_id: EntityId,
        entity_kind: impl Into<String>,
        timestamp: Timestamp,
        json_data: serde_json::Value,
    ) -> Self {
        Self::new(
            entity_id,
            entity_kind,
            timestamp,
            ChangePayload::EntityUpdated { json_data },
        )
    }

    #[must_use]
    pub fn removed(
        entity_id: EntityId,
        entity_kind: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self::new(entity_id, entity_kind, timestamp, ChangePayload::EntityRemoved)
    }
}
