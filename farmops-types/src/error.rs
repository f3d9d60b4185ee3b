//! The command error taxonomy.
//!
//! Every command either succeeds or returns exactly one [`CommandError`],
//! and a failed command never modifies its collection.

use crate::EntityId;
use std::fmt;
use thiserror::Error;

/// Result type for store, ledger and lifecycle commands.
pub type CommandResult<T> = Result<T, CommandError>;

/// Local validation failures surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// An entity with this id exists, or existed and was removed.
    #[error("{kind} {id} already exists")]
    DuplicateId { kind: &'static str, id: EntityId },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: EntityId },

    /// Amounts must be positive; deltas must be non-zero.
    #[error("invalid amount {amount} for {id}")]
    InvalidAmount { id: EntityId, amount: i64 },

    #[error("insufficient stock for {id}: requested {requested}, available {available}")]
    InsufficientStock {
        id: EntityId,
        requested: u64,
        available: u64,
    },

    #[error("invalid transition for {id}: {from} -> {to}")]
    InvalidTransition {
        id: EntityId,
        from: String,
        to: String,
    },

    /// A patch that would change the id, touch a protected field, or break
    /// the entity's shape.
    #[error("invalid patch for {kind} {id}: {reason}")]
    InvalidPatch {
        kind: &'static str,
        id: EntityId,
        reason: String,
    },

    /// The entity is in a status that no longer accepts changes.
    #[error("{kind} {id} is {status} and cannot be changed")]
    Locked {
        kind: &'static str,
        id: EntityId,
        status: String,
    },
}

impl CommandError {
    /// The stable error label, for mapping to user-facing messages.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateId { .. } => ErrorKind::DuplicateId,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            Self::InvalidPatch { .. } => ErrorKind::InvalidPatch,
            Self::Locked { .. } => ErrorKind::Locked,
        }
    }

    /// The id of the entity the command targeted.
    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        match self {
            Self::DuplicateId { id, .. }
            | Self::NotFound { id, .. }
            | Self::InvalidAmount { id, .. }
            | Self::InsufficientStock { id, .. }
            | Self::InvalidTransition { id, .. }
            | Self::InvalidPatch { id, .. }
            | Self::Locked { id, .. } => id,
        }
    }
}

/// Discriminant of [`CommandError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateId,
    NotFound,
    InvalidAmount,
    InsufficientStock,
    InvalidTransition,
    InvalidPatch,
    Locked,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateId => "duplicate_id",
            Self::NotFound => "not_found",
            Self::InvalidAmount => "invalid_amount",
            Self::InsufficientStock => "insufficient_stock",
            Self::InvalidTransition => "invalid_transition",
            Self::InvalidPatch => "invalid_patch",
            Self::Locked => "locked",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
