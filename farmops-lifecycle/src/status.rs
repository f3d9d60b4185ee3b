use farmops_store::Record;
use farmops_types::{CommandError, CommandResult, EntityId, Timestamp};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// A closed set of statuses with declared outgoing edges.
pub trait Status:
    Copy + Eq + Ord + Hash + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Status every new entity starts in.
    const INITIAL: Self;

    /// Every declared status, in graph order.
    const ALL: &'static [Self];

    /// Statuses reachable in one step.
    fn successors(self) -> &'static [Self];

    fn as_str(self) -> &'static str;

    fn can_transition_to(self, target: Self) -> bool {
        self.successors().contains(&target)
    }

    /// A status with no outgoing edges.
    fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }
}

/// Fails with `InvalidTransition` unless `from → to` is a declared edge.
pub fn check_transition<S: Status>(id: &EntityId, from: S, to: S) -> CommandResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CommandError::InvalidTransition {
            id: id.clone(),
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        })
    }
}

/// An entity whose status is governed by a [`Lifecycle`](crate::Lifecycle).
pub trait Tracked: Record {
    type Status: Status;

    /// JSON field holding the status; protected from `update` patches.
    const STATUS_FIELD: &'static str = "status";

    /// Timestamp fields the lifecycle owns; protected like the status.
    const CREATED_FIELD: &'static str = "created_at";
    const UPDATED_FIELD: &'static str = "last_updated";

    fn status(&self) -> Self::Status;

    fn set_status(&mut self, status: Self::Status);

    /// Sets both `created_at` and `last_updated`.
    fn set_created(&mut self, at: Timestamp);

    /// Sets `last_updated`.
    fn touch(&mut self, at: Timestamp);
}
