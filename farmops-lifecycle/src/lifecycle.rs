use crate::{Status, Tracked, check_transition};
use farmops_store::{EntityStore, Outbox, Snapshot, Subscription};
use farmops_types::{Change, Clock, CommandError, CommandResult, EntityId, Services, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// One accepted status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord<S> {
    pub entity_id: EntityId,
    pub from: S,
    pub to: S,
    pub timestamp: Timestamp,
}

/// A collection of workflow entities whose statuses follow a declared
/// graph.
pub struct Lifecycle<T: Tracked> {
    store: EntityStore<T>,
    history: Vec<TransitionRecord<T::Status>>,
    clock: Arc<dyn Clock>,
}

impl<T: Tracked> Lifecycle<T> {
    /// Wraps a store. The status and timestamp fields become
    /// patch-protected.
    pub fn new(mut store: EntityStore<T>) -> Self {
        store.protect(T::STATUS_FIELD);
        store.protect(T::CREATED_FIELD);
        store.protect(T::UPDATED_FIELD);
        let clock = Arc::clone(&store.services().clock);
        Self {
            store,
            history: Vec::new(),
            clock,
        }
    }

    pub fn with_services(services: Services) -> Self {
        Self::new(EntityStore::new(services))
    }

    /// Protects an additional field from `update` patches.
    pub fn protect(&mut self, field: &'static str) {
        self.store.protect(field);
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn get(&self, id: &str) -> Option<&T> {
        self.store.get(id)
    }

    pub fn list(&self) -> &[T] {
        self.store.list()
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.store.snapshot()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.store.contains(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn subscribe(&self) -> Subscription<T> {
        self.store.subscribe()
    }

    /// Every accepted transition, oldest first.
    pub fn history(&self) -> &[TransitionRecord<T::Status>] {
        &self.history
    }

    pub fn history_for(&self, id: &str) -> Vec<&TransitionRecord<T::Status>> {
        self.history
            .iter()
            .filter(|record| record.entity_id.as_str() == id)
            .collect()
    }

    // ── Collection commands ──────────────────────────────────────

    /// Inserts a new entity in the initial status, stamped with the
    /// current time.
    pub fn create(&mut self, mut entity: T) -> CommandResult<Snapshot<T>> {
        entity.set_status(<T::Status as Status>::INITIAL);
        entity.set_created(self.clock.now());
        self.store.insert(entity)
    }

    /// Like [`create`](Self::create), under a generated id.
    pub fn create_with(
        &mut self,
        build: impl FnOnce(EntityId) -> T,
    ) -> CommandResult<(EntityId, Snapshot<T>)> {
        let now = self.clock.now();
        self.store.insert_with(|id| {
            let mut entity = build(id);
            entity.set_status(<T::Status as Status>::INITIAL);
            entity.set_created(now);
            entity
        })
    }

    /// Inserts an entity as-is, in whatever status it carries. Used for
    /// fixture data; no transition is recorded.
    pub fn restore(&mut self, entity: T) -> CommandResult<Snapshot<T>> {
        self.store.insert(entity)
    }

    /// Patches descriptive fields and stamps `last_updated`. Status and
    /// timestamp changes are rejected.
    pub fn update(&mut self, id: &str, patch: &Value) -> CommandResult<Snapshot<T>> {
        let now = self.clock.now();
        self.store.update_with(id, patch, |entity| entity.touch(now))
    }

    /// Typed change of descriptive fields; fails with `InvalidPatch` if `f`
    /// changes the status.
    pub fn modify_details<R>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut T) -> CommandResult<R>,
    ) -> CommandResult<(R, Snapshot<T>)> {
        let now = self.clock.now();
        self.store.modify(id, |entity| {
            let before = entity.status();
            let output = f(entity)?;
            if entity.status() != before {
                return Err(CommandError::InvalidPatch {
                    kind: T::KIND,
                    id: entity.id().clone(),
                    reason: format!("field `{}` changes only through transitions", T::STATUS_FIELD),
                });
            }
            entity.touch(now);
            Ok(output)
        })
    }

    pub fn remove(&mut self, id: &str) -> CommandResult<Snapshot<T>> {
        self.store.remove(id)
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Moves the entity to `target` along a declared edge.
    pub fn transition(&mut self, id: &str, target: T::Status) -> CommandResult<Snapshot<T>> {
        self.transition_with(id, target, |_| Ok(()))
    }

    /// Moves the entity to `target` and applies `f` in the same commit.
    ///
    /// `f` runs after the edge check and may veto the transition by
    /// returning an error; nothing is committed in that case.
    pub fn transition_with(
        &mut self,
        id: &str,
        target: T::Status,
        f: impl FnOnce(&mut T) -> CommandResult<()>,
    ) -> CommandResult<Snapshot<T>> {
        let now = self.clock.now();
        let (from, snapshot) = self.store.modify(id, |entity| {
            let from = entity.status();
            check_transition(entity.id(), from, target)?;
            f(entity)?;
            entity.set_status(target);
            entity.touch(now);
            Ok(from)
        })?;

        debug!(kind = T::KIND, id, %from, to = %target, "status transition");
        self.history.push(TransitionRecord {
            entity_id: EntityId::from(id),
            from,
            to: target,
            timestamp: now,
        });
        Ok(snapshot)
    }
}

impl<T: Tracked> Outbox for Lifecycle<T> {
    fn drain_changes(&mut self) -> Vec<Change> {
        self.store.drain_changes()
    }

    fn requeue_changes(&mut self, changes: Vec<Change>) {
        self.store.requeue_changes(changes);
    }

    fn pending_changes(&self) -> usize {
        self.store.pending_changes()
    }
}
