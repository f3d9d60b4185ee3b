//! The generic entity collection engine.

use crate::patch::merge_patch;
use crate::{Outbox, Record, Snapshot, Subscription};
use farmops_types::{Change, CommandError, CommandResult, EntityId, Services};
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::watch;
use tracing::debug;

/// Attempts at drawing an unused id before giving up.
const MAX_ID_DRAWS: usize = 64;

/// An ordered, id-keyed collection of one entity kind.
///
/// All writes go through `&mut self` commands. Each successful command
/// builds the next collection and publishes it as a new [`Snapshot`]; when
/// the services have the change log on, it also queues one [`Change`]. A
/// failing command returns before anything is touched.
pub struct EntityStore<T: Record> {
    current: Snapshot<T>,
    index: HashMap<EntityId, usize>,
    /// Ids removed from the collection; they are never handed out again.
    retired: HashSet<EntityId>,
    protected: Vec<&'static str>,
    services: Services,
    outbox: VecDeque<Change>,
    publisher: watch::Sender<Snapshot<T>>,
}

impl<T: Record> EntityStore<T> {
    /// Creates an empty store.
    pub fn new(services: Services) -> Self {
        let (publisher, _) = watch::channel(Snapshot::empty());
        Self {
            current: Snapshot::empty(),
            index: HashMap::new(),
            retired: HashSet::new(),
            protected: Vec::new(),
            services,
            outbox: VecDeque::new(),
            publisher,
        }
    }

    /// The injected id generator and clock.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Marks a field as writable only through [`modify`](Self::modify).
    ///
    /// Ledgers protect quantities and lifecycles protect statuses so that
    /// `update` patches cannot bypass their checks.
    pub fn protect(&mut self, field: &'static str) {
        if !self.protected.contains(&field) {
            self.protected.push(field);
        }
    }

    pub fn protected_fields(&self) -> &[&'static str] {
        &self.protected
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&pos| &self.current.as_slice()[pos])
    }

    /// Entities in insertion order.
    pub fn list(&self) -> &[T] {
        self.current.as_slice()
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> Snapshot<T> {
        self.current.clone()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Version of the latest snapshot.
    pub fn version(&self) -> u64 {
        self.current.version()
    }

    /// A receiver that always holds the latest snapshot.
    ///
    /// Versions seen through a receiver only increase.
    pub fn subscribe(&self) -> Subscription<T> {
        self.publisher.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Appends an entity.
    ///
    /// Fails with `DuplicateId` if the id is present or was removed earlier.
    pub fn insert(&mut self, entity: T) -> CommandResult<Snapshot<T>> {
        let id = entity.id().clone();
        if self.index.contains_key(&id) || self.retired.contains(&id) {
            return Err(CommandError::DuplicateId { kind: T::KIND, id });
        }
        let json = self.encode(&entity)?;

        let mut items = self.current.as_slice().to_vec();
        items.push(entity);
        self.index.insert(id.clone(), items.len() - 1);

        debug!(kind = T::KIND, id = %id, "inserted entity");
        let change = Change::inserted(id, T::KIND, self.services.clock.now(), json);
        Ok(self.commit(items, change))
    }

    /// Draws a fresh id from the id generator and inserts `build(id)`.
    ///
    /// Returns the id of the inserted entity with the new snapshot.
    pub fn insert_with(
        &mut self,
        build: impl FnOnce(EntityId) -> T,
    ) -> CommandResult<(EntityId, Snapshot<T>)> {
        self.try_insert_with(|id| Ok(build(id)))
    }

    /// Like [`insert_with`](Self::insert_with), but `build` may refuse the
    /// entity; nothing is committed in that case.
    pub fn try_insert_with(
        &mut self,
        build: impl FnOnce(EntityId) -> CommandResult<T>,
    ) -> CommandResult<(EntityId, Snapshot<T>)> {
        let entity = build(self.fresh_id()?)?;
        let id = entity.id().clone();
        let snapshot = self.insert(entity)?;
        Ok((id, snapshot))
    }

    /// Shallow-merges a JSON object over the entity and replaces it.
    ///
    /// Fails with `NotFound` for unknown ids and `InvalidPatch` when the
    /// patch changes the id, touches a protected field, or no longer
    /// matches the entity's shape.
    pub fn update(&mut self, id: &str, patch: &Value) -> CommandResult<Snapshot<T>> {
        self.update_with(id, patch, |_| {})
    }

    /// Like [`update`](Self::update), then runs `finish` on the merged
    /// entity before it is committed. Wrappers use it to stamp bookkeeping
    /// fields that patches may not write.
    pub fn update_with(
        &mut self,
        id: &str,
        patch: &Value,
        finish: impl FnOnce(&mut T),
    ) -> CommandResult<Snapshot<T>> {
        let pos = self.position(id)?;
        let existing = &self.current.as_slice()[pos];
        let mut merged = merge_patch(existing, patch, &self.protected).map_err(|reason| {
            CommandError::InvalidPatch {
                kind: T::KIND,
                id: EntityId::from(id),
                reason,
            }
        })?;
        finish(&mut merged);
        if merged.id().as_str() != id {
            return Err(CommandError::InvalidPatch {
                kind: T::KIND,
                id: EntityId::from(id),
                reason: "field `id` cannot be changed".to_string(),
            });
        }
        self.replace(pos, merged)
    }

    /// Runs `f` against a copy of the entity and commits the copy if `f`
    /// succeeds. Protected fields may be changed here; the id may not.
    ///
    /// Returns `f`'s output together with the new snapshot.
    pub fn modify<R>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut T) -> CommandResult<R>,
    ) -> CommandResult<(R, Snapshot<T>)> {
        let pos = self.position(id)?;
        let mut draft = self.current.as_slice()[pos].clone();
        let output = f(&mut draft)?;
        if draft.id().as_str() != id {
            return Err(CommandError::InvalidPatch {
                kind: T::KIND,
                id: EntityId::from(id),
                reason: "field `id` cannot be changed".to_string(),
            });
        }
        let snapshot = self.replace(pos, draft)?;
        Ok((output, snapshot))
    }

    /// Removes an entity and retires its id.
    pub fn remove(&mut self, id: &str) -> CommandResult<Snapshot<T>> {
        let pos = self.position(id)?;
        let mut items = self.current.as_slice().to_vec();
        let removed = items.remove(pos);
        let removed_id = removed.id().clone();

        self.index = items
            .iter()
            .enumerate()
            .map(|(pos, item)| (item.id().clone(), pos))
            .collect();
        self.retired.insert(removed_id.clone());

        debug!(kind = T::KIND, id = %removed_id, "removed entity");
        let change = Change::removed(removed_id, T::KIND, self.services.clock.now());
        Ok(self.commit(items, change))
    }

    // ── Internals ────────────────────────────────────────────────

    fn position(&self, id: &str) -> CommandResult<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| CommandError::NotFound {
                kind: T::KIND,
                id: EntityId::from(id),
            })
    }

    fn fresh_id(&self) -> CommandResult<EntityId> {
        let mut last = None;
        for _ in 0..MAX_ID_DRAWS {
            let id = self.services.ids.next_id();
            if !self.index.contains_key(&id) && !self.retired.contains(&id) {
                return Ok(id);
            }
            last = Some(id);
        }
        Err(CommandError::DuplicateId {
            kind: T::KIND,
            id: last.unwrap_or_else(|| EntityId::new("")),
        })
    }

    fn encode(&self, entity: &T) -> CommandResult<Value> {
        serde_json::to_value(entity).map_err(|e| CommandError::InvalidPatch {
            kind: T::KIND,
            id: entity.id().clone(),
            reason: e.to_string(),
        })
    }

    fn replace(&mut self, pos: usize, entity: T) -> CommandResult<Snapshot<T>> {
        let json = self.encode(&entity)?;
        let id = entity.id().clone();
        let mut items = self.current.as_slice().to_vec();
        items[pos] = entity;

        debug!(kind = T::KIND, id = %id, "updated entity");
        let change = Change::updated(id, T::KIND, self.services.clock.now(), json);
        Ok(self.commit(items, change))
    }

    fn commit(&mut self, items: Vec<T>, change: Change) -> Snapshot<T> {
        let snapshot = Snapshot::new(self.current.version() + 1, items);
        self.current = snapshot.clone();
        self.publisher.send_replace(snapshot.clone());
        if self.services.record_changes {
            let sequence = self.services.next_sequence();
            self.outbox.push_back(change.with_sequence(sequence));
        }
        snapshot
    }
}

impl<T: Record> Outbox for EntityStore<T> {
    fn drain_changes(&mut self) -> Vec<Change> {
        self.outbox.drain(..).collect()
    }

    fn requeue_changes(&mut self, changes: Vec<Change>) {
        for change in changes.into_iter().rev() {
            self.outbox.push_front(change);
        }
    }

    fn pending_changes(&self) -> usize {
        self.outbox.len()
    }
}

impl<T: Record + std::fmt::Debug> std::fmt::Debug for EntityStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &T::KIND)
            .field("version", &self.current.version())
            .field("items", &self.current.as_slice())
            .finish_non_exhaustive()
    }
}
