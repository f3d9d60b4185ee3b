use crate::{AuditRecord, OverdraftPolicy, StockRecord};
use farmops_store::{EntityStore, Outbox, Snapshot, Subscription};
use farmops_types::{Change, Clock, CommandError, CommandResult, EntityId, Services};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Largest quantity an item may hold, so every movement fits an `i64` delta.
pub const MAX_QUANTITY: u64 = i64::MAX.unsigned_abs();

/// The quantity change a command resolves to, before it is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Movement {
    applied: i64,
    resulting: u64,
    clamped: bool,
}

/// Resolves a signed delta against the available quantity.
fn plan(
    id: &EntityId,
    available: u64,
    delta: i64,
    policy: OverdraftPolicy,
) -> CommandResult<Movement> {
    if delta >= 0 {
        let resulting = available
            .checked_add(delta.unsigned_abs())
            .filter(|quantity| *quantity <= MAX_QUANTITY)
            .ok_or_else(|| CommandError::InvalidAmount {
                id: id.clone(),
                amount: delta,
            })?;
        return Ok(Movement {
            applied: delta,
            resulting,
            clamped: false,
        });
    }

    let wanted = delta.unsigned_abs();
    if wanted <= available {
        return Ok(Movement {
            applied: delta,
            resulting: available - wanted,
            clamped: false,
        });
    }
    match policy {
        OverdraftPolicy::Reject => Err(CommandError::InsufficientStock {
            id: id.clone(),
            requested: wanted,
            available,
        }),
        OverdraftPolicy::Clamp => {
            let taken = i64::try_from(available).map_err(|_| CommandError::InvalidAmount {
                id: id.clone(),
                amount: delta,
            })?;
            Ok(Movement {
                applied: -taken,
                resulting: 0,
                clamped: true,
            })
        }
    }
}

/// Stock collection whose quantities can only move through audited
/// commands.
pub struct QuantityLedger<T: StockRecord> {
    store: EntityStore<T>,
    audit: Vec<AuditRecord>,
    policy: OverdraftPolicy,
    actor: String,
    clock: Arc<dyn Clock>,
}

impl<T: StockRecord> QuantityLedger<T> {
    /// Wraps a store. The quantity field becomes patch-protected.
    pub fn new(mut store: EntityStore<T>, policy: OverdraftPolicy) -> Self {
        store.protect(T::QUANTITY_FIELD);
        let clock = Arc::clone(&store.services().clock);
        Self {
            store,
            audit: Vec::new(),
            policy,
            actor: "system".to_string(),
            clock,
        }
    }

    /// Creates a ledger over an empty store.
    pub fn with_services(services: Services, policy: OverdraftPolicy) -> Self {
        Self::new(EntityStore::new(services), policy)
    }

    pub fn policy(&self) -> OverdraftPolicy {
        self.policy
    }

    /// Name recorded on subsequent audit records.
    pub fn set_actor(&mut self, actor: impl Into<String>) {
        self.actor = actor.into();
    }

    pub fn actor(&self) -> &str {
        &self.actor
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

    pub fn subscribe(&self) -> Subscription<T> {
        self.store.subscribe()
    }

    /// Every accepted quantity change, oldest first.
    pub fn audit(&self) -> &[AuditRecord] {
        &self.audit
    }

    pub fn audit_for(&self, item_id: &str) -> Vec<&AuditRecord> {
        self.audit
            .iter()
            .filter(|record| record.item_id.as_str() == item_id)
            .collect()
    }

    // ── Collection commands ──────────────────────────────────────

    /// Adds an item. A non-zero opening quantity is audited as a receipt;
    /// one above [`MAX_QUANTITY`] is rejected with `InvalidAmount`.
    pub fn insert(&mut self, item: T) -> CommandResult<Snapshot<T>> {
        let opening = opening_delta(&item)?;
        let id = item.id().clone();
        let snapshot = self.store.insert(item)?;
        self.record_opening(id, opening);
        Ok(snapshot)
    }

    /// Adds an item under a generated id.
    pub fn insert_with(
        &mut self,
        build: impl FnOnce(EntityId) -> T,
    ) -> CommandResult<(EntityId, Snapshot<T>)> {
        let mut opening = 0;
        let (id, snapshot) = self.store.try_insert_with(|id| {
            let item = build(id);
            opening = opening_delta(&item)?;
            Ok(item)
        })?;
        self.record_opening(id.clone(), opening);
        Ok((id, snapshot))
    }

    /// Patches descriptive fields. Quantity changes are rejected.
    pub fn update(&mut self, id: &str, patch: &Value) -> CommandResult<Snapshot<T>> {
        self.store.update(id, patch)
    }

    /// Typed change of descriptive fields; fails with `InvalidPatch` if `f`
    /// touches the quantity.
    pub fn modify_details<R>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut T) -> CommandResult<R>,
    ) -> CommandResult<(R, Snapshot<T>)> {
        self.store.modify(id, |item| {
            let before = item.quantity();
            let output = f(item)?;
            if item.quantity() != before {
                return Err(CommandError::InvalidPatch {
                    kind: T::KIND,
                    id: item.id().clone(),
                    reason: format!("field `{}` changes only through the ledger", T::QUANTITY_FIELD),
                });
            }
            Ok(output)
        })
    }

    /// Removes an item. Its audit history is kept.
    pub fn remove(&mut self, id: &str) -> CommandResult<Snapshot<T>> {
        self.store.remove(id)
    }

    // ── Quantity commands ────────────────────────────────────────

    /// Adds `amount` units. `amount` must be positive.
    pub fn receive(&mut self, item_id: &str, amount: i64) -> CommandResult<Snapshot<T>> {
        require_positive(item_id, amount)?;
        self.apply(item_id, amount)
    }

    /// Takes `amount` units. `amount` must be positive and, under the
    /// reject policy, no more than the quantity in stock.
    pub fn consume(&mut self, item_id: &str, amount: i64) -> CommandResult<Snapshot<T>> {
        require_positive(item_id, amount)?;
        self.apply(item_id, -amount)
    }

    /// Applies a signed, non-zero correction.
    pub fn adjust(&mut self, item_id: &str, delta: i64) -> CommandResult<Snapshot<T>> {
        if delta == 0 {
            return Err(CommandError::InvalidAmount {
                id: EntityId::from(item_id),
                amount: delta,
            });
        }
        self.apply(item_id, delta)
    }

    fn apply(&mut self, item_id: &str, delta: i64) -> CommandResult<Snapshot<T>> {
        let policy = self.policy;
        let (movement, snapshot) = self.store.modify(item_id, |item| {
            let movement = plan(item.id(), item.quantity(), delta, policy)?;
            item.set_quantity(movement.resulting);
            Ok(movement)
        })?;

        if movement.clamped {
            warn!(
                kind = T::KIND,
                id = item_id,
                requested = delta,
                applied = movement.applied,
                "over-consumption clamped to zero"
            );
        } else {
            debug!(
                kind = T::KIND,
                id = item_id,
                delta = movement.applied,
                quantity = movement.resulting,
                "stock moved"
            );
        }

        self.audit.push(AuditRecord {
            item_id: EntityId::from(item_id),
            delta: movement.applied,
            resulting_quantity: movement.resulting,
            timestamp: self.clock.now(),
            actor: self.actor.clone(),
            clamped: movement.clamped,
        });
        Ok(snapshot)
    }

    fn record_opening(&mut self, item_id: EntityId, delta: i64) {
        if delta == 0 {
            return;
        }
        self.audit.push(AuditRecord {
            item_id,
            delta,
            resulting_quantity: delta.unsigned_abs(),
            timestamp: self.clock.now(),
            actor: self.actor.clone(),
            clamped: false,
        });
    }
}

fn opening_delta<T: StockRecord>(item: &T) -> CommandResult<i64> {
    i64::try_from(item.quantity()).map_err(|_| CommandError::InvalidAmount {
        id: item.id().clone(),
        amount: i64::MAX,
    })
}

fn require_positive(item_id: &str, amount: i64) -> CommandResult<()> {
    if amount <= 0 {
        return Err(CommandError::InvalidAmount {
            id: EntityId::from(item_id),
            amount,
        });
    }
    Ok(())
}

impl<T: StockRecord> Outbox for QuantityLedger<T> {
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
