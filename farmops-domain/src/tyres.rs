use farmops_ledger::{OverdraftPolicy, QuantityLedger, StockRecord};
use farmops_lifecycle::{TyreCondition, check_transition};
use farmops_store::{Outbox, Record, Snapshot};
use farmops_types::{Change, CommandResult, EntityId, Services};
use farmops_view::StockTotals;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A line of tyre stock: identical tyres of one size, brand and condition
/// held at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TyreStockItem {
    pub id: EntityId,
    pub brand: String,
    /// Tyre size as printed on the sidewall (e.g., "650/65R42").
    pub size: String,
    pub condition: TyreCondition,
    pub quantity: u64,
    #[serde(default)]
    pub reorder_level: u64,
    pub location: String,
}

impl Record for TyreStockItem {
    const KIND: &'static str = "tyre";

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl StockRecord for TyreStockItem {
    fn quantity(&self) -> u64 {
        self.quantity
    }

    fn set_quantity(&mut self, quantity: u64) {
        self.quantity = quantity;
    }

    fn reorder_level(&self) -> u64 {
        self.reorder_level
    }

    fn category(&self) -> String {
        self.condition.to_string()
    }

    fn location(&self) -> &str {
        &self.location
    }
}

/// Input for [`TyreStock::add_tyre`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTyre {
    pub brand: String,
    pub size: String,
    #[serde(default = "new_condition")]
    pub condition: TyreCondition,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default)]
    pub reorder_level: u64,
    pub location: String,
}

fn new_condition() -> TyreCondition {
    TyreCondition::New
}

/// Tyre inventory.
pub struct TyreStock {
    ledger: QuantityLedger<TyreStockItem>,
}

impl TyreStock {
    pub fn new(services: Services, policy: OverdraftPolicy) -> Self {
        let mut ledger = QuantityLedger::with_services(services, policy);
        ledger.protect("condition");
        Self { ledger }
    }

    pub fn set_actor(&mut self, actor: impl Into<String>) {
        self.ledger.set_actor(actor);
    }

    pub fn ledger(&self) -> &QuantityLedger<TyreStockItem> {
        &self.ledger
    }

    pub fn get(&self, id: &str) -> Option<&TyreStockItem> {
        self.ledger.get(id)
    }

    pub fn list(&self) -> &[TyreStockItem] {
        self.ledger.list()
    }

    pub fn snapshot(&self) -> Snapshot<TyreStockItem> {
        self.ledger.snapshot()
    }

    /// Adds a stock line under a generated id and returns the id.
    pub fn add_tyre(&mut self, tyre: NewTyre) -> CommandResult<EntityId> {
        let (id, _) = self.ledger.insert_with(|id| TyreStockItem {
            id,
            brand: tyre.brand,
            size: tyre.size,
            condition: tyre.condition,
            quantity: tyre.quantity,
            reorder_level: tyre.reorder_level,
            location: tyre.location,
        })?;
        Ok(id)
    }

    /// Adds a stock line with a caller-chosen id.
    pub fn insert(&mut self, item: TyreStockItem) -> CommandResult<Snapshot<TyreStockItem>> {
        self.ledger.insert(item)
    }

    pub fn update(&mut self, id: &str, patch: &Value) -> CommandResult<Snapshot<TyreStockItem>> {
        self.ledger.update(id, patch)
    }

    pub fn remove(&mut self, id: &str) -> CommandResult<Snapshot<TyreStockItem>> {
        self.ledger.remove(id)
    }

    pub fn receive(&mut self, id: &str, amount: i64) -> CommandResult<Snapshot<TyreStockItem>> {
        self.ledger.receive(id, amount)
    }

    pub fn consume(&mut self, id: &str, amount: i64) -> CommandResult<Snapshot<TyreStockItem>> {
        self.ledger.consume(id, amount)
    }

    pub fn adjust(&mut self, id: &str, delta: i64) -> CommandResult<Snapshot<TyreStockItem>> {
        self.ledger.adjust(id, delta)
    }

    /// Moves a stock line along new → part_worn → scrap.
    pub fn reclassify(
        &mut self,
        id: &str,
        condition: TyreCondition,
    ) -> CommandResult<Snapshot<TyreStockItem>> {
        let (_, snapshot) = self.ledger.modify_details(id, |tyre| {
            check_transition(&tyre.id, tyre.condition, condition)?;
            tyre.condition = condition;
            Ok(())
        })?;
        Ok(snapshot)
    }

    pub fn low_stock(&self) -> Vec<TyreStockItem> {
        farmops_view::low_stock(&self.ledger.snapshot())
    }

    pub fn totals(&self) -> StockTotals {
        farmops_view::totals(&self.ledger.snapshot())
    }
}

impl Outbox for TyreStock {
    fn drain_changes(&mut self) -> Vec<Change> {
        self.ledger.drain_changes()
    }

    fn requeue_changes(&mut self, changes: Vec<Change>) {
        self.ledger.requeue_changes(changes);
    }

    fn pending_changes(&self) -> usize {
        self.ledger.pending_changes()
    }
}
