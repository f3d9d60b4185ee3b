use farmops_ledger::{OverdraftPolicy, QuantityLedger, StockRecord};
use farmops_store::{Outbox, Record, Snapshot};
use farmops_types::{Change, CommandResult, EntityId, Services};
use farmops_view::StockTotals;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A workshop spare part held in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkshopPart {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub part_number: String,
    /// Grouping such as "filters", "hydraulics", "belts".
    pub category: String,
    pub quantity: u64,
    #[serde(default)]
    pub reorder_level: u64,
    pub location: String,
    /// Unit of issue ("each", "litre", "metre").
    #[serde(default = "default_unit")]
    pub unit: String,
}

fn default_unit() -> String {
    "each".to_string()
}

impl Record for WorkshopPart {
    const KIND: &'static str = "workshop_part";

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl StockRecord for WorkshopPart {
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
        self.category.clone()
    }

    fn location(&self) -> &str {
        &self.location
    }
}

/// Input for [`WorkshopParts::add_part`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPart {
    pub name: String,
    #[serde(default)]
    pub part_number: String,
    pub category: String,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default)]
    pub reorder_level: u64,
    pub location: String,
    #[serde(default = "default_unit")]
    pub unit: String,
}

/// Workshop spare-parts inventory.
pub struct WorkshopParts {
    ledger: QuantityLedger<WorkshopPart>,
}

impl WorkshopParts {
    pub fn new(services: Services, policy: OverdraftPolicy) -> Self {
        Self {
            ledger: QuantityLedger::with_services(services, policy),
        }
    }

    pub fn set_actor(&mut self, actor: impl Into<String>) {
        self.ledger.set_actor(actor);
    }

    pub fn ledger(&self) -> &QuantityLedger<WorkshopPart> {
        &self.ledger
    }

    pub fn get(&self, id: &str) -> Option<&WorkshopPart> {
        self.ledger.get(id)
    }

    pub fn list(&self) -> &[WorkshopPart] {
        self.ledger.list()
    }

    pub fn snapshot(&self) -> Snapshot<WorkshopPart> {
        self.ledger.snapshot()
    }

    pub fn add_part(&mut self, part: NewPart) -> CommandResult<EntityId> {
        let (id, _) = self.ledger.insert_with(|id| WorkshopPart {
            id,
            name: part.name,
            part_number: part.part_number,
            category: part.category,
            quantity: part.quantity,
            reorder_level: part.reorder_level,
            location: part.location,
            unit: part.unit,
        })?;
        Ok(id)
    }

    pub fn insert(&mut self, part: WorkshopPart) -> CommandResult<Snapshot<WorkshopPart>> {
        self.ledger.insert(part)
    }

    pub fn update(&mut self, id: &str, patch: &Value) -> CommandResult<Snapshot<WorkshopPart>> {
        self.ledger.update(id, patch)
    }

    pub fn remove(&mut self, id: &str) -> CommandResult<Snapshot<WorkshopPart>> {
        self.ledger.remove(id)
    }

    pub fn receive(&mut self, id: &str, amount: i64) -> CommandResult<Snapshot<WorkshopPart>> {
        self.ledger.receive(id, amount)
    }

    pub fn consume(&mut self, id: &str, amount: i64) -> CommandResult<Snapshot<WorkshopPart>> {
        self.ledger.consume(id, amount)
    }

    pub fn adjust(&mut self, id: &str, delta: i64) -> CommandResult<Snapshot<WorkshopPart>> {
        self.ledger.adjust(id, delta)
    }

    pub fn low_stock(&self) -> Vec<WorkshopPart> {
        farmops_view::low_stock(&self.ledger.snapshot())
    }

    pub fn totals(&self) -> StockTotals {
        farmops_view::totals(&self.ledger.snapshot())
    }
}

impl Outbox for WorkshopParts {
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
