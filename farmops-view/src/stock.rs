use farmops_ledger::{AuditRecord, StockRecord};
use farmops_store::Snapshot;
use farmops_types::EntityId;
use serde::Serialize;
use std::collections::BTreeMap;

/// Item and unit counts for a stock snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StockTotals {
    /// Number of stock lines.
    pub total: usize,
    /// Units across all lines.
    pub total_quantity: u64,
    /// Stock lines per category.
    pub per_category: BTreeMap<String, usize>,
    /// Units per category.
    pub quantity_per_category: BTreeMap<String, u64>,
}

/// Items at or below their own reorder level, in collection order.
pub fn low_stock<T: StockRecord>(snapshot: &Snapshot<T>) -> Vec<T> {
    snapshot
        .iter()
        .filter(|item| item.quantity() <= item.reorder_level())
        .cloned()
        .collect()
}

/// Items at or below a fixed threshold, in collection order.
pub fn low_stock_with<T: StockRecord>(snapshot: &Snapshot<T>, threshold: u64) -> Vec<T> {
    snapshot
        .iter()
        .filter(|item| item.quantity() <= threshold)
        .cloned()
        .collect()
}

pub fn totals<T: StockRecord>(snapshot: &Snapshot<T>) -> StockTotals {
    snapshot
        .iter()
        .fold(StockTotals::default(), |mut acc, item| {
            let category = item.category();
            acc.total += 1;
            acc.total_quantity = acc.total_quantity.saturating_add(item.quantity());
            *acc.per_category.entry(category.clone()).or_default() += 1;
            let units = acc.quantity_per_category.entry(category).or_default();
            *units = units.saturating_add(item.quantity());
            acc
        })
}

/// Units taken out of stock per item, from consumption and negative
/// adjustments in the audit log.
pub fn consumption_by_item(audit: &[AuditRecord]) -> BTreeMap<EntityId, u64> {
    audit
        .iter()
        .filter(|record| record.delta < 0)
        .fold(BTreeMap::new(), |mut acc, record| {
            let used = acc.entry(record.item_id.clone()).or_insert(0_u64);
            *used = used.saturating_add(record.delta.unsigned_abs());
            acc
        })
}
