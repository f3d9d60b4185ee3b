use farmops_store::Record;

/// An entity carrying a non-negative stock quantity.
pub trait StockRecord: Record {
    /// JSON field holding the quantity; protected from `update` patches.
    const QUANTITY_FIELD: &'static str = "quantity";

    fn quantity(&self) -> u64;

    fn set_quantity(&mut self, quantity: u64);

    /// Quantity at or below which the item counts as low stock.
    fn reorder_level(&self) -> u64;

    /// Grouping key for totals (condition for tyres, category for parts).
    fn category(&self) -> String;

    fn location(&self) -> &str;
}
