//! Aggregation views over FarmOps snapshots.
//!
//! Every function here is a pure function of its input: it never mutates
//! the snapshot or audit log, and calling it twice on the same input
//! yields identical output. Maps are ordered so results compare and
//! serialize deterministically.

mod stock;
mod workflow;

pub use stock::{StockTotals, consumption_by_item, low_stock, low_stock_with, totals};
pub use workflow::{StatusTotals, count_by_status, share_in, status_totals};
