//! Quantity ledger for FarmOps stock collections.
//!
//! [`QuantityLedger`] wraps an [`EntityStore`](farmops_store::EntityStore)
//! of [`StockRecord`]s. Quantities change only through `receive`,
//! `consume` and `adjust`, never go below zero, and every accepted change
//! appends an [`AuditRecord`].

mod audit;
mod ledger;
mod policy;
mod stock;

pub use audit::AuditRecord;
pub use ledger::{MAX_QUANTITY, QuantityLedger};
pub use policy::OverdraftPolicy;
pub use stock::StockRecord;
