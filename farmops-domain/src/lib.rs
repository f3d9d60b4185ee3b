//! Domain façades for FarmOps.
//!
//! Each façade binds the generic store machinery to one concrete entity
//! and exposes the verbs screens need:
//! - [`TyreStock`]: tyre inventory (ledger + condition graph)
//! - [`WorkshopParts`]: workshop spare parts (ledger)
//! - [`Documents`]: documents awaiting signature (lifecycle)
//! - [`TestCases`]: test-case tracking (lifecycle)
//! - [`JobCards`]: workshop and transport job cards (lifecycle)
//! - [`FieldRegistry`]: farmers and their fields (two plain stores)
//!
//! [`FarmOps`] owns one of each and is passed explicitly to whatever
//! needs it; there is no global instance.

mod config;
mod context;
mod documents;
mod fields;
mod fixtures;
mod jobs;
mod parts;
mod sink;
mod test_cases;
mod tyres;

pub use config::{ConfigError, FarmOpsConfig};
pub use context::FarmOps;
pub use documents::{Documents, SigningDocument};
pub use fields::{Farmer, Field, FieldRegistry, NewField};
pub use jobs::{JobCard, JobCards, PartUse};
pub use parts::{NewPart, WorkshopPart, WorkshopParts};
pub use sink::{CommitSink, FlushReport, SinkError};
pub use test_cases::{TestCase, TestCases};
pub use tyres::{NewTyre, TyreStock, TyreStockItem};

pub use farmops_ledger::OverdraftPolicy;
pub use farmops_lifecycle::{DocumentStatus, JobStatus, TestCaseStatus, TyreCondition};
