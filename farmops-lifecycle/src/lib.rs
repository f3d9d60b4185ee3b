//! Lifecycle state machine for FarmOps workflow entities.
//!
//! Each workflow kind declares a small directed graph of statuses
//! ([`Status`]). [`Lifecycle`] wraps an entity store and only lets a
//! status move along a declared edge, recording every accepted move as a
//! [`TransitionRecord`].
//!
//! Declared graphs (initial status first):
//! - [`TestCaseStatus`]: draft → active → {pass, fail}; pass/fail → active
//! - [`DocumentStatus`]: pending → signed
//! - [`JobStatus`]: open → in_progress → closed
//! - [`TyreCondition`]: new → part_worn → scrap

mod graphs;
mod lifecycle;
mod status;

pub use graphs::{DocumentStatus, JobStatus, TestCaseStatus, TyreCondition};
pub use lifecycle::{Lifecycle, TransitionRecord};
pub use status::{Status, Tracked, check_transition};
