//! Core type definitions for FarmOps.
//!
//! This crate defines the domain-agnostic types every state container
//! depends on:
//! - Entity identifiers and the injectable [`IdGenerator`]
//! - Millisecond [`Timestamp`]s and the injectable [`Clock`]
//! - [`Change`] records queued for an optional remote boundary
//! - The [`CommandError`] taxonomy returned by every command
//!
//! Domain entities (tyres, parts, documents, test cases) live in
//! `farmops-domain`, not here.

mod change;
mod error;
mod ids;
mod services;
mod timestamp;

pub use change::{Change, ChangeId, ChangePayload};
pub use error::{CommandError, CommandResult, ErrorKind};
pub use ids::{EntityId, IdGenerator, SequentialIds, UuidIds};
pub use services::Services;
pub use timestamp::{Clock, ManualClock, SystemClock, Timestamp};
