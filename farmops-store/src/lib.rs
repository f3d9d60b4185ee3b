//! Entity collection store for FarmOps.
//!
//! Provides the generic engine every domain collection is built on:
//! - [`Record`]: the capability an entity needs (id + kind + JSON shape)
//! - [`EntityStore`]: ordered, id-keyed collection with all-or-nothing commands
//! - [`Snapshot`]: immutable, versioned view handed to readers
//! - [`Outbox`]: drains committed [`Change`](farmops_types::Change)s for a remote boundary
//! - [`Shared`]: mutex handle for callers that mutate from several threads
//!
//! Every successful command publishes exactly one new snapshot; failed
//! commands publish nothing and leave the collection untouched.

mod outbox;
mod patch;
mod record;
mod shared;
mod snapshot;
mod store;

pub use outbox::Outbox;
pub use record::Record;
pub use shared::Shared;
pub use snapshot::Snapshot;
pub use store::EntityStore;

/// Receiver side of a store's snapshot feed.
pub type Subscription<T> = tokio::sync::watch::Receiver<Snapshot<T>>;
