use farmops_types::EntityId;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// An entity that can live in an [`EntityStore`](crate::EntityStore).
///
/// Each domain kind is its own struct; the store only needs its id, a
/// static kind name for error messages, and a JSON object representation
/// for shallow-merge patches and change records.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Kind name used in errors and change records (e.g., "tyre").
    const KIND: &'static str;

    fn id(&self) -> &EntityId;
}
