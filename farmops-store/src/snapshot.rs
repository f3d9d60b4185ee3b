use crate::Record;
use serde::Serialize;
use std::sync::Arc;

/// An immutable, versioned view of a collection.
///
/// Snapshots share their backing storage, so cloning is cheap. Later
/// mutations of the store never alter a snapshot already handed out.
#[derive(Debug, Serialize)]
pub struct Snapshot<T> {
    version: u64,
    items: Arc<Vec<T>>,
}

impl<T> Snapshot<T> {
    pub(crate) fn new(version: u64, items: Vec<T>) -> Self {
        Self {
            version,
            items: Arc::new(items),
        }
    }

    /// The empty snapshot every store starts from.
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    /// Number of mutations committed before this snapshot was taken.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Record> Snapshot<T> {
    /// Looks up an entity by id.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id().as_str() == id)
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.id().as_str()).collect()
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T> IntoIterator for &'a Snapshot<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
