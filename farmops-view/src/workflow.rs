use farmops_lifecycle::{Status, Tracked};
use farmops_store::Snapshot;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts per status. Every declared status is present, zero if unused.
pub fn count_by_status<T: Tracked>(snapshot: &Snapshot<T>) -> BTreeMap<T::Status, usize> {
    let mut counts: BTreeMap<T::Status, usize> =
        <T::Status as Status>::ALL.iter().map(|&s| (s, 0)).collect();
    for entity in snapshot {
        *counts.entry(entity.status()).or_default() += 1;
    }
    counts
}

/// Entity counts keyed by status name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusTotals {
    pub total: usize,
    pub per_category: BTreeMap<String, usize>,
}

pub fn status_totals<T: Tracked>(snapshot: &Snapshot<T>) -> StatusTotals {
    StatusTotals {
        total: snapshot.len(),
        per_category: count_by_status(snapshot)
            .into_iter()
            .map(|(status, count)| (status.as_str().to_string(), count))
            .collect(),
    }
}

/// Share of entities in `of` whose status is in `hits`.
///
/// `None` when no entity is in `of`. Used for pass rates:
/// `share_in(snapshot, &[Pass], &[Pass, Fail])`.
pub fn share_in<T: Tracked>(
    snapshot: &Snapshot<T>,
    hits: &[T::Status],
    of: &[T::Status],
) -> Option<f64> {
    let (hit, total) = snapshot
        .iter()
        .map(T::status)
        .filter(|status| of.contains(status))
        .fold((0_u32, 0_u32), |(hit, total), status| {
            (hit + u32::from(hits.contains(&status)), total + 1)
        });
    (total > 0).then(|| f64::from(hit) / f64::from(total))
}
