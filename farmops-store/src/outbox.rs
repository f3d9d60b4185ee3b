use farmops_types::Change;

/// Access to committed changes awaiting submission to a remote boundary.
///
/// Submission happens after the local commit; a failed submission hands
/// the changes back with [`requeue_changes`](Outbox::requeue_changes) and
/// local state stays as committed.
pub trait Outbox {
    /// Takes all queued changes in commit order.
    fn drain_changes(&mut self) -> Vec<Change>;

    /// Puts changes back at the front of the queue, preserving their order.
    fn requeue_changes(&mut self, changes: Vec<Change>);

    /// Number of changes waiting to be drained.
    fn pending_changes(&self) -> usize;
}
