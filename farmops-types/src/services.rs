use crate::{Clock, IdGenerator, ManualClock, SequentialIds, SystemClock, UuidIds};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// External collaborators injected into every store: an id generator and a
/// clock. Cloning shares the same underlying generator, clock and commit
/// sequence.
#[derive(Clone)]
pub struct Services {
    pub ids: Arc<dyn IdGenerator>,
    pub clock: Arc<dyn Clock>,
    /// Queue a [`Change`](crate::Change) per commit for a remote boundary.
    /// Off unless a caller intends to drain the queue.
    pub record_changes: bool,
    sequence: Arc<AtomicU64>,
}

impl Services {
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self {
            ids,
            clock,
            record_changes: false,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// UUID v7 ids and the system clock.
    pub fn system() -> Self {
        Self::new(Arc::new(UuidIds), Arc::new(SystemClock))
    }

    /// Sequential ids and a manual clock ticking one millisecond per read.
    pub fn deterministic(prefix: &str) -> Self {
        Self::new(
            Arc::new(SequentialIds::new(prefix)),
            Arc::new(ManualClock::default()),
        )
    }

    /// Turns on change queuing for every store built from these services.
    #[must_use]
    pub fn with_change_log(mut self) -> Self {
        self.record_changes = true;
        self
    }

    /// Next commit number, shared by every store built from these
    /// services. Starts at 1 and never repeats.
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("record_changes", &self.record_changes)
            .finish_non_exhaustive()
    }
}
