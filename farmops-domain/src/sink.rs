use async_trait::async_trait;
use farmops_types::{Change, ChangeId};
use serde::Serialize;
use thiserror::Error;

/// Errors a remote boundary reports for one change.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum SinkError {
    /// The remote side refused the change; resubmitting it unchanged will
    /// fail again.
    #[error("change rejected: {0}")]
    Rejected(String),

    #[error("sink unavailable: {0}")]
    Unavailable(String),
}

/// A remote commit boundary that receives changes after they are committed
/// locally.
#[async_trait]
pub trait CommitSink: Send + Sync {
    async fn submit(&self, change: &Change) -> Result<(), SinkError>;
}

/// Outcome of one [`FarmOps::flush`](crate::FarmOps::flush).
#[derive(Debug, Default, Serialize)]
pub struct FlushReport {
    /// Changes the sink accepted.
    pub submitted: usize,
    /// The first failing change of each collection with its error.
    pub failures: Vec<(ChangeId, SinkError)>,
    /// Changes left queued for the next flush.
    pub requeued: usize,
}

impl FlushReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
