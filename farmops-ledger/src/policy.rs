use serde::{Deserialize, Serialize};

/// What `consume` and `adjust` do when asked for more than is in stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverdraftPolicy {
    /// Fail with `InsufficientStock` and leave the quantity unchanged.
    #[default]
    Reject,
    /// Take whatever is available, stopping at zero. The audit record is
    /// marked `clamped`.
    Clamp,
}
