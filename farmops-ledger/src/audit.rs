use farmops_types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// One accepted quantity change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub item_id: EntityId,
    /// Signed change actually applied (after clamping).
    pub delta: i64,
    pub resulting_quantity: u64,
    pub timestamp: Timestamp,
    pub actor: String,
    /// The request asked for more than was available and was cut to zero.
    #[serde(default)]
    pub clamped: bool,
}
