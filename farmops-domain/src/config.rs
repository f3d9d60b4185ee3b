use farmops_ledger::OverdraftPolicy;
use farmops_types::{Clock, IdGenerator, ManualClock, SequentialIds, Services, SystemClock, UuidIds};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Runtime settings for a [`FarmOps`](crate::FarmOps) context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FarmOpsConfig {
    /// Name written on audit records.
    pub actor: String,
    pub overdraft_policy: OverdraftPolicy,
    /// Load demo data on start.
    pub seed_fixtures: bool,
    /// When set, ids are `<prefix>-1`, `<prefix>-2`, ... instead of UUID v7.
    pub id_prefix: Option<String>,
    /// When set, the clock starts at this instant (ms) and advances by one
    /// millisecond per read.
    pub fixed_clock_ms: Option<i64>,
    /// Queue a change record per commit for [`FarmOps::flush`](crate::FarmOps::flush).
    /// Leave off when nothing drains the queue.
    pub record_changes: bool,
}

impl Default for FarmOpsConfig {
    fn default() -> Self {
        Self {
            actor: "system".to_string(),
            overdraft_policy: OverdraftPolicy::default(),
            seed_fixtures: false,
            id_prefix: None,
            fixed_clock_ms: None,
            record_changes: false,
        }
    }
}

impl FarmOpsConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Builds the id generator, clock and change log this config asks for.
    pub fn services(&self) -> Services {
        let ids: Arc<dyn IdGenerator> = match &self.id_prefix {
            Some(prefix) => Arc::new(SequentialIds::new(prefix.as_str())),
            None => Arc::new(UuidIds),
        };
        let clock: Arc<dyn Clock> = match self.fixed_clock_ms {
            Some(start) => Arc::new(ManualClock::new(start, 1)),
            None => Arc::new(SystemClock),
        };
        let services = Services::new(ids, clock);
        if self.record_changes {
            services.with_change_log()
        } else {
            services
        }
    }
}
