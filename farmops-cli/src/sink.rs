use async_trait::async_trait;
use farmops_domain::{CommitSink, SinkError};
use farmops_types::Change;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Appends each submitted change to a file as one JSON line.
pub struct JsonLinesSink {
    file: Mutex<File>,
}

impl JsonLinesSink {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl CommitSink for JsonLinesSink {
    async fn submit(&self, change: &Change) -> Result<(), SinkError> {
        let line =
            serde_json::to_string(change).map_err(|e| SinkError::Rejected(e.to_string()))?;
        let mut file = self
            .file
            .lock()
            .map_err(|_| SinkError::Unavailable("change log lock poisoned".into()))?;
        writeln!(file, "{line}").map_err(|e| SinkError::Unavailable(e.to_string()))
    }
}
