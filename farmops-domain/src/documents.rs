use farmops_lifecycle::{DocumentStatus, Lifecycle, Tracked};
use farmops_store::{Outbox, Record, Snapshot};
use farmops_types::{Change, Clock, CommandResult, EntityId, Services, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A document awaiting (or bearing) a signature.
///
/// The signature image itself is captured and stored outside the core;
/// only who signed and when are tracked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningDocument {
    pub id: EntityId,
    pub title: String,
    pub status: DocumentStatus,
    #[serde(default)]
    pub signer: Option<String>,
    #[serde(default)]
    pub signed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}

impl SigningDocument {
    /// A pending document with zeroed timestamps; `create` stamps them.
    pub fn pending(id: impl Into<EntityId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: DocumentStatus::Pending,
            signer: None,
            signed_at: None,
            created_at: Timestamp::from_millis(0),
            last_updated: Timestamp::from_millis(0),
        }
    }
}

impl Record for SigningDocument {
    const KIND: &'static str = "signing_document";

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Tracked for SigningDocument {
    type Status = DocumentStatus;

    fn status(&self) -> DocumentStatus {
        self.status
    }

    fn set_status(&mut self, status: DocumentStatus) {
        self.status = status;
    }

    fn set_created(&mut self, at: Timestamp) {
        self.created_at = at;
        self.last_updated = at;
    }

    fn touch(&mut self, at: Timestamp) {
        self.last_updated = at;
    }
}

/// Documents awaiting signature.
pub struct Documents {
    lifecycle: Lifecycle<SigningDocument>,
    clock: Arc<dyn Clock>,
    actor: String,
}

impl Documents {
    pub fn new(services: Services) -> Self {
        let clock = Arc::clone(&services.clock);
        let mut lifecycle = Lifecycle::with_services(services);
        lifecycle.protect("signer");
        lifecycle.protect("signed_at");
        Self {
            lifecycle,
            clock,
            actor: "system".to_string(),
        }
    }

    /// Signer recorded when a document is moved to signed without an
    /// explicit [`sign`](Self::sign).
    pub fn set_actor(&mut self, actor: impl Into<String>) {
        self.actor = actor.into();
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn lifecycle(&self) -> &Lifecycle<SigningDocument> {
        &self.lifecycle
    }

    pub fn get(&self, id: &str) -> Option<&SigningDocument> {
        self.lifecycle.get(id)
    }

    pub fn list(&self) -> &[SigningDocument] {
        self.lifecycle.list()
    }

    pub fn snapshot(&self) -> Snapshot<SigningDocument> {
        self.lifecycle.snapshot()
    }

    /// Adds a pending document under a generated id.
    pub fn add_document(&mut self, title: impl Into<String>) -> CommandResult<EntityId> {
        let title = title.into();
        let (id, _) = self
            .lifecycle
            .create_with(|id| SigningDocument::pending(id, title))?;
        Ok(id)
    }

    /// Adds a document with a caller-chosen id in the pending status.
    pub fn create(&mut self, document: SigningDocument) -> CommandResult<Snapshot<SigningDocument>> {
        self.lifecycle.create(document)
    }

    /// Loads a document in whatever status it carries.
    pub fn restore(&mut self, document: SigningDocument) -> CommandResult<Snapshot<SigningDocument>> {
        self.lifecycle.restore(document)
    }

    pub fn update(&mut self, id: &str, patch: &Value) -> CommandResult<Snapshot<SigningDocument>> {
        self.lifecycle.update(id, patch)
    }

    pub fn remove(&mut self, id: &str) -> CommandResult<Snapshot<SigningDocument>> {
        self.lifecycle.remove(id)
    }

    /// Moves the document to `target`. Reaching signed goes through
    /// [`sign`](Self::sign) with the current actor.
    pub fn transition(
        &mut self,
        id: &str,
        target: DocumentStatus,
    ) -> CommandResult<Snapshot<SigningDocument>> {
        match target {
            DocumentStatus::Signed => {
                let actor = self.actor.clone();
                self.sign(id, actor)
            }
            DocumentStatus::Pending => self.lifecycle.transition(id, target),
        }
    }

    /// Marks the document signed by `signer`. Signed documents are final.
    pub fn sign(
        &mut self,
        id: &str,
        signer: impl Into<String>,
    ) -> CommandResult<Snapshot<SigningDocument>> {
        let signer = signer.into();
        let at = self.clock.now();
        self.lifecycle
            .transition_with(id, DocumentStatus::Signed, |document| {
                document.signer = Some(signer);
                document.signed_at = Some(at);
                Ok(())
            })
    }

    /// Documents still waiting for a signature, in insertion order.
    pub fn pending(&self) -> Vec<SigningDocument> {
        self.lifecycle
            .list()
            .iter()
            .filter(|document| document.status == DocumentStatus::Pending)
            .cloned()
            .collect()
    }

    pub fn count_by_status(&self) -> BTreeMap<DocumentStatus, usize> {
        farmops_view::count_by_status(&self.lifecycle.snapshot())
    }
}

impl Outbox for Documents {
    fn drain_changes(&mut self) -> Vec<Change> {
        self.lifecycle.drain_changes()
    }

    fn requeue_changes(&mut self, changes: Vec<Change>) {
        self.lifecycle.requeue_changes(changes);
    }

    fn pending_changes(&self) -> usize {
        self.lifecycle.pending_changes()
    }
}
