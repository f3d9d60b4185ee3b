use farmops_lifecycle::{JobStatus, Lifecycle, Status, Tracked};
use farmops_store::{Outbox, Record, Snapshot};
use farmops_types::{Change, CommandError, CommandResult, EntityId, Services, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A quantity of one workshop part booked against a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartUse {
    pub part_id: EntityId,
    pub quantity: u64,
}

/// A workshop or transport job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobCard {
    pub id: EntityId,
    pub title: String,
    /// Registration or fleet number of the machine being worked on.
    #[serde(default)]
    pub vehicle: String,
    pub status: JobStatus,
    #[serde(default)]
    pub parts_used: Vec<PartUse>,
    #[serde(default)]
    pub notes: Vec<String>,
    pub created_at: Timestamp,
    pub last_updated: Timestamp,
}

impl JobCard {
    pub fn open(id: impl Into<EntityId>, title: impl Into<String>, vehicle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            vehicle: vehicle.into(),
            status: JobStatus::Open,
            parts_used: Vec::new(),
            notes: Vec::new(),
            created_at: Timestamp::from_millis(0),
            last_updated: Timestamp::from_millis(0),
        }
    }

    /// Total units booked for `part_id`.
    pub fn quantity_of(&self, part_id: &str) -> u64 {
        self.parts_used
            .iter()
            .filter(|used| used.part_id.as_str() == part_id)
            .map(|used| used.quantity)
            .sum()
    }
}

impl Record for JobCard {
    const KIND: &'static str = "job_card";

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Tracked for JobCard {
    type Status = JobStatus;

    fn status(&self) -> JobStatus {
        self.status
    }

    fn set_status(&mut self, status: JobStatus) {
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

/// Job cards: open → in_progress → closed.
pub struct JobCards {
    lifecycle: Lifecycle<JobCard>,
}

impl JobCards {
    pub fn new(services: Services) -> Self {
        let mut lifecycle = Lifecycle::with_services(services);
        lifecycle.protect("parts_used");
        Self { lifecycle }
    }

    pub fn lifecycle(&self) -> &Lifecycle<JobCard> {
        &self.lifecycle
    }

    pub fn get(&self, id: &str) -> Option<&JobCard> {
        self.lifecycle.get(id)
    }

    pub fn list(&self) -> &[JobCard] {
        self.lifecycle.list()
    }

    pub fn snapshot(&self) -> Snapshot<JobCard> {
        self.lifecycle.snapshot()
    }

    pub fn open_job(
        &mut self,
        title: impl Into<String>,
        vehicle: impl Into<String>,
    ) -> CommandResult<EntityId> {
        let (title, vehicle) = (title.into(), vehicle.into());
        let (id, _) = self
            .lifecycle
            .create_with(|id| JobCard::open(id, title, vehicle))?;
        Ok(id)
    }

    pub fn create(&mut self, job: JobCard) -> CommandResult<Snapshot<JobCard>> {
        self.lifecycle.create(job)
    }

    pub fn restore(&mut self, job: JobCard) -> CommandResult<Snapshot<JobCard>> {
        self.lifecycle.restore(job)
    }

    pub fn update(&mut self, id: &str, patch: &Value) -> CommandResult<Snapshot<JobCard>> {
        self.lifecycle.update(id, patch)
    }

    pub fn remove(&mut self, id: &str) -> CommandResult<Snapshot<JobCard>> {
        self.lifecycle.remove(id)
    }

    pub fn transition(&mut self, id: &str, target: JobStatus) -> CommandResult<Snapshot<JobCard>> {
        self.lifecycle.transition(id, target)
    }

    pub fn start(&mut self, id: &str) -> CommandResult<Snapshot<JobCard>> {
        self.lifecycle.transition(id, JobStatus::InProgress)
    }

    pub fn close(&mut self, id: &str) -> CommandResult<Snapshot<JobCard>> {
        self.lifecycle.transition(id, JobStatus::Closed)
    }

    /// Appends a note. Closed jobs are read-only.
    pub fn note(&mut self, id: &str, text: impl Into<String>) -> CommandResult<Snapshot<JobCard>> {
        let text = text.into();
        let (_, snapshot) = self.lifecycle.modify_details(id, |job| {
            ensure_open(job)?;
            job.notes.push(text);
            Ok(())
        })?;
        Ok(snapshot)
    }

    /// Books `quantity` units of a part against the job. Repeat bookings of
    /// the same part are merged.
    pub fn record_part(
        &mut self,
        id: &str,
        part_id: &EntityId,
        quantity: u64,
    ) -> CommandResult<Snapshot<JobCard>> {
        let (_, snapshot) = self.lifecycle.modify_details(id, |job| {
            ensure_open(job)?;
            match job.parts_used.iter_mut().find(|used| &used.part_id == part_id) {
                Some(used) => used.quantity = used.quantity.saturating_add(quantity),
                None => job.parts_used.push(PartUse {
                    part_id: part_id.clone(),
                    quantity,
                }),
            }
            Ok(())
        })?;
        Ok(snapshot)
    }

    /// Fails with `NotFound` or `Locked` unless the job accepts changes.
    pub fn ensure_writable(&self, id: &str) -> CommandResult<&JobCard> {
        let job = self.lifecycle.get(id).ok_or_else(|| CommandError::NotFound {
            kind: JobCard::KIND,
            id: EntityId::from(id),
        })?;
        ensure_open(job)?;
        Ok(job)
    }

    pub fn count_by_status(&self) -> BTreeMap<JobStatus, usize> {
        farmops_view::count_by_status(&self.lifecycle.snapshot())
    }
}

fn ensure_open(job: &JobCard) -> CommandResult<()> {
    if job.status.is_terminal() {
        return Err(CommandError::Locked {
            kind: JobCard::KIND,
            id: job.id.clone(),
            status: job.status.as_str().to_string(),
        });
    }
    Ok(())
}

impl Outbox for JobCards {
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
