use crate::config::FarmOpsConfig;
use crate::documents::Documents;
use crate::fields::FieldRegistry;
use crate::fixtures;
use crate::jobs::JobCards;
use crate::parts::WorkshopParts;
use crate::sink::{CommitSink, FlushReport};
use crate::test_cases::TestCases;
use crate::tyres::TyreStock;
use farmops_store::Outbox;
use farmops_types::{CommandResult, EntityId, Services};
use tracing::{debug, info, warn};

/// Everything one farm's screens work against.
///
/// Owns one of each façade. Build it once and pass it (or a
/// [`Shared`](farmops_store::Shared) wrapping it) to whatever needs it.
pub struct FarmOps {
    services: Services,
    tyres: TyreStock,
    parts: WorkshopParts,
    documents: Documents,
    test_cases: TestCases,
    jobs: JobCards,
    fields: FieldRegistry,
}

impl FarmOps {
    /// Creates empty collections.
    pub fn new(config: &FarmOpsConfig, services: Services) -> Self {
        let mut tyres = TyreStock::new(services.clone(), config.overdraft_policy);
        tyres.set_actor(config.actor.as_str());
        let mut parts = WorkshopParts::new(services.clone(), config.overdraft_policy);
        parts.set_actor(config.actor.as_str());
        let mut documents = Documents::new(services.clone());
        documents.set_actor(config.actor.as_str());

        info!(
            actor = %config.actor,
            policy = ?config.overdraft_policy,
            "farm operations context created"
        );

        Self {
            test_cases: TestCases::new(services.clone()),
            jobs: JobCards::new(services.clone()),
            fields: FieldRegistry::new(services.clone()),
            tyres,
            parts,
            documents,
            services,
        }
    }

    /// Creates collections pre-filled with demo data.
    pub fn seeded(config: &FarmOpsConfig, services: Services) -> CommandResult<Self> {
        let mut ops = Self::new(config, services);
        fixtures::load(&mut ops)?;
        info!(pending = ops.pending_changes(), "fixtures loaded");
        Ok(ops)
    }

    /// Builds services from the config and seeds if it asks for fixtures.
    pub fn from_config(config: &FarmOpsConfig) -> CommandResult<Self> {
        let services = config.services();
        if config.seed_fixtures {
            Self::seeded(config, services)
        } else {
            Ok(Self::new(config, services))
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn tyres(&self) -> &TyreStock {
        &self.tyres
    }

    pub fn tyres_mut(&mut self) -> &mut TyreStock {
        &mut self.tyres
    }

    pub fn parts(&self) -> &WorkshopParts {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut WorkshopParts {
        &mut self.parts
    }

    pub fn documents(&self) -> &Documents {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut Documents {
        &mut self.documents
    }

    pub fn test_cases(&self) -> &TestCases {
        &self.test_cases
    }

    pub fn test_cases_mut(&mut self) -> &mut TestCases {
        &mut self.test_cases
    }

    pub fn jobs(&self) -> &JobCards {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut JobCards {
        &mut self.jobs
    }

    pub fn fields(&self) -> &FieldRegistry {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldRegistry {
        &mut self.fields
    }

    /// Takes `quantity` of a workshop part and books it on an open job.
    ///
    /// Returns the quantity actually taken, which under the clamp policy
    /// can be less than requested. A closed or unknown job fails before
    /// any stock moves.
    pub fn issue_part(&mut self, job_id: &str, part_id: &str, quantity: i64) -> CommandResult<u64> {
        self.jobs.ensure_writable(job_id)?;
        self.parts.consume(part_id, quantity)?;

        let taken = self
            .parts
            .ledger()
            .audit_for(part_id)
            .last()
            .map_or(0, |record| record.delta.unsigned_abs());
        if taken > 0 {
            self.jobs.record_part(job_id, &EntityId::from(part_id), taken)?;
        }
        debug!(job = job_id, part = part_id, requested = quantity, taken, "part issued");
        Ok(taken)
    }

    /// Changes waiting across all collections.
    pub fn pending_changes(&self) -> usize {
        self.tyres.pending_changes()
            + self.parts.pending_changes()
            + self.documents.pending_changes()
            + self.test_cases.pending_changes()
            + self.jobs.pending_changes()
            + self.fields.pending_changes()
    }

    /// Submits queued changes to `sink`, collection by collection.
    ///
    /// Within a collection submission stops at the first failure; that
    /// change and everything after it stay queued for the next flush.
    /// Local state is never rolled back.
    pub async fn flush(&mut self, sink: &dyn CommitSink) -> FlushReport {
        let mut report = FlushReport::default();
        flush_outbox(&mut self.tyres, sink, &mut report).await;
        flush_outbox(&mut self.parts, sink, &mut report).await;
        flush_outbox(&mut self.documents, sink, &mut report).await;
        flush_outbox(&mut self.test_cases, sink, &mut report).await;
        flush_outbox(&mut self.jobs, sink, &mut report).await;
        flush_outbox(&mut self.fields, sink, &mut report).await;
        info!(
            submitted = report.submitted,
            failed = report.failures.len(),
            requeued = report.requeued,
            "flush finished"
        );
        report
    }
}

async fn flush_outbox(
    outbox: &mut (dyn Outbox + Send),
    sink: &dyn CommitSink,
    report: &mut FlushReport,
) {
    let mut changes = outbox.drain_changes().into_iter();
    while let Some(change) = changes.next() {
        match sink.submit(&change).await {
            Ok(()) => report.submitted += 1,
            Err(err) => {
                warn!(
                    change = ?change.id,
                    kind = %change.entity_kind,
                    id = %change.entity_id,
                    error = %err,
                    "sink refused change; requeueing"
                );
                report.failures.push((change.id, err));
                let rest: Vec<_> = std::iter::once(change).chain(changes).collect();
                report.requeued += rest.len();
                outbox.requeue_changes(rest);
                return;
            }
        }
    }
}
