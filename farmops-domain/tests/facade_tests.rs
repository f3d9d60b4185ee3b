use farmops_domain::{
    DocumentStatus, Documents, FieldRegistry, JobCard, JobCards, JobStatus, NewField, NewPart,
    NewTyre, OverdraftPolicy, PartUse, SigningDocument, TestCase, TestCaseStatus, TestCases,
    TyreCondition, TyreStock, WorkshopParts,
};
use farmops_store::Outbox;
use farmops_types::{CommandError, EntityId, ErrorKind, ManualClock, SequentialIds, Services};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn services() -> Services {
    Services::deterministic("farm").with_change_log()
}

fn new_tyre(size: &str, quantity: u64, reorder_level: u64) -> NewTyre {
    NewTyre {
        brand: "Michelin".into(),
        size: size.into(),
        condition: TyreCondition::New,
        quantity,
        reorder_level,
        location: "Tyre bay".into(),
    }
}

fn new_part(name: &str, category: &str, quantity: u64, reorder_level: u64) -> NewPart {
    NewPart {
        name: name.into(),
        part_number: String::new(),
        category: category.into(),
        quantity,
        reorder_level,
        location: "Shelf A1".into(),
        unit: "each".into(),
    }
}

// ── Tyres ────────────────────────────────────────────────────────

#[test]
fn add_tyre_generates_ids_and_audits_opening_stock() {
    let mut tyres = TyreStock::new(services(), OverdraftPolicy::Reject);
    let a = tyres.add_tyre(new_tyre("650/65R42", 4, 2)).unwrap();
    let b = tyres.add_tyre(new_tyre("540/65R30", 0, 1)).unwrap();

    assert_eq!(a, EntityId::new("farm-1"));
    assert_eq!(b, EntityId::new("farm-2"));
    assert_eq!(tyres.list().len(), 2);
    assert_eq!(tyres.ledger().audit_for("farm-1").len(), 1);
    assert!(tyres.ledger().audit_for("farm-2").is_empty());
}

#[test]
fn reclassify_follows_condition_graph() {
    let mut tyres = TyreStock::new(services(), OverdraftPolicy::Reject);
    let id = tyres.add_tyre(new_tyre("650/65R42", 4, 2)).unwrap();

    tyres.reclassify(id.as_str(), TyreCondition::PartWorn).unwrap();
    let err = tyres.reclassify(id.as_str(), TyreCondition::New).unwrap_err();
    assert_eq!(
        err,
        CommandError::InvalidTransition {
            id: id.clone(),
            from: "part_worn".into(),
            to: "new".into(),
        }
    );
    assert_eq!(tyres.get(id.as_str()).unwrap().condition, TyreCondition::PartWorn);

    tyres.reclassify(id.as_str(), TyreCondition::Scrap).unwrap();
    assert_eq!(tyres.totals().per_category.get("scrap"), Some(&1));
}

#[test]
fn tyre_condition_and_quantity_cannot_be_patched() {
    let mut tyres = TyreStock::new(services(), OverdraftPolicy::Reject);
    let id = tyres.add_tyre(new_tyre("650/65R42", 4, 2)).unwrap();

    let err = tyres.update(id.as_str(), &json!({"condition": "scrap"})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPatch);
    let err = tyres.update(id.as_str(), &json!({"quantity": 40})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPatch);

    tyres.update(id.as_str(), &json!({"location": "Yard"})).unwrap();
    let tyre = tyres.get(id.as_str()).unwrap();
    assert_eq!(tyre.location, "Yard");
    assert_eq!(tyre.quantity, 4);
}

#[test]
fn tyre_low_stock_tracks_consumption() {
    let mut tyres = TyreStock::new(services(), OverdraftPolicy::Reject);
    let id = tyres.add_tyre(new_tyre("650/65R42", 4, 2)).unwrap();
    assert!(tyres.low_stock().is_empty());

    tyres.consume(id.as_str(), 2).unwrap();
    assert_eq!(tyres.low_stock().len(), 1);

    let err = tyres.consume(id.as_str(), 3).unwrap_err();
    assert_eq!(
        err,
        CommandError::InsufficientStock { id: id.clone(), requested: 3, available: 2 }
    );
    assert_eq!(tyres.get(id.as_str()).unwrap().quantity, 2);
}

// ── Workshop parts ───────────────────────────────────────────────

#[test]
fn parts_totals_group_by_category() {
    let mut parts = WorkshopParts::new(services(), OverdraftPolicy::Reject);
    parts.add_part(new_part("Oil filter", "filters", 12, 4)).unwrap();
    parts.add_part(new_part("Air filter", "filters", 3, 4)).unwrap();
    parts.add_part(new_part("Fan belt", "belts", 1, 2)).unwrap();

    let totals = parts.totals();
    assert_eq!(totals.total, 3);
    assert_eq!(totals.total_quantity, 16);
    assert_eq!(totals.per_category.get("filters"), Some(&2));
    assert_eq!(totals.quantity_per_category.get("belts"), Some(&1));

    let low: Vec<_> = parts.low_stock().into_iter().map(|p| p.name).collect();
    assert_eq!(low, vec!["Air filter".to_string(), "Fan belt".to_string()]);
}

#[test]
fn parts_clamp_policy_marks_audit() {
    let mut parts = WorkshopParts::new(services(), OverdraftPolicy::Clamp);
    parts.set_actor("workshop");
    let id = parts.add_part(new_part("Grease", "lubricants", 3, 1)).unwrap();

    parts.consume(id.as_str(), 5).unwrap();
    assert_eq!(parts.get(id.as_str()).unwrap().quantity, 0);

    let last = parts.ledger().audit().last().unwrap();
    assert!(last.clamped);
    assert_eq!(last.delta, -3);
    assert_eq!(last.actor, "workshop");
}

#[test]
fn parts_unknown_fields_are_rejected_in_patches() {
    let mut parts = WorkshopParts::new(services(), OverdraftPolicy::Reject);
    let id = parts.add_part(new_part("Oil filter", "filters", 12, 4)).unwrap();

    let err = parts.update(id.as_str(), &json!({"colour": "red"})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPatch);
    assert_eq!(parts.snapshot().version(), 1);
}

// ── Documents ────────────────────────────────────────────────────

#[test]
fn signed_document_is_terminal() {
    let mut documents = Documents::new(services());
    documents
        .create(SigningDocument::pending("1", "Induction checklist"))
        .unwrap();

    documents.transition("1", DocumentStatus::Signed).unwrap();
    let err = documents.transition("1", DocumentStatus::Pending).unwrap_err();

    assert_eq!(
        err,
        CommandError::InvalidTransition {
            id: EntityId::new("1"),
            from: "signed".into(),
            to: "pending".into(),
        }
    );
    assert_eq!(documents.get("1").unwrap().status, DocumentStatus::Signed);
}

#[test]
fn transition_to_signed_records_the_actor() {
    let mut documents = Documents::new(services());
    let id = documents.add_document("Tenancy renewal").unwrap();
    let default_id = documents.add_document("Water licence").unwrap();

    documents.transition(default_id.as_str(), DocumentStatus::Signed).unwrap();
    documents.set_actor("Yard office");
    documents.transition(id.as_str(), DocumentStatus::Signed).unwrap();

    let signed = documents.get(default_id.as_str()).unwrap();
    assert_eq!(signed.signer.as_deref(), Some("system"));
    assert!(signed.signed_at.is_some());
    let signed = documents.get(id.as_str()).unwrap();
    assert_eq!(signed.signer.as_deref(), Some("Yard office"));
    assert!(signed.signed_at.is_some());
}

#[test]
fn sign_records_signer_and_time() {
    let mut documents = Documents::new(services());
    let id = documents.add_document("Grain passport").unwrap();

    documents.sign(id.as_str(), "A. Farmer").unwrap();

    let document = documents.get(id.as_str()).unwrap();
    assert_eq!(document.status, DocumentStatus::Signed);
    assert_eq!(document.signer.as_deref(), Some("A. Farmer"));
    assert!(document.signed_at.is_some());
    assert!(document.signed_at.unwrap() >= document.created_at);

    let err = documents.sign(id.as_str(), "B. Farmer").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(
        documents.get(id.as_str()).unwrap().signer.as_deref(),
        Some("A. Farmer")
    );
}

#[test]
fn signer_cannot_be_patched() {
    let mut documents = Documents::new(services());
    let id = documents.add_document("Spray record").unwrap();

    let err = documents
        .update(id.as_str(), &json!({"signer": "Somebody"}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPatch);
    assert_eq!(documents.get(id.as_str()).unwrap().signer, None);
}

#[test]
fn pending_lists_unsigned_documents() {
    let mut documents = Documents::new(services());
    let a = documents.add_document("A").unwrap();
    documents.add_document("B").unwrap();
    documents.sign(a.as_str(), "A. Farmer").unwrap();

    let pending: Vec<_> = documents.pending().into_iter().map(|d| d.title).collect();
    assert_eq!(pending, vec!["B".to_string()]);

    let counts = documents.count_by_status();
    assert_eq!(counts[&DocumentStatus::Pending], 1);
    assert_eq!(counts[&DocumentStatus::Signed], 1);
}

// ── Test cases ───────────────────────────────────────────────────

#[test]
fn test_case_walks_draft_active_pass() {
    let mut cases = TestCases::new(services());
    cases.create(TestCase::draft("2", "Brake balance")).unwrap();

    cases.transition("2", TestCaseStatus::Active).unwrap();
    let err = cases.transition("2", TestCaseStatus::Draft).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    cases.transition("2", TestCaseStatus::Pass).unwrap();

    assert_eq!(cases.get("2").unwrap().status, TestCaseStatus::Pass);
}

#[test]
fn rerun_only_reopens_finished_cases() {
    let mut cases = TestCases::new(services());
    let id = cases
        .add_test_case("Knotter", "Bale and inspect", vec!["Load twine".into()])
        .unwrap();

    let err = cases.rerun(id.as_str()).unwrap_err();
    assert_eq!(
        err,
        CommandError::InvalidTransition {
            id: id.clone(),
            from: "draft".into(),
            to: "active".into(),
        }
    );

    cases.activate(id.as_str()).unwrap();
    cases.record_result(id.as_str(), false).unwrap();
    assert_eq!(cases.get(id.as_str()).unwrap().status, TestCaseStatus::Fail);

    let err = cases.activate(id.as_str()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    cases.rerun(id.as_str()).unwrap();
    assert_eq!(cases.get(id.as_str()).unwrap().status, TestCaseStatus::Active);
    assert_eq!(cases.lifecycle().history_for(id.as_str()).len(), 3);
}

#[test]
fn record_result_requires_active_case() {
    let mut cases = TestCases::new(services());
    let id = cases.add_test_case("Drill calibration", "", Vec::new()).unwrap();

    let err = cases.record_result(id.as_str(), true).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    assert_eq!(cases.get(id.as_str()).unwrap().status, TestCaseStatus::Draft);
}

#[test]
fn pass_rate_counts_finished_cases_only() {
    let mut cases = TestCases::new(services());
    assert_eq!(cases.pass_rate(), None);

    let ids: Vec<_> = (0..4)
        .map(|n| cases.add_test_case(format!("case {n}"), "", Vec::new()).unwrap())
        .collect();
    for id in &ids[..3] {
        cases.activate(id.as_str()).unwrap();
    }
    cases.record_result(ids[0].as_str(), true).unwrap();
    cases.record_result(ids[1].as_str(), false).unwrap();

    assert_eq!(cases.pass_rate(), Some(0.5));
    let counts = cases.count_by_status();
    assert_eq!(counts[&TestCaseStatus::Draft], 1);
    assert_eq!(counts[&TestCaseStatus::Active], 1);
    assert_eq!(counts[&TestCaseStatus::Pass], 1);
    assert_eq!(counts[&TestCaseStatus::Fail], 1);
}

// ── Job cards ────────────────────────────────────────────────────

#[test]
fn job_moves_open_in_progress_closed() {
    let mut jobs = JobCards::new(services());
    let id = jobs.open_job("500 hour service", "Tractor 6155R").unwrap();

    let err = jobs.close(id.as_str()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTransition);

    jobs.start(id.as_str()).unwrap();
    jobs.close(id.as_str()).unwrap();
    assert_eq!(jobs.get(id.as_str()).unwrap().status, JobStatus::Closed);
}

#[test]
fn closed_job_rejects_notes_and_parts() {
    let mut jobs = JobCards::new(services());
    let id = jobs.open_job("Hose repair", "Telehandler").unwrap();
    jobs.note(id.as_str(), "Hose ordered").unwrap();
    jobs.start(id.as_str()).unwrap();
    jobs.close(id.as_str()).unwrap();

    let err = jobs.note(id.as_str(), "late note").unwrap_err();
    assert_eq!(
        err,
        CommandError::Locked { kind: "job_card", id: id.clone(), status: "closed".into() }
    );
    let err = jobs
        .record_part(id.as_str(), &EntityId::new("WP-1"), 1)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Locked);
    assert_eq!(jobs.get(id.as_str()).unwrap().notes, vec!["Hose ordered".to_string()]);
}

#[test]
fn record_part_merges_repeat_bookings() {
    let mut jobs = JobCards::new(services());
    jobs.create(JobCard::open("JC-1", "Service", "Tractor")).unwrap();
    let filter = EntityId::new("WP-1");

    jobs.record_part("JC-1", &filter, 1).unwrap();
    jobs.record_part("JC-1", &filter, 2).unwrap();
    jobs.record_part("JC-1", &EntityId::new("WP-2"), 5).unwrap();

    let job = jobs.get("JC-1").unwrap();
    assert_eq!(
        job.parts_used,
        vec![
            PartUse { part_id: filter, quantity: 3 },
            PartUse { part_id: EntityId::new("WP-2"), quantity: 5 },
        ]
    );
    assert_eq!(job.quantity_of("WP-1"), 3);
}

#[test]
fn parts_used_cannot_be_patched() {
    let mut jobs = JobCards::new(services());
    let id = jobs.open_job("Service", "Tractor").unwrap();

    let err = jobs
        .update(id.as_str(), &json!({"parts_used": [{"part_id": "x", "quantity": 1}]}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPatch);
}

// ── Fields ───────────────────────────────────────────────────────

fn new_field(name: &str, farmer_id: &EntityId, area_hectares: f64) -> NewField {
    NewField {
        name: name.into(),
        farmer_id: farmer_id.clone(),
        area_hectares,
        crop: Some("winter wheat".into()),
    }
}

#[test]
fn add_field_requires_existing_farmer() {
    let mut registry = FieldRegistry::new(services());
    let err = registry
        .add_field(new_field("Top Field", &EntityId::new("nobody"), 12.0))
        .unwrap_err();

    assert_eq!(
        err,
        CommandError::NotFound { kind: "farmer", id: EntityId::new("nobody") }
    );
    assert!(registry.fields().is_empty());
}

#[test]
fn remove_farmer_cascades_to_fields() {
    let mut registry = FieldRegistry::new(services());
    let hill = registry.add_farmer("Hill Farm", "01632 960111").unwrap();
    let brook = registry.add_farmer("Brook Lane", "01632 960482").unwrap();
    let top = registry.add_field(new_field("Top Field", &hill, 12.5)).unwrap();
    let meadow = registry.add_field(new_field("Long Meadow", &hill, 8.0)).unwrap();
    registry.add_field(new_field("Church Piece", &brook, 5.5)).unwrap();

    assert_eq!(registry.fields_of(hill.as_str()).len(), 2);
    assert_eq!(registry.total_area(), 26.0);

    let removed = registry.remove_farmer(hill.as_str()).unwrap();
    assert_eq!(removed, vec![top, meadow]);
    assert!(registry.farmer(hill.as_str()).is_none());
    assert!(registry.fields_of(hill.as_str()).is_empty());
    assert_eq!(registry.fields().len(), 1);
    assert_eq!(registry.total_area(), 5.5);
}

#[test]
fn remove_unknown_farmer_changes_nothing() {
    let mut registry = FieldRegistry::new(services());
    let hill = registry.add_farmer("Hill Farm", "").unwrap();
    registry.add_field(new_field("Top Field", &hill, 12.5)).unwrap();
    let pending = registry.pending_changes();

    let err = registry.remove_farmer("ghost").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(registry.fields().len(), 1);
    assert_eq!(registry.pending_changes(), pending);
}

#[test]
fn field_owner_moves_only_through_reassign() {
    let mut registry = FieldRegistry::new(services());
    let hill = registry.add_farmer("Hill Farm", "").unwrap();
    let brook = registry.add_farmer("Brook Lane", "").unwrap();
    let top = registry.add_field(new_field("Top Field", &hill, 12.5)).unwrap();

    let err = registry
        .update_field(top.as_str(), &json!({"farmer_id": brook.as_str()}))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPatch);

    let err = registry
        .reassign_field(top.as_str(), &EntityId::new("ghost"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    registry.reassign_field(top.as_str(), &brook).unwrap();
    assert_eq!(registry.area_of(brook.as_str()), 12.5);
    assert_eq!(registry.area_of(hill.as_str()), 0.0);
}

#[test]
fn cascade_drains_fields_before_their_farmer_under_a_frozen_clock() {
    let frozen = Services::new(
        Arc::new(SequentialIds::new("farm")),
        Arc::new(ManualClock::new(5_000, 0)),
    )
    .with_change_log();
    let mut registry = FieldRegistry::new(frozen);
    let hill = registry.add_farmer("Hill Farm", "").unwrap();
    registry.add_field(new_field("Top Field", &hill, 12.5)).unwrap();
    registry.add_field(new_field("Low Field", &hill, 4.0)).unwrap();
    registry.drain_changes();

    registry.remove_farmer(hill.as_str()).unwrap();

    let changes = registry.drain_changes();
    let kinds: Vec<_> = changes.iter().map(|c| c.entity_kind.as_str()).collect();
    assert_eq!(kinds, vec!["field", "field", "farmer"]);
    assert!(changes.iter().all(|c| c.timestamp == changes[0].timestamp));
    assert!(changes.windows(2).all(|w| w[0].sequence < w[1].sequence));
}

#[test]
fn registry_outbox_merges_and_requeues_both_stores() {
    let mut registry = FieldRegistry::new(services());
    let hill = registry.add_farmer("Hill Farm", "").unwrap();
    registry.add_field(new_field("Top Field", &hill, 12.5)).unwrap();
    registry.update_farmer(hill.as_str(), &json!({"phone": "01632 960000"})).unwrap();

    let changes = registry.drain_changes();
    let kinds: Vec<_> = changes.iter().map(|c| c.entity_kind.as_str()).collect();
    assert_eq!(kinds, vec!["farmer", "field", "farmer"]);
    assert_eq!(registry.pending_changes(), 0);

    registry.requeue_changes(changes.clone());
    assert_eq!(registry.pending_changes(), 3);
    assert_eq!(registry.drain_changes(), changes);
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn removing_a_farmer_leaves_no_orphan_fields(
        farmers in 1usize..5,
        owners in prop::collection::vec(0usize..5, 0..20),
        victim in 0usize..5,
    ) {
        let mut registry = FieldRegistry::new(services());
        let ids: Vec<EntityId> = (0..farmers)
            .map(|n| registry.add_farmer(format!("Farm {n}"), "").unwrap())
            .collect();
        for (n, owner) in owners.iter().enumerate() {
            let owner = &ids[owner % farmers];
            registry.add_field(new_field(&format!("Field {n}"), owner, 1.0)).unwrap();
        }
        let victim = ids[victim % farmers].clone();
        let owned = registry.fields_of(victim.as_str()).len();
        let total = registry.fields().len();

        let removed = registry.remove_farmer(victim.as_str()).unwrap();

        prop_assert_eq!(removed.len(), owned);
        prop_assert_eq!(registry.fields().len(), total - owned);
        prop_assert!(registry.farmer(victim.as_str()).is_none());
        for field in registry.fields() {
            prop_assert!(registry.farmer(field.farmer_id.as_str()).is_some());
        }
    }
}
