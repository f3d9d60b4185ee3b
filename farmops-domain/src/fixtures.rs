//! Demo data for a small mixed farm with its own workshop.

use crate::FarmOps;
use crate::documents::SigningDocument;
use crate::fields::{Farmer, Field};
use crate::jobs::{JobCard, PartUse};
use crate::parts::WorkshopPart;
use crate::test_cases::TestCase;
use crate::tyres::TyreStockItem;
use farmops_lifecycle::{DocumentStatus, JobStatus, TestCaseStatus, TyreCondition};
use farmops_types::{CommandResult, EntityId};
use std::sync::Arc;

fn tyre(
    id: &str,
    brand: &str,
    size: &str,
    condition: TyreCondition,
    quantity: u64,
    reorder_level: u64,
    location: &str,
) -> TyreStockItem {
    TyreStockItem {
        id: EntityId::from(id),
        brand: brand.to_string(),
        size: size.to_string(),
        condition,
        quantity,
        reorder_level,
        location: location.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn part(
    id: &str,
    name: &str,
    part_number: &str,
    category: &str,
    quantity: u64,
    reorder_level: u64,
    location: &str,
    unit: &str,
) -> WorkshopPart {
    WorkshopPart {
        id: EntityId::from(id),
        name: name.to_string(),
        part_number: part_number.to_string(),
        category: category.to_string(),
        quantity,
        reorder_level,
        location: location.to_string(),
        unit: unit.to_string(),
    }
}

fn farmer(id: &str, name: &str, phone: &str) -> Farmer {
    Farmer {
        id: EntityId::from(id),
        name: name.to_string(),
        phone: phone.to_string(),
    }
}

fn field(id: &str, name: &str, farmer_id: &str, area_hectares: f64, crop: Option<&str>) -> Field {
    Field {
        id: EntityId::from(id),
        name: name.to_string(),
        farmer_id: EntityId::from(farmer_id),
        area_hectares,
        crop: crop.map(str::to_string),
    }
}

pub(crate) fn load(ops: &mut FarmOps) -> CommandResult<()> {
    let clock = Arc::clone(&ops.services().clock);

    for item in [
        tyre("TY-001", "Michelin", "650/65R42", TyreCondition::New, 4, 2, "Tyre bay"),
        tyre("TY-002", "Michelin", "540/65R30", TyreCondition::New, 2, 2, "Tyre bay"),
        tyre("TY-003", "Trelleborg", "710/70R38", TyreCondition::PartWorn, 3, 0, "Yard"),
        tyre("TY-004", "BKT", "11.5/80-15.3", TyreCondition::New, 6, 4, "Trailer shed"),
        tyre("TY-005", "Firestone", "480/70R28", TyreCondition::Scrap, 2, 0, "Scrap pile"),
    ] {
        ops.tyres_mut().insert(item)?;
    }

    for item in [
        part("WP-001", "Engine oil filter", "RE504836", "filters", 12, 4, "Shelf A1", "each"),
        part("WP-002", "Hydraulic oil 15W-30", "HY-GARD-20", "fluids", 60, 40, "Oil store", "litre"),
        part("WP-003", "Fan belt", "AL160771", "belts", 1, 2, "Shelf B3", "each"),
        part("WP-004", "Grease cartridge", "TY24416", "lubricants", 24, 10, "Shelf A4", "each"),
        part("WP-005", "Hydraulic hose 1/2in", "HH-08-100", "hydraulics", 15, 5, "Hose reel", "metre"),
    ] {
        ops.parts_mut().insert(item)?;
    }

    let now = clock.now();
    let mut signed = SigningDocument::pending("DOC-002", "Pesticide application record - Top Field");
    signed.status = DocumentStatus::Signed;
    signed.signer = Some("A. Farmer".to_string());
    signed.signed_at = Some(now);
    for mut document in [
        SigningDocument::pending("DOC-001", "Seasonal worker induction checklist"),
        signed,
        SigningDocument::pending("DOC-003", "Grain passport - harvest load 14"),
    ] {
        document.created_at = now;
        document.last_updated = now;
        ops.documents_mut().restore(document)?;
    }

    for (id, title, status, steps) in [
        (
            "TC-001",
            "Sprayer boom section shut-off",
            TestCaseStatus::Pass,
            vec!["Fill with clean water", "Run at 8 km/h", "Toggle each section"],
        ),
        (
            "TC-002",
            "Baler knotter function",
            TestCaseStatus::Active,
            vec!["Load twine", "Bale 10 m of straw", "Inspect every knot"],
        ),
        (
            "TC-003",
            "Trailer brake balance",
            TestCaseStatus::Fail,
            vec!["Couple to tractor", "Brake at 25 km/h", "Check for pull"],
        ),
        ("TC-004", "Drill seed rate calibration", TestCaseStatus::Draft, vec![]),
    ] {
        let mut test_case = TestCase::draft(id, title).with_steps(steps);
        test_case.status = status;
        test_case.created_at = now;
        test_case.last_updated = now;
        ops.test_cases_mut().restore(test_case)?;
    }

    let mut service = JobCard::open("JC-001", "500 hour service", "Tractor 6155R");
    service.status = JobStatus::InProgress;
    service.parts_used.push(PartUse {
        part_id: EntityId::from("WP-001"),
        quantity: 1,
    });
    service.notes.push("Oil drained, filter changed".to_string());
    let mut hose = JobCard::open("JC-002", "Replace burst loader hose", "Telehandler TH-2");
    hose.status = JobStatus::Closed;
    for mut job in [
        service,
        hose,
        JobCard::open("JC-003", "Grain trailer lights", "Trailer GT-14"),
    ] {
        job.created_at = now;
        job.last_updated = now;
        ops.jobs_mut().restore(job)?;
    }

    let registry = ops.fields_mut();
    registry.insert_farmer(farmer("FM-001", "Hill Farm Partnership", "01632 960111"))?;
    registry.insert_farmer(farmer("FM-002", "Brook Lane Contracting", "01632 960482"))?;
    registry.insert_field(field("FD-001", "Top Field", "FM-001", 12.4, Some("winter wheat")))?;
    registry.insert_field(field("FD-002", "Long Meadow", "FM-001", 8.1, Some("grass")))?;
    registry.insert_field(field("FD-003", "Church Piece", "FM-002", 5.5, Some("spring barley")))?;
    registry.insert_field(field("FD-004", "Bottom Ground", "FM-002", 3.0, None))?;

    Ok(())
}
