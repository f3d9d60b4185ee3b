//! Script runner and report for the `farmops` binary.
//!
//! A script is a JSON array of commands, each an object tagged by `cmd`:
//!
//! ```json
//! [
//!   {"cmd": "add_part", "name": "Oil filter", "category": "filters", "quantity": 10, "location": "A1"},
//!   {"cmd": "open_job", "title": "500 hour service", "vehicle": "6155R"},
//!   {"cmd": "issue_part", "job_id": "JC-001", "part_id": "WP-001", "quantity": 1}
//! ]
//! ```
//!
//! Commands run in order. A failing command is reported and the script
//! carries on; every command is all-or-nothing, so a failure leaves
//! nothing half-applied.

mod sink;

pub use sink::JsonLinesSink;

use anyhow::{Context, Result};
use farmops_domain::{
    FarmOps, NewField, NewPart, NewTyre, TestCaseStatus, TyreCondition,
};
use farmops_types::{CommandError, CommandResult, EntityId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::Path;
use tracing::{debug, warn};

/// Stock collections addressable by quantity commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockCollection {
    Tyres,
    Parts,
}

/// Every collection addressable by `update` and `remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Tyres,
    Parts,
    Documents,
    TestCases,
    Jobs,
    Farmers,
    Fields,
}

/// One scripted command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ScriptCommand {
    AddTyre(NewTyre),
    AddPart(NewPart),
    Receive {
        collection: StockCollection,
        id: EntityId,
        amount: i64,
    },
    Consume {
        collection: StockCollection,
        id: EntityId,
        amount: i64,
    },
    Adjust {
        collection: StockCollection,
        id: EntityId,
        delta: i64,
    },
    Reclassify {
        id: EntityId,
        condition: TyreCondition,
    },
    AddDocument {
        title: String,
    },
    Sign {
        id: EntityId,
        signer: String,
    },
    AddTestCase {
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        steps: Vec<String>,
    },
    Activate {
        id: EntityId,
    },
    RecordResult {
        id: EntityId,
        passed: bool,
    },
    Rerun {
        id: EntityId,
    },
    OpenJob {
        title: String,
        #[serde(default)]
        vehicle: String,
    },
    StartJob {
        id: EntityId,
    },
    CloseJob {
        id: EntityId,
    },
    Note {
        id: EntityId,
        text: String,
    },
    IssuePart {
        job_id: EntityId,
        part_id: EntityId,
        quantity: i64,
    },
    AddFarmer {
        name: String,
        #[serde(default)]
        phone: String,
    },
    AddField(NewField),
    RemoveFarmer {
        id: EntityId,
    },
    Update {
        collection: Collection,
        id: EntityId,
        patch: Value,
    },
    Remove {
        collection: Collection,
        id: EntityId,
    },
}

/// Result of one script step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub step: usize,
    pub ok: bool,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub result: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepError {
    /// Stable label, e.g. `insufficient_stock`.
    pub kind: String,
    pub message: String,
}

impl From<&CommandError> for StepError {
    fn from(err: &CommandError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

pub fn parse_script(json: &str) -> Result<Vec<ScriptCommand>> {
    serde_json::from_str(json).context("script must be a JSON array of commands")
}

pub fn load_script(path: &Path) -> Result<Vec<ScriptCommand>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script {}", path.display()))?;
    parse_script(&json).with_context(|| format!("invalid script {}", path.display()))
}

/// Runs every command in order and reports each step.
pub fn run_script(ops: &mut FarmOps, commands: Vec<ScriptCommand>) -> Vec<Outcome> {
    commands
        .into_iter()
        .enumerate()
        .map(|(step, command)| match execute(ops, command) {
            Ok(result) => {
                debug!(step, "step applied");
                Outcome { step, ok: true, result, error: None }
            }
            Err(err) => {
                warn!(step, kind = %err.kind(), "step failed: {err}");
                Outcome {
                    step,
                    ok: false,
                    result: Value::Null,
                    error: Some(StepError::from(&err)),
                }
            }
        })
        .collect()
}

fn created(id: EntityId) -> Value {
    json!({ "id": id })
}

fn execute(ops: &mut FarmOps, command: ScriptCommand) -> CommandResult<Value> {
    use ScriptCommand as C;

    Ok(match command {
        C::AddTyre(tyre) => created(ops.tyres_mut().add_tyre(tyre)?),
        C::AddPart(part) => created(ops.parts_mut().add_part(part)?),
        C::Receive { collection, id, amount } => {
            quantity_of(ops, collection, id.as_str(), |ops| match collection {
                StockCollection::Tyres => ops.tyres_mut().receive(id.as_str(), amount).map(drop),
                StockCollection::Parts => ops.parts_mut().receive(id.as_str(), amount).map(drop),
            })?
        }
        C::Consume { collection, id, amount } => {
            quantity_of(ops, collection, id.as_str(), |ops| match collection {
                StockCollection::Tyres => ops.tyres_mut().consume(id.as_str(), amount).map(drop),
                StockCollection::Parts => ops.parts_mut().consume(id.as_str(), amount).map(drop),
            })?
        }
        C::Adjust { collection, id, delta } => {
            quantity_of(ops, collection, id.as_str(), |ops| match collection {
                StockCollection::Tyres => ops.tyres_mut().adjust(id.as_str(), delta).map(drop),
                StockCollection::Parts => ops.parts_mut().adjust(id.as_str(), delta).map(drop),
            })?
        }
        C::Reclassify { id, condition } => {
            ops.tyres_mut().reclassify(id.as_str(), condition)?;
            json!({ "id": id, "condition": condition })
        }
        C::AddDocument { title } => created(ops.documents_mut().add_document(title)?),
        C::Sign { id, signer } => {
            ops.documents_mut().sign(id.as_str(), signer)?;
            json!({ "id": id, "status": "signed" })
        }
        C::AddTestCase { title, description, steps } => {
            created(ops.test_cases_mut().add_test_case(title, description, steps)?)
        }
        C::Activate { id } => {
            ops.test_cases_mut().activate(id.as_str())?;
            json!({ "id": id, "status": TestCaseStatus::Active })
        }
        C::RecordResult { id, passed } => {
            ops.test_cases_mut().record_result(id.as_str(), passed)?;
            json!({ "id": id, "passed": passed })
        }
        C::Rerun { id } => {
            ops.test_cases_mut().rerun(id.as_str())?;
            json!({ "id": id, "status": TestCaseStatus::Active })
        }
        C::OpenJob { title, vehicle } => created(ops.jobs_mut().open_job(title, vehicle)?),
        C::StartJob { id } => {
            ops.jobs_mut().start(id.as_str())?;
            json!({ "id": id, "status": "in_progress" })
        }
        C::CloseJob { id } => {
            ops.jobs_mut().close(id.as_str())?;
            json!({ "id": id, "status": "closed" })
        }
        C::Note { id, text } => {
            ops.jobs_mut().note(id.as_str(), text)?;
            json!({ "id": id })
        }
        C::IssuePart { job_id, part_id, quantity } => {
            let taken = ops.issue_part(job_id.as_str(), part_id.as_str(), quantity)?;
            json!({ "job_id": job_id, "part_id": part_id, "taken": taken })
        }
        C::AddFarmer { name, phone } => created(ops.fields_mut().add_farmer(name, phone)?),
        C::AddField(field) => created(ops.fields_mut().add_field(field)?),
        C::RemoveFarmer { id } => {
            let removed_fields = ops.fields_mut().remove_farmer(id.as_str())?;
            json!({ "id": id, "removed_fields": removed_fields })
        }
        C::Update { collection, id, patch } => {
            update(ops, collection, id.as_str(), &patch)?;
            json!({ "id": id })
        }
        C::Remove { collection, id } => {
            remove(ops, collection, id.as_str())?;
            json!({ "id": id })
        }
    })
}

/// Applies a quantity command and reports the resulting quantity.
fn quantity_of(
    ops: &mut FarmOps,
    collection: StockCollection,
    id: &str,
    apply: impl FnOnce(&mut FarmOps) -> CommandResult<()>,
) -> CommandResult<Value> {
    apply(ops)?;
    let quantity = match collection {
        StockCollection::Tyres => ops.tyres().get(id).map(|t| t.quantity),
        StockCollection::Parts => ops.parts().get(id).map(|p| p.quantity),
    };
    Ok(json!({ "id": id, "quantity": quantity }))
}

fn update(ops: &mut FarmOps, collection: Collection, id: &str, patch: &Value) -> CommandResult<()> {
    match collection {
        Collection::Tyres => ops.tyres_mut().update(id, patch).map(drop),
        Collection::Parts => ops.parts_mut().update(id, patch).map(drop),
        Collection::Documents => ops.documents_mut().update(id, patch).map(drop),
        Collection::TestCases => ops.test_cases_mut().update(id, patch).map(drop),
        Collection::Jobs => ops.jobs_mut().update(id, patch).map(drop),
        Collection::Farmers => ops.fields_mut().update_farmer(id, patch).map(drop),
        Collection::Fields => ops.fields_mut().update_field(id, patch).map(drop),
    }
}

fn remove(ops: &mut FarmOps, collection: Collection, id: &str) -> CommandResult<()> {
    match collection {
        Collection::Tyres => ops.tyres_mut().remove(id).map(drop),
        Collection::Parts => ops.parts_mut().remove(id).map(drop),
        Collection::Documents => ops.documents_mut().remove(id).map(drop),
        Collection::TestCases => ops.test_cases_mut().remove(id).map(drop),
        Collection::Jobs => ops.jobs_mut().remove(id).map(drop),
        Collection::Farmers => ops.fields_mut().remove_farmer(id).map(drop),
        Collection::Fields => ops.fields_mut().remove_field(id).map(drop),
    }
}

fn ids<'a>(ids: impl IntoIterator<Item = &'a EntityId>) -> Vec<&'a str> {
    ids.into_iter().map(EntityId::as_str).collect()
}

/// Dashboard summary of every collection.
pub fn report(ops: &FarmOps) -> Value {
    let tyres_low = ops.tyres().low_stock();
    let parts_low = ops.parts().low_stock();
    let fields = ops.fields();

    json!({
        "tyres": {
            "totals": ops.tyres().totals(),
            "low_stock": ids(tyres_low.iter().map(|t| &t.id)),
        },
        "parts": {
            "totals": ops.parts().totals(),
            "low_stock": ids(parts_low.iter().map(|p| &p.id)),
            "consumed": farmops_view::consumption_by_item(ops.parts().ledger().audit()),
        },
        "documents": farmops_view::status_totals(&ops.documents().snapshot()),
        "test_cases": {
            "status": farmops_view::status_totals(&ops.test_cases().snapshot()),
            "pass_rate": ops.test_cases().pass_rate(),
        },
        "jobs": farmops_view::status_totals(&ops.jobs().snapshot()),
        "fields": {
            "farmers": fields.farmers().len(),
            "fields": fields.fields().len(),
            "total_area_hectares": fields.total_area(),
        },
        "pending_changes": ops.pending_changes(),
    })
}
