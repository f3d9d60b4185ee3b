use farmops_ledger::{MAX_QUANTITY, OverdraftPolicy, QuantityLedger, StockRecord};
use farmops_store::Record;
use farmops_types::{CommandError, EntityId, ErrorKind, Services, Timestamp};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeedBin {
    id: EntityId,
    feed: String,
    quantity: u64,
    reorder_level: u64,
    location: String,
}

impl Record for FeedBin {
    const KIND: &'static str = "feed_bin";

    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl StockRecord for FeedBin {
    fn quantity(&self) -> u64 {
        self.quantity
    }

    fn set_quantity(&mut self, quantity: u64) {
        self.quantity = quantity;
    }

    fn reorder_level(&self) -> u64 {
        self.reorder_level
    }

    fn category(&self) -> String {
        self.feed.clone()
    }

    fn location(&self) -> &str {
        &self.location
    }
}

fn bin(id: &str, quantity: u64) -> FeedBin {
    FeedBin {
        id: EntityId::new(id),
        feed: "barley".into(),
        quantity,
        reorder_level: 2,
        location: "silo".into(),
    }
}

fn ledger(policy: OverdraftPolicy) -> QuantityLedger<FeedBin> {
    QuantityLedger::with_services(Services::deterministic("bin"), policy)
}

fn quantity(l: &QuantityLedger<FeedBin>, id: &str) -> u64 {
    l.get(id).unwrap().quantity
}

// ── Scenario: consume to zero then overdraw ──────────────────────

#[test]
fn consume_to_zero_then_overdraw_is_rejected() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 4)).unwrap();

    l.consume("1", 4).unwrap();
    assert_eq!(quantity(&l, "1"), 0);

    let err = l.consume("1", 1).unwrap_err();
    assert_eq!(
        err,
        CommandError::InsufficientStock {
            id: EntityId::new("1"),
            requested: 1,
            available: 0,
        }
    );
    assert_eq!(quantity(&l, "1"), 0);
}

// ── receive ──────────────────────────────────────────────────────

#[test]
fn receive_adds_units() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 4)).unwrap();
    let snap = l.receive("1", 6).unwrap();
    assert_eq!(snap.get("1").unwrap().quantity, 10);
}

#[test]
fn receive_rejects_non_positive_amounts() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 4)).unwrap();
    for amount in [0, -3] {
        let err = l.receive("1", amount).unwrap_err();
        assert_eq!(
            err,
            CommandError::InvalidAmount {
                id: EntityId::new("1"),
                amount,
            }
        );
    }
    assert_eq!(quantity(&l, "1"), 4);
}

#[test]
fn receive_unknown_item_is_not_found() {
    let mut l = ledger(OverdraftPolicy::Reject);
    assert_eq!(l.receive("nope", 1).unwrap_err().kind(), ErrorKind::NotFound);
}

// ── consume ──────────────────────────────────────────────────────

#[test]
fn consume_rejects_non_positive_amounts() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 4)).unwrap();
    assert_eq!(l.consume("1", 0).unwrap_err().kind(), ErrorKind::InvalidAmount);
    assert_eq!(l.consume("1", -1).unwrap_err().kind(), ErrorKind::InvalidAmount);
}

#[test]
fn clamp_policy_stops_at_zero_and_flags_audit() {
    let mut l = ledger(OverdraftPolicy::Clamp);
    l.insert(bin("1", 3)).unwrap();
    l.consume("1", 5).unwrap();
    assert_eq!(quantity(&l, "1"), 0);

    let last = l.audit().last().unwrap();
    assert_eq!(last.delta, -3);
    assert_eq!(last.resulting_quantity, 0);
    assert!(last.clamped);
}

// ── adjust ───────────────────────────────────────────────────────

#[test]
fn adjust_applies_signed_delta() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 4)).unwrap();
    l.adjust("1", 3).unwrap();
    l.adjust("1", -5).unwrap();
    assert_eq!(quantity(&l, "1"), 2);
}

#[test]
fn adjust_below_zero_is_rejected() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 4)).unwrap();
    let err = l.adjust("1", -5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    assert_eq!(quantity(&l, "1"), 4);
}

#[test]
fn adjust_zero_is_invalid() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 4)).unwrap();
    assert_eq!(l.adjust("1", 0).unwrap_err().kind(), ErrorKind::InvalidAmount);
}

// ── audit ────────────────────────────────────────────────────────

#[test]
fn audit_records_each_accepted_mutation() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.set_actor("sam");
    l.insert(bin("1", 4)).unwrap();
    l.consume("1", 1).unwrap();
    let _ = l.consume("1", 10);
    l.receive("1", 2).unwrap();

    let deltas: Vec<(i64, u64)> = l
        .audit_for("1")
        .iter()
        .map(|r| (r.delta, r.resulting_quantity))
        .collect();
    assert_eq!(deltas, vec![(4, 4), (-1, 3), (2, 5)]);
    assert!(l.audit().iter().all(|r| r.actor == "sam"));
}

#[test]
fn audit_timestamps_come_from_injected_clock() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 0)).unwrap();
    l.receive("1", 1).unwrap();
    l.receive("1", 1).unwrap();
    let stamps: Vec<Timestamp> = l.audit().iter().map(|r| r.timestamp).collect();
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn empty_opening_stock_is_not_audited() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 0)).unwrap();
    assert!(l.audit().is_empty());
}

#[test]
fn insert_with_audits_opening_stock_under_generated_id() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert_with(|id| FeedBin { id, ..bin("ignored", 7) }).unwrap();
    assert_eq!(l.audit()[0].item_id.as_str(), "bin-1");
    assert_eq!(l.audit()[0].delta, 7);
}

#[test]
fn opening_stock_above_max_quantity_is_rejected() {
    let mut l = ledger(OverdraftPolicy::Reject);
    let err = l.insert(bin("1", MAX_QUANTITY + 1)).unwrap_err();
    assert_eq!(
        err,
        CommandError::InvalidAmount {
            id: EntityId::new("1"),
            amount: i64::MAX,
        }
    );
    let err = l
        .insert_with(|id| FeedBin { id, ..bin("ignored", u64::MAX) })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidAmount);
    assert!(l.list().is_empty());
    assert!(l.audit().is_empty());
}

#[test]
fn extreme_quantities_audit_exact_deltas() {
    let mut l = ledger(OverdraftPolicy::Clamp);
    l.insert(bin("1", MAX_QUANTITY)).unwrap();
    assert_eq!(l.audit()[0].delta, i64::MAX);
    assert_eq!(
        l.receive("1", 1).unwrap_err().kind(),
        ErrorKind::InvalidAmount
    );
    l.consume("1", i64::MAX).unwrap();
    l.insert(bin("2", 3)).unwrap();
    l.consume("2", i64::MAX).unwrap();
    let last = l.audit().last().unwrap();
    assert_eq!(last.delta, -3);
    assert!(last.clamped);
    assert_eq!(quantity(&l, "1"), 0);
}

#[test]
fn removing_an_item_keeps_its_audit() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 4)).unwrap();
    l.remove("1").unwrap();
    assert_eq!(l.audit_for("1").len(), 1);
    assert!(l.get("1").is_none());
}

// ── protected quantity ───────────────────────────────────────────

#[test]
fn quantity_cannot_be_patched() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 4)).unwrap();
    let err = l.update("1", &json!({"quantity": 100})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPatch);
    l.update("1", &json!({"location": "shed"})).unwrap();
    assert_eq!(l.get("1").unwrap().location, "shed");
    assert_eq!(quantity(&l, "1"), 4);
}

#[test]
fn modify_details_rejects_quantity_change() {
    let mut l = ledger(OverdraftPolicy::Reject);
    l.insert(bin("1", 4)).unwrap();
    let err = l
        .modify_details("1", |b| {
            b.quantity = 9;
            Ok(())
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPatch);
    assert_eq!(quantity(&l, "1"), 4);
}

// ── Properties ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Receive(i64),
    Consume(i64),
    Adjust(i64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-5i64..20).prop_map(Op::Receive),
        (-5i64..20).prop_map(Op::Consume),
        (-20i64..20).prop_map(Op::Adjust),
    ]
}

proptest! {
    #[test]
    fn quantity_never_negative_and_failures_do_not_mutate(
        start in 0u64..10,
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut l = ledger(OverdraftPolicy::Reject);
        l.insert(bin("1", start)).unwrap();
        for op in ops {
            let before = quantity(&l, "1");
            let audit_len = l.audit().len();
            let result = match op {
                Op::Receive(n) => l.receive("1", n),
                Op::Consume(n) => l.consume("1", n),
                Op::Adjust(n) => l.adjust("1", n),
            };
            match result {
                Ok(_) => {
                    prop_assert_eq!(l.audit().len(), audit_len + 1);
                }
                Err(_) => {
                    prop_assert_eq!(quantity(&l, "1"), before);
                    prop_assert_eq!(l.audit().len(), audit_len);
                }
            }
        }
        let sum: i64 = l.audit().iter().map(|r| r.delta).sum();
        prop_assert_eq!(sum, quantity(&l, "1") as i64);
    }

    #[test]
    fn over_consume_is_non_mutating(start in 0u64..50, extra in 1i64..50) {
        let mut l = ledger(OverdraftPolicy::Reject);
        l.insert(bin("1", start)).unwrap();
        let err = l.consume("1", start as i64 + extra).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        prop_assert_eq!(quantity(&l, "1"), start);
    }

    #[test]
    fn clamp_policy_never_goes_negative(
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut l = ledger(OverdraftPolicy::Clamp);
        l.insert(bin("1", 5)).unwrap();
        for op in ops {
            let _ = match op {
                Op::Receive(n) => l.receive("1", n),
                Op::Consume(n) => l.consume("1", n),
                Op::Adjust(n) => l.adjust("1", n),
            };
        }
        let sum: i64 = l.audit().iter().map(|r| r.delta).sum();
        prop_assert_eq!(sum, quantity(&l, "1") as i64);
    }
}
