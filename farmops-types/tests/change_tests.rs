use farmops_types::{Change, ChangePayload, EntityId, Timestamp};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn inserted_change_carries_entity_json() {
    let change = Change::inserted(
        EntityId::new("t1"),
        "tyre",
        Timestamp::from_millis(5),
        json!({"id": "t1", "quantity": 4}),
    );
    assert_eq!(change.entity_kind, "tyre");
    assert_eq!(
        change.payload,
        ChangePayload::EntityInserted {
            json_data: json!({"id": "t1", "quantity": 4})
        }
    );
}

#[test]
fn payload_is_tagged_by_op() {
    let change = Change::removed(EntityId::new("t1"), "tyre", Timestamp::from_millis(5));
    let value = serde_json::to_value(&change).unwrap();
    assert_eq!(value["payload"], json!({"op": "EntityRemoved"}));
    assert_eq!(value["entity_id"], json!("t1"));
    assert_eq!(value["timestamp"], json!(5));
}

#[test]
fn change_ids_are_unique() {
    let a = Change::removed(EntityId::new("a"), "tyre", Timestamp::from_millis(1));
    let b = Change::removed(EntityId::new("a"), "tyre", Timestamp::from_millis(1));
    assert_ne!(a.id, b.id);
}

#[test]
fn sequence_defaults_to_zero_and_survives_serde() {
    let change = Change::removed(EntityId::new("a"), "tyre", Timestamp::from_millis(1));
    assert_eq!(change.sequence, 0);

    let numbered = change.with_sequence(7);
    let back: Change = serde_json::from_value(serde_json::to_value(&numbered).unwrap()).unwrap();
    assert_eq!(back.sequence, 7);

    let mut legacy = serde_json::to_value(&numbered).unwrap();
    legacy.as_object_mut().unwrap().remove("sequence");
    let back: Change = serde_json::from_value(legacy).unwrap();
    assert_eq!(back.sequence, 0);
}
