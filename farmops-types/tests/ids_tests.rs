use farmops_types::{EntityId, IdGenerator, SequentialIds, UuidIds};
use std::collections::{HashMap, HashSet};

// ── EntityId ──────────────────────────────────────────────────────

#[test]
fn entity_id_display_matches_input() {
    let id = EntityId::new("tyre-1");
    assert_eq!(id.to_string(), "tyre-1");
    assert_eq!(id.as_str(), "tyre-1");
}

#[test]
fn entity_id_from_str_and_string_agree() {
    assert_eq!(EntityId::from("a"), EntityId::from("a".to_string()));
}

#[test]
fn entity_id_serializes_transparently() {
    let id = EntityId::new("doc-7");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"doc-7\"");
    let parsed: EntityId = serde_json::from_str("\"doc-7\"").unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn entity_id_map_lookup_by_str() {
    let mut map = HashMap::new();
    map.insert(EntityId::new("part-3"), 3);
    assert_eq!(map.get("part-3"), Some(&3));
    assert_eq!(map.get("part-4"), None);
}

// ── Generators ────────────────────────────────────────────────────

#[test]
fn sequential_ids_count_up_from_one() {
    let ids = SequentialIds::new("job");
    assert_eq!(ids.next_id().as_str(), "job-1");
    assert_eq!(ids.next_id().as_str(), "job-2");
    assert_eq!(ids.next_id().as_str(), "job-3");
}

#[test]
fn uuid_ids_are_unique() {
    let ids = UuidIds;
    let set: HashSet<_> = (0..100).map(|_| ids.next_id()).collect();
    assert_eq!(set.len(), 100);
}

#[test]
fn uuid_ids_parse_as_uuid() {
    let id = UuidIds.next_id();
    assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
}
