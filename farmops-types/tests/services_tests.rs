use farmops_types::Services;
use pretty_assertions::assert_eq;

#[test]
fn change_log_is_off_by_default() {
    assert!(!Services::system().record_changes);
    assert!(!Services::deterministic("x").record_changes);
    assert!(Services::deterministic("x").with_change_log().record_changes);
}

#[test]
fn clones_share_one_commit_sequence() {
    let a = Services::deterministic("x");
    let b = a.clone();
    assert_eq!(a.next_sequence(), 1);
    assert_eq!(b.next_sequence(), 2);
    assert_eq!(a.next_sequence(), 3);

    let unrelated = Services::deterministic("x");
    assert_eq!(unrelated.next_sequence(), 1);
}
