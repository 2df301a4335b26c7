use super::*;
use crate::energy::{EnergyItem, StagedCollection};

fn item(n: u32, remaining: f32, initial: f32, size: u32) -> EnergyItem {
    EnergyItem {
        id: ItemId(format!("item_{n:06}")),
        source: source(FUEL_ALGAE),
        initial_energy: initial,
        remaining_energy: remaining,
        size,
    }
}

#[test]
fn add_rejects_duplicate_identity() {
    let mut pool = StagedCollection::new();
    pool.add(item(1, 10.0, 10.0, 1)).unwrap();

    let result = pool.add(item(1, 5.0, 10.0, 1));
    assert_eq!(result, Err(RejectReason::DuplicateIdentity));
    assert_eq!(pool.len(), 1, "rejected item must not be absorbed");
}

#[test]
fn find_returns_none_for_absent_identity() {
    let mut pool = StagedCollection::new();
    pool.add(item(1, 10.0, 10.0, 1)).unwrap();

    assert!(pool.find(&ItemId("item_000001".to_string())).is_some());
    assert!(pool.find(&ItemId("item_999999".to_string())).is_none());
}

#[test]
fn staging_is_idempotent_and_defers_removal() {
    let mut pool = StagedCollection::new();
    pool.add(item(1, 10.0, 10.0, 1)).unwrap();
    pool.add(item(2, 10.0, 10.0, 1)).unwrap();

    let id = ItemId("item_000002".to_string());
    pool.stage_for_removal(&id);
    pool.stage_for_removal(&id);

    // Staged items stay in the sequence until commit.
    assert_eq!(pool.len(), 2, "staged item removed before commit");

    let mut sink = RecordingSink::default();
    let removed = pool.commit_removals(&mut sink);
    assert_eq!(removed, 1, "double-staging must not double-remove");
    assert_eq!(pool.len(), 1);
    assert_eq!(sink.removed, vec![id]);
}

#[test]
fn commit_removes_in_original_order_and_clears_staged() {
    let mut pool = StagedCollection::new();
    for n in 1..=4 {
        pool.add(item(n, 10.0, 10.0, 1)).unwrap();
    }

    // Stage out of sequence order.
    pool.stage_for_removal(&ItemId("item_000003".to_string()));
    pool.stage_for_removal(&ItemId("item_000001".to_string()));

    let mut sink = RecordingSink::default();
    pool.commit_removals(&mut sink);
    assert_eq!(
        sink.removed,
        vec![
            ItemId("item_000001".to_string()),
            ItemId("item_000003".to_string()),
        ],
        "sink must see removals in original sequence order"
    );

    // The staged set is cleared: a second commit is a no-op.
    assert_eq!(pool.commit_removals(&mut sink), 0);
    assert_eq!(pool.len(), 2);
}

#[test]
fn occupied_units_excludes_staged_items() {
    let mut pool = StagedCollection::new();
    pool.add(item(1, 10.0, 10.0, 2)).unwrap();
    pool.add(item(2, 10.0, 10.0, 4)).unwrap();
    assert_eq!(pool.occupied_units(), 6);

    pool.stage_for_removal(&ItemId("item_000002".to_string()));
    assert_eq!(pool.occupied_units(), 2);
}

#[test]
fn candidate_for_removal_picks_most_depleted_fraction() {
    let mut pool = StagedCollection::new();
    pool.add(item(1, 9.0, 10.0, 1)).unwrap(); // 90%
    pool.add(item(2, 10.0, 100.0, 1)).unwrap(); // 10%
    pool.add(item(3, 5.0, 10.0, 1)).unwrap(); // 50%

    let candidate = pool.candidate_for_removal().unwrap();
    assert_eq!(candidate.id, ItemId("item_000002".to_string()));
}

#[test]
fn candidate_for_removal_empty_pool() {
    let pool = StagedCollection::new();
    assert!(pool.candidate_for_removal().is_none());
}

#[test]
fn remove_now_notifies_sink_and_drops_stale_staging() {
    let mut pool = StagedCollection::new();
    pool.add(item(1, 10.0, 10.0, 1)).unwrap();
    let id = ItemId("item_000001".to_string());
    pool.stage_for_removal(&id);

    let mut sink = RecordingSink::default();
    let removed = pool.remove_now(&id, &mut sink);
    assert!(removed.is_some());
    assert_eq!(sink.removed, vec![id]);

    // The stale staged entry must not survive into the next commit.
    assert_eq!(pool.commit_removals(&mut sink), 0);
}
