use blockplan_core::{
    Block, BlockDraft, BlockPatch, BlockStore, Patch, SqliteStore, StoreError, SubItem,
};
use uuid::Uuid;

#[test]
fn insert_and_list_roundtrip() {
    let store = SqliteStore::open_in_memory().unwrap();

    let mut draft = BlockDraft::titled("write report");
    draft.date = Some("2024-06-01".to_string());
    draft.time = Some("09:00".to_string());
    draft.kind = Some("work".to_string());
    draft.content = vec![SubItem::new("outline"), SubItem::new("draft")];
    let id = store.insert_block(&draft).unwrap();

    let blocks = store.list_blocks().unwrap();
    assert_eq!(blocks.len(), 1);
    let loaded = &blocks[0];
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.title, "write report");
    assert_eq!(loaded.date.as_deref(), Some("2024-06-01"));
    assert_eq!(loaded.time.as_deref(), Some("09:00"));
    assert_eq!(loaded.kind.as_deref(), Some("work"));
    assert_eq!(loaded.content.len(), 2);
    assert!(!loaded.is_completed);
    assert!(!loaded.is_archived);
    assert!(!loaded.is_deleted);
    assert!(loaded.completed_at.is_none());
}

#[test]
fn insert_respects_caller_supplied_flag_overrides() {
    let store = SqliteStore::open_in_memory().unwrap();

    let mut draft = BlockDraft::titled("already done");
    draft.is_completed = true;
    draft.completed_at = Some("2024-05-30".to_string());
    store.insert_block(&draft).unwrap();

    let loaded = store.list_blocks().unwrap().remove(0);
    assert!(loaded.is_completed);
    assert_eq!(loaded.completed_at.as_deref(), Some("2024-05-30"));
}

#[test]
fn update_merges_patch_and_preserves_unpatched_fields() {
    let store = SqliteStore::open_in_memory().unwrap();

    let mut draft = BlockDraft::titled("plan sprint");
    draft.date = Some("2024-06-01".to_string());
    draft.time = Some("10:00".to_string());
    let id = store.insert_block(&draft).unwrap();

    store
        .update_block(
            id,
            &BlockPatch {
                title: Some("plan sprint 12".to_string()),
                time: Patch::Clear,
                ..BlockPatch::default()
            },
        )
        .unwrap();

    let loaded = store.list_blocks().unwrap().remove(0);
    assert_eq!(loaded.title, "plan sprint 12");
    assert!(loaded.time.is_none());
    // Unpatched field survives the merge.
    assert_eq!(loaded.date.as_deref(), Some("2024-06-01"));
}

#[test]
fn update_replaces_sub_items_wholesale() {
    let store = SqliteStore::open_in_memory().unwrap();

    let mut draft = BlockDraft::titled("groceries");
    draft.content = vec![SubItem::new("milk")];
    let id = store.insert_block(&draft).unwrap();

    let mut replacement = vec![SubItem::new("milk"), SubItem::new("bread")];
    replacement[0].done = true;
    store
        .update_block(
            id,
            &BlockPatch {
                content: Some(replacement),
                ..BlockPatch::default()
            },
        )
        .unwrap();

    let loaded = store.list_blocks().unwrap().remove(0);
    assert_eq!(loaded.content.len(), 2);
    assert!(loaded.content[0].done);
    assert!(!loaded.content[1].done);
}

#[test]
fn update_not_found_is_loud() {
    let store = SqliteStore::open_in_memory().unwrap();
    let missing = Uuid::new_v4();

    let err = store
        .update_block(missing, &BlockPatch::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == missing));
}

#[test]
fn delete_removes_document_and_is_loud_on_missing_id() {
    let store = SqliteStore::open_in_memory().unwrap();

    let id = store.insert_block(&BlockDraft::titled("ephemeral")).unwrap();
    store.delete_block(id).unwrap();
    assert!(store.list_blocks().unwrap().is_empty());

    let err = store.delete_block(id).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(gone) if gone == id));
}

#[test]
fn soft_delete_keeps_the_document_in_snapshots() {
    let store = SqliteStore::open_in_memory().unwrap();

    let id = store.insert_block(&BlockDraft::titled("tombstoned")).unwrap();
    store
        .update_block(
            id,
            &BlockPatch {
                is_deleted: Some(true),
                ..BlockPatch::default()
            },
        )
        .unwrap();

    // Soft delete is a flag, not a removal: snapshots still carry the row
    // and derived views are responsible for hiding it.
    let blocks = store.list_blocks().unwrap();
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].is_deleted);
}

#[test]
fn snapshot_order_is_stable_insertion_order() {
    let store = SqliteStore::open_in_memory().unwrap();

    let first = store.insert_block(&BlockDraft::titled("first")).unwrap();
    let second = store.insert_block(&BlockDraft::titled("second")).unwrap();
    let third = store.insert_block(&BlockDraft::titled("third")).unwrap();

    // An update must not reshuffle the snapshot.
    store
        .update_block(
            first,
            &BlockPatch {
                title: Some("first edited".to_string()),
                ..BlockPatch::default()
            },
        )
        .unwrap();

    let ids: Vec<_> = store.list_blocks().unwrap().iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![first, second, third]);
}

#[test]
fn watch_delivers_initial_snapshot_and_every_mutation() {
    use std::sync::{Arc, Mutex};

    let store = SqliteStore::open_in_memory().unwrap();
    store.insert_block(&BlockDraft::titled("pre-existing")).unwrap();

    let seen: Arc<Mutex<Vec<Vec<Block>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store
        .watch_blocks(Arc::new(move |blocks: &[Block]| {
            sink.lock().unwrap().push(blocks.to_vec());
        }))
        .unwrap();

    let id = store.insert_block(&BlockDraft::titled("new")).unwrap();
    store.delete_block(id).unwrap();

    let snapshots = seen.lock().unwrap();
    assert_eq!(snapshots.len(), 3);
    assert_eq!(snapshots[0].len(), 1);
    assert_eq!(snapshots[1].len(), 2);
    assert_eq!(snapshots[2].len(), 1);
}

#[test]
fn file_backed_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("planner.sqlite3");

    let id = {
        let store = SqliteStore::open(&path).unwrap();
        store.insert_block(&BlockDraft::titled("durable")).unwrap()
    };

    let reopened = SqliteStore::open(&path).unwrap();
    let blocks = reopened.list_blocks().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].id, id);
    assert_eq!(blocks[0].title, "durable");
}
