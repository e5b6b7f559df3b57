use blockplan_core::{Column, ColumnDraft, ColumnPatch, ColumnStore, SqliteStore, StoreError};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[test]
fn insert_defaults_to_active_and_round_trips_extra_fields() {
    let store = SqliteStore::open_in_memory().unwrap();

    let mut draft = ColumnDraft::with_field("name", json!("Doing"));
    draft.extra.insert("order".to_string(), json!(2));
    let id = store.insert_column(&draft).unwrap();

    let columns = store.list_columns().unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].id, id);
    assert!(!columns[0].is_archived);
    assert_eq!(columns[0].extra.get("name"), Some(&json!("Doing")));
    assert_eq!(columns[0].extra.get("order"), Some(&json!(2)));
}

#[test]
fn insert_respects_archived_override() {
    let store = SqliteStore::open_in_memory().unwrap();

    let mut draft = ColumnDraft::with_field("name", json!("Old lane"));
    draft.is_archived = true;
    store.insert_column(&draft).unwrap();

    assert!(store.list_columns().unwrap()[0].is_archived);
}

#[test]
fn update_patches_named_fields_and_keeps_the_rest() {
    let store = SqliteStore::open_in_memory().unwrap();

    let mut draft = ColumnDraft::with_field("name", json!("Doing"));
    draft.extra.insert("color".to_string(), json!("#112233"));
    let id = store.insert_column(&draft).unwrap();

    let mut patch_fields = BTreeMap::new();
    patch_fields.insert("name".to_string(), json!("Done"));
    store
        .update_column(
            id,
            &ColumnPatch {
                is_archived: Some(true),
                extra: patch_fields,
            },
        )
        .unwrap();

    let column = store.list_columns().unwrap().remove(0);
    assert!(column.is_archived);
    assert_eq!(column.extra.get("name"), Some(&json!("Done")));
    assert_eq!(column.extra.get("color"), Some(&json!("#112233")));
}

#[test]
fn update_and_delete_are_loud_on_missing_id() {
    let store = SqliteStore::open_in_memory().unwrap();
    let missing = Uuid::new_v4();

    let update_err = store
        .update_column(missing, &ColumnPatch::default())
        .unwrap_err();
    assert!(matches!(update_err, StoreError::NotFound(id) if id == missing));

    let delete_err = store.delete_column(missing).unwrap_err();
    assert!(matches!(delete_err, StoreError::NotFound(id) if id == missing));
}

#[test]
fn watch_delivers_initial_snapshot_and_every_mutation() {
    let store = SqliteStore::open_in_memory().unwrap();

    let seen: Arc<Mutex<Vec<Vec<Column>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store
        .watch_columns(Arc::new(move |columns: &[Column]| {
            sink.lock().unwrap().push(columns.to_vec());
        }))
        .unwrap();

    let id = store
        .insert_column(&ColumnDraft::with_field("name", json!("Todo")))
        .unwrap();
    store.delete_column(id).unwrap();

    let snapshots = seen.lock().unwrap();
    assert_eq!(snapshots.len(), 3);
    assert!(snapshots[0].is_empty());
    assert_eq!(snapshots[1].len(), 1);
    assert!(snapshots[2].is_empty());
}
