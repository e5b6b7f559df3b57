//! SQLite-backed authoritative document store.
//!
//! # Responsibility
//! - Persist the `blocks` and `columns` collections.
//! - Push full-collection snapshots to registered listeners after every
//!   committed mutation.
//!
//! # Invariants
//! - Identities are assigned here, on insert, and returned to the caller.
//! - Listener notification happens after the write, reading the post-write
//!   state, so listeners always observe a consistent full snapshot.
//! - Snapshot order is stable: insertion order (`created_at`, then `uuid`).

use crate::db::{open_db, open_db_in_memory};
use crate::model::block::{Block, BlockDraft, BlockId, BlockPatch, SubItem};
use crate::model::column::{Column, ColumnDraft, ColumnId, ColumnPatch};
use crate::store::{
    BlockListener, BlockStore, ColumnListener, ColumnStore, StoreError, StoreResult,
};
use log::debug;
use rusqlite::{params, Connection, Row};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const BLOCK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    date,
    time,
    type,
    content,
    is_completed,
    is_archived,
    is_deleted,
    completed_at
FROM blocks";

const COLUMN_SELECT_SQL: &str = "SELECT uuid, is_archived, payload FROM columns";

/// SQLite-backed store for both planner collections.
///
/// Shared across threads behind `Arc`; the connection sits behind a mutex and
/// every mutation is one serialized write followed by a snapshot push.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    block_listeners: Mutex<Vec<BlockListener>>,
    column_listeners: Mutex<Vec<ColumnListener>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given database path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::with_connection(open_db(path)?))
    }

    /// Opens an in-memory store, used by tests and the CLI probe.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::with_connection(open_db_in_memory()?))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            block_listeners: Mutex::new(Vec::new()),
            column_listeners: Mutex::new(Vec::new()),
        }
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned("connection"))
    }

    fn list_blocks_locked(conn: &Connection) -> StoreResult<Vec<Block>> {
        let mut stmt =
            conn.prepare(&format!("{BLOCK_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut blocks = Vec::new();
        while let Some(row) = rows.next()? {
            blocks.push(parse_block_row(row)?);
        }
        Ok(blocks)
    }

    fn list_columns_locked(conn: &Connection) -> StoreResult<Vec<Column>> {
        let mut stmt =
            conn.prepare(&format!("{COLUMN_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut columns = Vec::new();
        while let Some(row) = rows.next()? {
            columns.push(parse_column_row(row)?);
        }
        Ok(columns)
    }

    fn get_block_locked(conn: &Connection, id: BlockId) -> StoreResult<Block> {
        let mut stmt = conn.prepare(&format!("{BLOCK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        match rows.next()? {
            Some(row) => parse_block_row(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn get_column_locked(conn: &Connection, id: ColumnId) -> StoreResult<Column> {
        let mut stmt = conn.prepare(&format!("{COLUMN_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        match rows.next()? {
            Some(row) => parse_column_row(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn write_block_locked(conn: &Connection, block: &Block) -> StoreResult<()> {
        let changed = conn.execute(
            "UPDATE blocks
             SET
                title = ?1,
                date = ?2,
                time = ?3,
                type = ?4,
                content = ?5,
                is_completed = ?6,
                is_archived = ?7,
                is_deleted = ?8,
                completed_at = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?10;",
            params![
                block.title.as_str(),
                block.date.as_deref(),
                block.time.as_deref(),
                block.kind.as_deref(),
                content_to_db(&block.content)?,
                bool_to_int(block.is_completed),
                bool_to_int(block.is_archived),
                bool_to_int(block.is_deleted),
                block.completed_at.as_deref(),
                block.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(block.id));
        }
        Ok(())
    }

    /// Reads the post-write snapshot and pushes it to all block listeners.
    ///
    /// Listeners are cloned out of the registry first, so a listener that
    /// calls back into the store cannot deadlock on the registry lock.
    fn notify_blocks(&self) -> StoreResult<()> {
        let snapshot = {
            let conn = self.conn()?;
            Self::list_blocks_locked(&conn)?
        };
        let listeners: Vec<BlockListener> = {
            let guard = self
                .block_listeners
                .lock()
                .map_err(|_| StoreError::LockPoisoned("block listeners"))?;
            guard.clone()
        };
        debug!(
            "event=snapshot_push module=store collection=blocks docs={} listeners={}",
            snapshot.len(),
            listeners.len()
        );
        for listener in &listeners {
            listener(&snapshot);
        }
        Ok(())
    }

    fn notify_columns(&self) -> StoreResult<()> {
        let snapshot = {
            let conn = self.conn()?;
            Self::list_columns_locked(&conn)?
        };
        let listeners: Vec<ColumnListener> = {
            let guard = self
                .column_listeners
                .lock()
                .map_err(|_| StoreError::LockPoisoned("column listeners"))?;
            guard.clone()
        };
        debug!(
            "event=snapshot_push module=store collection=columns docs={} listeners={}",
            snapshot.len(),
            listeners.len()
        );
        for listener in &listeners {
            listener(&snapshot);
        }
        Ok(())
    }
}

impl BlockStore for SqliteStore {
    fn insert_block(&self, draft: &BlockDraft) -> StoreResult<BlockId> {
        let id = Uuid::new_v4();
        {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO blocks (
                    uuid,
                    title,
                    date,
                    time,
                    type,
                    content,
                    is_completed,
                    is_archived,
                    is_deleted,
                    completed_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
                params![
                    id.to_string(),
                    draft.title.as_str(),
                    draft.date.as_deref(),
                    draft.time.as_deref(),
                    draft.kind.as_deref(),
                    content_to_db(&draft.content)?,
                    bool_to_int(draft.is_completed),
                    bool_to_int(draft.is_archived),
                    bool_to_int(draft.is_deleted),
                    draft.completed_at.as_deref(),
                ],
            )?;
        }
        self.notify_blocks()?;
        Ok(id)
    }

    fn update_block(&self, id: BlockId, patch: &BlockPatch) -> StoreResult<()> {
        {
            let conn = self.conn()?;
            let mut block = Self::get_block_locked(&conn, id)?;
            block.apply_patch(patch);
            Self::write_block_locked(&conn, &block)?;
        }
        self.notify_blocks()
    }

    fn delete_block(&self, id: BlockId) -> StoreResult<()> {
        {
            let conn = self.conn()?;
            let changed =
                conn.execute("DELETE FROM blocks WHERE uuid = ?1;", [id.to_string()])?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
        }
        self.notify_blocks()
    }

    fn list_blocks(&self) -> StoreResult<Vec<Block>> {
        let conn = self.conn()?;
        Self::list_blocks_locked(&conn)
    }

    fn watch_blocks(&self, listener: BlockListener) -> StoreResult<()> {
        let snapshot = self.list_blocks()?;
        listener(&snapshot);
        self.block_listeners
            .lock()
            .map_err(|_| StoreError::LockPoisoned("block listeners"))?
            .push(listener);
        Ok(())
    }
}

impl ColumnStore for SqliteStore {
    fn insert_column(&self, draft: &ColumnDraft) -> StoreResult<ColumnId> {
        let id = Uuid::new_v4();
        {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO columns (uuid, is_archived, payload) VALUES (?1, ?2, ?3);",
                params![
                    id.to_string(),
                    bool_to_int(draft.is_archived),
                    payload_to_db(&draft.extra)?,
                ],
            )?;
        }
        self.notify_columns()?;
        Ok(id)
    }

    fn update_column(&self, id: ColumnId, patch: &ColumnPatch) -> StoreResult<()> {
        {
            let conn = self.conn()?;
            let mut column = Self::get_column_locked(&conn, id)?;
            column.apply_patch(patch);
            let changed = conn.execute(
                "UPDATE columns
                 SET
                    is_archived = ?1,
                    payload = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?3;",
                params![
                    bool_to_int(column.is_archived),
                    payload_to_db(&column.extra)?,
                    id.to_string(),
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
        }
        self.notify_columns()
    }

    fn delete_column(&self, id: ColumnId) -> StoreResult<()> {
        {
            let conn = self.conn()?;
            let changed =
                conn.execute("DELETE FROM columns WHERE uuid = ?1;", [id.to_string()])?;
            if changed == 0 {
                return Err(StoreError::NotFound(id));
            }
        }
        self.notify_columns()
    }

    fn list_columns(&self) -> StoreResult<Vec<Column>> {
        let conn = self.conn()?;
        Self::list_columns_locked(&conn)
    }

    fn watch_columns(&self, listener: ColumnListener) -> StoreResult<()> {
        let snapshot = self.list_columns()?;
        listener(&snapshot);
        self.column_listeners
            .lock()
            .map_err(|_| StoreError::LockPoisoned("column listeners"))?
            .push(listener);
        Ok(())
    }
}

fn parse_block_row(row: &Row<'_>) -> StoreResult<Block> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{uuid_text}` in blocks.uuid"))
    })?;

    let content_text: String = row.get("content")?;
    let content: Vec<SubItem> = serde_json::from_str(&content_text).map_err(|err| {
        StoreError::InvalidData(format!("invalid sub-item payload in blocks.content: {err}"))
    })?;

    Ok(Block {
        id,
        title: row.get("title")?,
        date: row.get("date")?,
        time: row.get("time")?,
        kind: row.get("type")?,
        content,
        is_completed: int_to_bool(row.get("is_completed")?, "blocks.is_completed")?,
        is_archived: int_to_bool(row.get("is_archived")?, "blocks.is_archived")?,
        is_deleted: int_to_bool(row.get("is_deleted")?, "blocks.is_deleted")?,
        completed_at: row.get("completed_at")?,
    })
}

fn parse_column_row(row: &Row<'_>) -> StoreResult<Column> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{uuid_text}` in columns.uuid"))
    })?;

    let payload_text: String = row.get("payload")?;
    let extra: BTreeMap<String, Value> = serde_json::from_str(&payload_text).map_err(|err| {
        StoreError::InvalidData(format!("invalid payload in columns.payload: {err}"))
    })?;

    Ok(Column {
        id,
        is_archived: int_to_bool(row.get("is_archived")?, "columns.is_archived")?,
        extra,
    })
}

fn content_to_db(content: &[SubItem]) -> StoreResult<String> {
    serde_json::to_string(content)
        .map_err(|err| StoreError::InvalidData(format!("unserializable sub-items: {err}")))
}

fn payload_to_db(extra: &BTreeMap<String, Value>) -> StoreResult<String> {
    serde_json::to_string(extra)
        .map_err(|err| StoreError::InvalidData(format!("unserializable column payload: {err}")))
}

fn int_to_bool(value: i64, column: &str) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
