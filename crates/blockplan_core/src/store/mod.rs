//! Document store contracts for the two planner collections.
//!
//! # Responsibility
//! - Define collection-level CRUD and snapshot-watch contracts.
//! - Keep service/view layers decoupled from the storage backend.
//!
//! # Invariants
//! - `watch_*` listeners always receive the *full* current collection
//!   snapshot, never an incremental diff.
//! - Update/delete on a missing identity return `StoreError::NotFound`;
//!   it is the caller's business whether that is loud or silent.

use crate::db::DbError;
use crate::model::block::{Block, BlockDraft, BlockId, BlockPatch};
use crate::model::column::{Column, ColumnDraft, ColumnId, ColumnPatch};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

pub mod sqlite_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Snapshot listener for the blocks collection.
///
/// Invoked synchronously after every committed mutation with the full
/// collection contents.
pub type BlockListener = Arc<dyn Fn(&[Block]) + Send + Sync>;

/// Snapshot listener for the columns collection.
pub type ColumnListener = Arc<dyn Fn(&[Column]) + Send + Sync>;

/// Generic store error for planner document persistence.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    NotFound(Uuid),
    InvalidData(String),
    LockPoisoned(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "document not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document data: {message}"),
            Self::LockPoisoned(what) => write!(f, "store lock poisoned: {what}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::LockPoisoned(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// CRUD and watch contract for the blocks collection.
pub trait BlockStore {
    /// Inserts a new block and returns the store-assigned identity.
    fn insert_block(&self, draft: &BlockDraft) -> StoreResult<BlockId>;
    /// Merges a field-level patch into the stored block.
    fn update_block(&self, id: BlockId, patch: &BlockPatch) -> StoreResult<()>;
    /// Hard-deletes the stored block.
    fn delete_block(&self, id: BlockId) -> StoreResult<()>;
    /// Returns the full current collection snapshot.
    fn list_blocks(&self) -> StoreResult<Vec<Block>>;
    /// Registers a snapshot listener and immediately delivers the current
    /// snapshot to it.
    fn watch_blocks(&self, listener: BlockListener) -> StoreResult<()>;
}

/// CRUD and watch contract for the columns collection.
pub trait ColumnStore {
    fn insert_column(&self, draft: &ColumnDraft) -> StoreResult<ColumnId>;
    fn update_column(&self, id: ColumnId, patch: &ColumnPatch) -> StoreResult<()>;
    fn delete_column(&self, id: ColumnId) -> StoreResult<()>;
    fn list_columns(&self) -> StoreResult<Vec<Column>>;
    fn watch_columns(&self, listener: ColumnListener) -> StoreResult<()>;
}
