//! Core state-synchronization layer for the blockplan planner.
//! This crate is the single source of truth for planner invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod views;

pub use clock::local_today;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::block::{Block, BlockDraft, BlockId, BlockPatch, Patch, SubItem};
pub use model::column::{Column, ColumnDraft, ColumnId, ColumnPatch};
pub use service::task_store::{SnapshotListener, TaskStore};
pub use store::sqlite_store::SqliteStore;
pub use store::{BlockStore, ColumnStore, StoreError, StoreResult};
pub use views::PlannerSnapshot;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
