//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `blockplan_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use blockplan_core::{BlockDraft, SqliteStore, StoreResult, TaskStore};
use std::sync::Arc;

fn main() -> StoreResult<()> {
    println!("blockplan_core version={}", blockplan_core::core_version());
    println!("blockplan_core today={}", blockplan_core::local_today());

    // Tiny in-memory round trip to validate store wiring independently from
    // any UI runtime setup.
    let store = Arc::new(SqliteStore::open_in_memory()?);
    let tasks = TaskStore::new(store);
    tasks.init()?;

    let mut draft = BlockDraft::titled("smoke block");
    draft.date = Some(blockplan_core::local_today());
    tasks.add_block(&draft)?;

    let snapshot = tasks.snapshot()?;
    println!("blockplan_core today_blocks={}", snapshot.today_blocks().len());
    Ok(())
}
