//! Planner state container.
//!
//! # Responsibility
//! - Mirror the two store collections into process memory.
//! - Expose immutable snapshots and push change notifications to consumers.
//! - Provide the write operations the board/timeline UI calls.
//!
//! # Invariants
//! - The mirror is a cache with no authority: every store notification
//!   replaces the affected collection wholesale, never merges.
//! - Store-originated errors propagate loudly; local-mirror misses degrade
//!   to silent no-ops.
//! - Toggle/duplicate read their precondition from the mirror, not the
//!   store. Under concurrent multi-client editing this is a stale-read race,
//!   accepted as out of scope for this CRUD layer.

use crate::clock::local_today;
use crate::model::block::{Block, BlockDraft, BlockId, BlockPatch, Patch};
use crate::model::column::{Column, ColumnDraft, ColumnId, ColumnPatch};
use crate::store::{BlockStore, ColumnStore, StoreError, StoreResult};
use crate::views::PlannerSnapshot;
use log::{debug, error, info};
use std::sync::{Arc, Mutex};

/// Consumer-side snapshot listener.
///
/// Invoked with a fresh snapshot after every mirror replacement.
pub type SnapshotListener = Arc<dyn Fn(&PlannerSnapshot) + Send + Sync>;

struct MirrorState {
    blocks: Vec<Block>,
    columns: Vec<Column>,
    loading: bool,
}

impl MirrorState {
    fn snapshot(&self) -> PlannerSnapshot {
        PlannerSnapshot {
            blocks: self.blocks.clone(),
            columns: self.columns.clone(),
            loading: self.loading,
        }
    }
}

/// Live mirror of the planner collections plus their write operations.
///
/// Cloneable via `Arc` on the caller side; all interior state is shared and
/// lock-protected.
pub struct TaskStore<S> {
    store: Arc<S>,
    state: Arc<Mutex<MirrorState>>,
    subscribers: Arc<Mutex<Vec<SnapshotListener>>>,
}

impl<S> TaskStore<S>
where
    S: BlockStore + ColumnStore,
{
    /// Creates a task store over the given document store.
    ///
    /// `loading` starts `true` and nothing in this layer clears it; see the
    /// design notes.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: Arc::new(Mutex::new(MirrorState {
                blocks: Vec::new(),
                columns: Vec::new(),
                loading: true,
            })),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Establishes the two collection subscriptions.
    ///
    /// Each notification replaces the affected mirror wholesale and then
    /// pushes a fresh snapshot to all subscribers. Subscriptions live for the
    /// lifetime of the store; there is no teardown.
    pub fn init(&self) -> StoreResult<()> {
        let state = Arc::clone(&self.state);
        let subscribers = Arc::clone(&self.subscribers);
        self.store.watch_blocks(Arc::new(move |blocks: &[Block]| {
            let snapshot = {
                let mut guard = match state.lock() {
                    Ok(guard) => guard,
                    Err(_) => {
                        error!("event=mirror_replace module=service status=error collection=blocks error_code=mirror_lock_poisoned");
                        return;
                    }
                };
                guard.blocks = blocks.to_vec();
                guard.snapshot()
            };
            notify_subscribers(&subscribers, &snapshot);
        }))?;

        let state = Arc::clone(&self.state);
        let subscribers = Arc::clone(&self.subscribers);
        self.store.watch_columns(Arc::new(move |columns: &[Column]| {
            let snapshot = {
                let mut guard = match state.lock() {
                    Ok(guard) => guard,
                    Err(_) => {
                        error!("event=mirror_replace module=service status=error collection=columns error_code=mirror_lock_poisoned");
                        return;
                    }
                };
                guard.columns = columns.to_vec();
                guard.snapshot()
            };
            notify_subscribers(&subscribers, &snapshot);
        }))?;

        info!("event=store_init module=service status=ok");
        Ok(())
    }

    /// Returns an immutable snapshot of the current mirror.
    ///
    /// Derived views are methods on the returned [`PlannerSnapshot`].
    pub fn snapshot(&self) -> StoreResult<PlannerSnapshot> {
        Ok(self.lock_state()?.snapshot())
    }

    /// Registers a consumer listener and immediately delivers the current
    /// snapshot to it.
    pub fn subscribe(&self, listener: SnapshotListener) -> StoreResult<()> {
        let snapshot = self.snapshot()?;
        listener(&snapshot);
        self.subscribers
            .lock()
            .map_err(|_| StoreError::LockPoisoned("subscribers"))?
            .push(listener);
        Ok(())
    }

    /// Inserts a new block. Lifecycle flags default to false unless the
    /// draft overrides them.
    pub fn add_block(&self, draft: &BlockDraft) -> StoreResult<BlockId> {
        let id = self.store.insert_block(draft)?;
        debug!("event=block_add module=service status=ok id={id}");
        Ok(id)
    }

    /// Merges a field-level patch into the stored block.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when the identity does not exist in the
    ///   store.
    pub fn update_block(&self, id: BlockId, patch: &BlockPatch) -> StoreResult<()> {
        self.store.update_block(id, patch)
    }

    /// Flips completion on the mirrored block.
    ///
    /// On completion, `completed_at` is stamped with the current local date;
    /// on un-completion it is cleared. Unknown ids are a silent no-op.
    pub fn toggle_complete(&self, id: BlockId) -> StoreResult<()> {
        let next = {
            let state = self.lock_state()?;
            match state.blocks.iter().find(|block| block.id == id) {
                Some(block) => !block.is_completed,
                None => {
                    debug!("event=block_toggle_complete module=service status=miss id={id}");
                    return Ok(());
                }
            }
        };

        let patch = BlockPatch {
            is_completed: Some(next),
            completed_at: if next {
                Patch::Set(local_today())
            } else {
                Patch::Clear
            },
            ..BlockPatch::default()
        };
        self.store.update_block(id, &patch)
    }

    /// Flips archival on the mirrored block. Unknown ids are a silent no-op.
    pub fn toggle_archive(&self, id: BlockId) -> StoreResult<()> {
        let next = {
            let state = self.lock_state()?;
            match state.blocks.iter().find(|block| block.id == id) {
                Some(block) => !block.is_archived,
                None => {
                    debug!("event=block_toggle_archive module=service status=miss id={id}");
                    return Ok(());
                }
            }
        };

        let patch = BlockPatch {
            is_archived: Some(next),
            ..BlockPatch::default()
        };
        self.store.update_block(id, &patch)
    }

    /// Hard-deletes the stored block.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when the identity does not exist.
    pub fn delete_block(&self, id: BlockId) -> StoreResult<()> {
        self.store.delete_block(id)
    }

    /// Duplicates the mirrored block under a fresh identity.
    ///
    /// Completion, archival and sub-item state reset; the title gains the
    /// copy suffix. Returns `None` when the source id is not in the mirror.
    pub fn duplicate_block(&self, id: BlockId) -> StoreResult<Option<BlockId>> {
        let draft = {
            let state = self.lock_state()?;
            match state.blocks.iter().find(|block| block.id == id) {
                Some(block) => block.duplicate_draft(),
                None => {
                    debug!("event=block_duplicate module=service status=miss id={id}");
                    return Ok(None);
                }
            }
        };

        let new_id = self.store.insert_block(&draft)?;
        debug!("event=block_duplicate module=service status=ok source={id} id={new_id}");
        Ok(Some(new_id))
    }

    /// Inserts a new column. `is_archived` defaults to false unless the
    /// draft overrides it.
    pub fn add_column(&self, draft: &ColumnDraft) -> StoreResult<ColumnId> {
        let id = self.store.insert_column(draft)?;
        debug!("event=column_add module=service status=ok id={id}");
        Ok(id)
    }

    /// Flips archival on the mirrored column. Unknown ids are a silent
    /// no-op.
    pub fn toggle_archive_column(&self, id: ColumnId) -> StoreResult<()> {
        let next = {
            let state = self.lock_state()?;
            match state.columns.iter().find(|column| column.id == id) {
                Some(column) => !column.is_archived,
                None => {
                    debug!("event=column_toggle_archive module=service status=miss id={id}");
                    return Ok(());
                }
            }
        };

        let patch = ColumnPatch {
            is_archived: Some(next),
            ..ColumnPatch::default()
        };
        self.store.update_column(id, &patch)
    }

    /// Hard-deletes the stored column.
    ///
    /// # Errors
    /// - `StoreError::NotFound` when the identity does not exist.
    pub fn delete_column(&self, id: ColumnId) -> StoreResult<()> {
        self.store.delete_column(id)
    }

    fn lock_state(&self) -> StoreResult<std::sync::MutexGuard<'_, MirrorState>> {
        self.state
            .lock()
            .map_err(|_| StoreError::LockPoisoned("mirror"))
    }
}

fn notify_subscribers(subscribers: &Mutex<Vec<SnapshotListener>>, snapshot: &PlannerSnapshot) {
    let listeners: Vec<SnapshotListener> = match subscribers.lock() {
        Ok(guard) => guard.clone(),
        Err(_) => {
            error!("event=snapshot_notify module=service status=error error_code=subscriber_lock_poisoned");
            return;
        }
    };
    for listener in &listeners {
        listener(snapshot);
    }
}
