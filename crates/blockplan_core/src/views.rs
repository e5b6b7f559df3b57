//! Derived presentation views.
//!
//! # Responsibility
//! - Partition an immutable planner snapshot into the display sets the UI
//!   renders: today's timeline/todos, per-date slices and typed backlogs.
//!
//! # Invariants
//! - Views are pure functions of the snapshot, recomputed on demand, never
//!   cached.
//! - Timeline views sort ascending by `time`; plain string comparison is
//!   chronological because the format is fixed-width zero-padded.
//! - Deleted blocks are hidden everywhere except `today_blocks`, which
//!   filters archival only.

use crate::clock::local_today;
use crate::model::block::Block;
use crate::model::column::Column;

/// Immutable copy of the mirrored planner state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerSnapshot {
    pub blocks: Vec<Block>,
    pub columns: Vec<Column>,
    /// Starts `true` and is never cleared; see the design notes.
    pub loading: bool,
}

impl PlannerSnapshot {
    /// Columns not yet archived, in snapshot order.
    pub fn active_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| !c.is_archived).collect()
    }

    /// Archived columns, in snapshot order.
    pub fn archived_columns(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_archived).collect()
    }

    /// All non-archived blocks scheduled for today.
    pub fn today_blocks(&self) -> Vec<&Block> {
        self.blocks_by_date_inner(&local_today())
    }

    /// Today's open timeline items, sorted ascending by time.
    pub fn today_timeline(&self) -> Vec<&Block> {
        self.timeline_by_date(&local_today())
    }

    /// Today's open todos (no time-of-day).
    pub fn today_todos(&self) -> Vec<&Block> {
        self.todos_by_date(&local_today())
    }

    /// Today's completed timeline items.
    pub fn today_completed_timeline(&self) -> Vec<&Block> {
        self.completed_timeline_by_date(&local_today())
    }

    /// Today's completed todos.
    pub fn today_completed_todos(&self) -> Vec<&Block> {
        self.completed_todos_by_date(&local_today())
    }

    /// Today's archived timeline items.
    pub fn today_archived_timeline(&self) -> Vec<&Block> {
        self.archived_timeline_by_date(&local_today())
    }

    /// Today's archived todos.
    pub fn today_archived_todos(&self) -> Vec<&Block> {
        self.archived_todos_by_date(&local_today())
    }

    /// Open backlog blocks carrying the given category tag.
    pub fn backlog_by_type(&self, kind: &str) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| {
                b.is_backlog()
                    && b.has_kind(kind)
                    && !b.is_completed
                    && !b.is_archived
                    && !b.is_deleted
            })
            .collect()
    }

    /// Completed backlog blocks carrying the given category tag.
    pub fn completed_backlog_by_type(&self, kind: &str) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| {
                b.is_backlog()
                    && b.has_kind(kind)
                    && b.is_completed
                    && !b.is_archived
                    && !b.is_deleted
            })
            .collect()
    }

    /// Archived backlog blocks carrying the given category tag.
    ///
    /// Filters deletion only; completed and timed blocks stay visible here.
    pub fn archived_backlog_by_type(&self, kind: &str) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| b.is_backlog() && b.has_kind(kind) && b.is_archived && !b.is_deleted)
            .collect()
    }

    /// All blocks on the given date that are neither archived nor deleted.
    pub fn blocks_by_date(&self, date: &str) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| b.on_date(date) && !b.is_archived && !b.is_deleted)
            .collect()
    }

    /// Open timeline items on the given date, sorted ascending by time.
    pub fn timeline_by_date(&self, date: &str) -> Vec<&Block> {
        let mut items: Vec<&Block> = self
            .blocks
            .iter()
            .filter(|b| {
                b.on_date(date)
                    && b.has_time()
                    && !b.is_completed
                    && !b.is_archived
                    && !b.is_deleted
            })
            .collect();
        items.sort_by(|a, b| a.time.cmp(&b.time));
        items
    }

    /// Open todos on the given date.
    pub fn todos_by_date(&self, date: &str) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| {
                b.on_date(date)
                    && !b.has_time()
                    && !b.is_completed
                    && !b.is_archived
                    && !b.is_deleted
            })
            .collect()
    }

    /// Completed timeline items on the given date.
    pub fn completed_timeline_by_date(&self, date: &str) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| {
                b.on_date(date)
                    && b.has_time()
                    && b.is_completed
                    && !b.is_archived
                    && !b.is_deleted
            })
            .collect()
    }

    /// Completed todos on the given date.
    pub fn completed_todos_by_date(&self, date: &str) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| {
                b.on_date(date)
                    && !b.has_time()
                    && b.is_completed
                    && !b.is_archived
                    && !b.is_deleted
            })
            .collect()
    }

    /// Archived timeline items on the given date (completion not filtered).
    pub fn archived_timeline_by_date(&self, date: &str) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| b.on_date(date) && b.has_time() && b.is_archived && !b.is_deleted)
            .collect()
    }

    /// Archived todos on the given date (completion not filtered).
    pub fn archived_todos_by_date(&self, date: &str) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| b.on_date(date) && !b.has_time() && b.is_archived && !b.is_deleted)
            .collect()
    }

    // Filters archival only; soft-deleted blocks stay visible here.
    fn blocks_by_date_inner(&self, date: &str) -> Vec<&Block> {
        self.blocks
            .iter()
            .filter(|b| b.on_date(date) && !b.is_archived)
            .collect()
    }
}
