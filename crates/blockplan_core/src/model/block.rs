//! Block domain model.
//!
//! # Responsibility
//! - Define the schedule-able block record and its draft/patch companions.
//! - Provide lifecycle helpers for completion, archival and duplication.
//!
//! # Invariants
//! - `id` is stable and never reused for another block.
//! - `date` uses ISO `YYYY-MM-DD`; `time` uses zero-padded `HH:MM`, so plain
//!   string ordering is chronological ordering.
//! - A block without `date` is a backlog item; a dated block with `time` is a
//!   timeline item, without `time` a todo item.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier assigned by the document store on insert.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type BlockId = Uuid;

/// Localized title suffix appended when duplicating a block.
pub const DUPLICATE_TITLE_SUFFIX: &str = "(Copia)";

/// One checklist entry inside a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubItem {
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl SubItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }
}

/// A schedule-able item: task, todo or time-block.
///
/// Field renames follow the external document schema (camelCase, `type` for
/// the category tag), so stored documents stay readable by other clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Store-assigned stable identity.
    pub id: BlockId,
    pub title: String,
    /// ISO `YYYY-MM-DD`. `None` means the block sits in the backlog.
    pub date: Option<String>,
    /// Zero-padded `HH:MM`. Presence makes this a timeline item.
    pub time: Option<String>,
    /// Category tag used for backlog grouping.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Ordered checklist of sub-items.
    #[serde(default)]
    pub content: Vec<SubItem>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_archived: bool,
    /// Soft delete tombstone; derived views hide tombstoned blocks.
    #[serde(default)]
    pub is_deleted: bool,
    /// Local calendar date of completion, cleared on un-completion.
    pub completed_at: Option<String>,
}

/// Insert payload for a new block.
///
/// The store assigns the identity; lifecycle flags default to `false` but a
/// caller-supplied draft may override them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockDraft {
    pub title: String,
    pub date: Option<String>,
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub content: Vec<SubItem>,
    pub is_completed: bool,
    pub is_archived: bool,
    pub is_deleted: bool,
    pub completed_at: Option<String>,
}

impl BlockDraft {
    /// Creates a draft with only a title set.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Three-state merge instruction for an optional document field.
///
/// `Keep` leaves the stored value untouched, `Set` overwrites it and `Clear`
/// writes an explicit null. This mirrors partial-document merges where
/// "absent" and "null" mean different things.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Set(T),
    Clear,
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Self::Keep
    }
}

impl<T: Clone> Patch<T> {
    /// Applies this instruction to a stored optional field.
    pub fn apply_to(&self, slot: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Set(value) => *slot = Some(value.clone()),
            Self::Clear => *slot = None,
        }
    }
}

/// Field-level patch merged into a stored block.
///
/// `Option` fields use `None` to mean "keep"; clearable document fields use
/// [`Patch`] so callers can distinguish "keep" from "write null".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockPatch {
    pub title: Option<String>,
    pub date: Patch<String>,
    pub time: Patch<String>,
    pub kind: Patch<String>,
    pub content: Option<Vec<SubItem>>,
    pub is_completed: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_deleted: Option<bool>,
    pub completed_at: Patch<String>,
}

impl Block {
    /// Builds the stored record for a draft plus a store-assigned id.
    pub fn from_draft(id: BlockId, draft: &BlockDraft) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            date: draft.date.clone(),
            time: draft.time.clone(),
            kind: draft.kind.clone(),
            content: draft.content.clone(),
            is_completed: draft.is_completed,
            is_archived: draft.is_archived,
            is_deleted: draft.is_deleted,
            completed_at: draft.completed_at.clone(),
        }
    }

    /// Merges a field-level patch into this block.
    ///
    /// This is the single place that defines merge semantics; the store calls
    /// it on the authoritative copy before persisting.
    pub fn apply_patch(&mut self, patch: &BlockPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        patch.date.apply_to(&mut self.date);
        patch.time.apply_to(&mut self.time);
        patch.kind.apply_to(&mut self.kind);
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(is_completed) = patch.is_completed {
            self.is_completed = is_completed;
        }
        if let Some(is_archived) = patch.is_archived {
            self.is_archived = is_archived;
        }
        if let Some(is_deleted) = patch.is_deleted {
            self.is_deleted = is_deleted;
        }
        patch.completed_at.apply_to(&mut self.completed_at);
    }

    /// Builds the insert payload for a duplicate of this block.
    ///
    /// # Contract
    /// - Identity is stripped; the store assigns a fresh one on insert.
    /// - Title gains the copy suffix.
    /// - `is_completed`, `is_archived`, `completed_at` and every sub-item
    ///   `done` flag reset to their pristine state; all other fields copy.
    pub fn duplicate_draft(&self) -> BlockDraft {
        BlockDraft {
            title: format!("{} {DUPLICATE_TITLE_SUFFIX}", self.title),
            date: self.date.clone(),
            time: self.time.clone(),
            kind: self.kind.clone(),
            content: self
                .content
                .iter()
                .map(|item| SubItem {
                    text: item.text.clone(),
                    done: false,
                })
                .collect(),
            is_completed: false,
            is_archived: false,
            is_deleted: self.is_deleted,
            completed_at: None,
        }
    }

    /// Returns whether this block sits in the backlog (no assigned date).
    pub fn is_backlog(&self) -> bool {
        self.date.is_none()
    }

    /// Returns whether this block is scheduled on the given date.
    pub fn on_date(&self, date: &str) -> bool {
        self.date.as_deref() == Some(date)
    }

    /// Returns whether this block is a timeline item (has a time-of-day).
    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    /// Returns whether this block carries the given category tag.
    pub fn has_kind(&self, kind: &str) -> bool {
        self.kind.as_deref() == Some(kind)
    }
}
