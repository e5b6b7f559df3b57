//! Column domain model.
//!
//! # Responsibility
//! - Define the organizational lane record used by board views.
//! - Round-trip caller-supplied schemaless fields without interpreting them.
//!
//! # Invariants
//! - `id` is stable and never reused for another column.
//! - Active and archived columns are disjoint partitions of the column set.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Stable identifier assigned by the document store on insert.
pub type ColumnId = Uuid;

/// An organizational lane for grouping blocks in a board view.
///
/// Columns are schemaless beyond `is_archived`: whatever fields the caller
/// supplies (name, color, sort order, ...) are stored verbatim in `extra` and
/// returned unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Insert payload for a new column.
///
/// `is_archived` defaults to `false` unless the caller overrides it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnDraft {
    pub is_archived: bool,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ColumnDraft {
    /// Creates a draft carrying one named field, the common board case.
    pub fn with_field(key: impl Into<String>, value: Value) -> Self {
        let mut extra = BTreeMap::new();
        extra.insert(key.into(), value);
        Self {
            is_archived: false,
            extra,
        }
    }
}

/// Field-level patch merged into a stored column.
///
/// `extra` entries overwrite same-named stored fields; absent keys are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnPatch {
    pub is_archived: Option<bool>,
    pub extra: BTreeMap<String, Value>,
}

impl Column {
    /// Builds the stored record for a draft plus a store-assigned id.
    pub fn from_draft(id: ColumnId, draft: &ColumnDraft) -> Self {
        Self {
            id,
            is_archived: draft.is_archived,
            extra: draft.extra.clone(),
        }
    }

    /// Merges a field-level patch into this column.
    pub fn apply_patch(&mut self, patch: &ColumnPatch) {
        if let Some(is_archived) = patch.is_archived {
            self.is_archived = is_archived;
        }
        for (key, value) in &patch.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}
