//! Domain model for planner documents.
//!
//! # Responsibility
//! - Define the canonical shapes of the two document collections.
//! - Keep patch/merge semantics in one place, next to the data they mutate.
//!
//! # Invariants
//! - Every document is identified by a stable store-assigned id.
//! - A block's display bucket is fully determined by its five predicates
//!   (`date` present, `time` present, `is_completed`, `is_archived`,
//!   `is_deleted`).

pub mod block;
pub mod column;
