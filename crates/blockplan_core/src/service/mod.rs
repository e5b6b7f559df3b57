//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level planner APIs.
//! - Keep UI layers decoupled from storage details.

pub mod task_store;
