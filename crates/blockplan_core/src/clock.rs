//! Local calendar date helpers.
//!
//! # Responsibility
//! - Compute "today" from local wall-clock time, not UTC.
//!
//! # Invariants
//! - Output is ISO `YYYY-MM-DD` with zero-padded month and day.
//! - The machine's local timezone decides the date, so a block completed at
//!   23:59 local time lands on the local day even when UTC already rolled
//!   over.

use chrono::{Datelike, Local};

/// Returns the current local calendar date as `YYYY-MM-DD`.
pub fn local_today() -> String {
    let now = Local::now();
    format_ymd(now.year(), now.month(), now.day())
}

fn format_ymd(year: i32, month: u32, day: u32) -> String {
    format!("{year:04}-{month:02}-{day:02}")
}
