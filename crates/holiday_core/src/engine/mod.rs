//! Vacation interval engine.
//!
//! # Responsibility
//! - Reconcile day-level edits with range-level storage rows.
//! - Detect overlapping ranges and project ranges onto calendar windows.
//!
//! # Invariants
//! - Every function here is pure and synchronous: no I/O, no shared state.
//! - No day is ever covered by two ranges of the same employee in any output.
//! - Empty inputs produce empty outputs, never errors.

pub mod conflict;
pub mod normalize;
pub mod projector;
pub mod range_set;
pub mod window;
