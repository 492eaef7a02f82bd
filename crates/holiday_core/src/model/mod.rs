//! Domain model for teams, employees and their vacation ranges.
//!
//! # Responsibility
//! - Define immutable value types consumed by the interval engine.
//! - Keep identity explicit (`i64` row ids) instead of live relationships.
//!
//! # Invariants
//! - A `DateRange` always satisfies `start <= end`.
//! - An `Employee` belongs to exactly one team and owns its vacations.

pub mod directory;
pub mod vacation;
