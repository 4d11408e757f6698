//! Household domain model: members, tasks and the durable household/user
//! records.
//!
//! # Responsibility
//! - Define canonical data structures shared by derivation, session and
//!   storage layers.
//! - Keep the member/task JSON shape compatible with session snapshots.
//!
//! # Invariants
//! - Every task carries a stable surrogate `TaskId`.
//! - Members are immutable once added; aggregates are derived, not stored.

pub mod household;
pub mod member;
pub mod task;
