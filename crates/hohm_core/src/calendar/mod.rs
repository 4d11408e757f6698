//! Calendar derivations, the task mutation primitive and the calendar view.
//!
//! # Responsibility
//! - Derive per-day groupings, day markers and per-member aggregates from a
//!   flat task list.
//! - Express every task edit through one mutation primitive.
//! - Drive the calendar interaction flow over a snapshot store.
//!
//! # Invariants
//! - Derivations are total: empty inputs produce empty results or `None`.
//! - Every edit replaces the whole task list and persists it immediately.

pub mod derive;
pub mod mutate;
pub mod view;
