//! Durable household and user records.
//!
//! These are the server-side entities; the member/task working set lives in
//! session snapshots until a draft is committed.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Database identifier of a household.
pub type HouseholdId = i64;

/// Database identifier of a user account.
pub type UserId = i64;

/// A persisted household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub id: HouseholdId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A registered user account.
///
/// The password hash never leaves the repository layer in serialized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
