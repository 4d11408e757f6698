//! Session-scoped snapshot storage for the household working set.
//!
//! # Responsibility
//! - Define the key/value contract the calendar and setup flow persist to.
//! - Encode member and task lists as JSON snapshots under fixed keys.
//!
//! # Invariants
//! - Values are whole-list JSON snapshots; every write replaces the value.
//! - No versioning beyond `DRAFT_VERSION_KEY`, no TTL.

use crate::db::DbError;
use crate::model::member::Member;
use crate::model::task::Task;
use log::info;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod draft;
mod sqlite_store;

pub use sqlite_store::SqliteSnapshotStore;

/// Snapshot key holding the member list.
pub const MEMBERS_KEY: &str = "householdMembers";
/// Snapshot key holding the task list.
pub const TASKS_KEY: &str = "householdTasks";
/// Snapshot key holding the draft schema version.
pub const DRAFT_VERSION_KEY: &str = "householdDraftVersion";

pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[derive(Debug)]
pub enum SnapshotError {
    /// Stored text could not be decoded, or a value could not be encoded.
    Codec {
        key: &'static str,
        source: serde_json::Error,
    },
    Db(DbError),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Codec { key, source } => write!(f, "snapshot `{key}` is not valid: {source}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec { source, .. } => Some(source),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for SnapshotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SnapshotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Key/value store holding JSON snapshots.
pub trait SnapshotStore {
    fn get(&self, key: &str) -> SnapshotResult<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> SnapshotResult<()>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &mut S {
    fn get(&self, key: &str) -> SnapshotResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> SnapshotResult<()> {
        (**self).set(key, value)
    }
}

/// In-process store scoped to one session; dropped with it.
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshotStore {
    entries: HashMap<String, String>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn get(&self, key: &str) -> SnapshotResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> SnapshotResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Reads the member snapshot; `None` when never written.
pub fn load_members<S: SnapshotStore + ?Sized>(store: &S) -> SnapshotResult<Option<Vec<Member>>> {
    load_json(store, MEMBERS_KEY)
}

/// Reads the task snapshot; `None` when never written.
pub fn load_tasks<S: SnapshotStore + ?Sized>(store: &S) -> SnapshotResult<Option<Vec<Task>>> {
    load_json(store, TASKS_KEY)
}

/// Reads the task snapshot and writes it straight back when some rows were
/// stored without an `id`, so the ids generated on decode stay stable.
pub fn load_tasks_pinning_ids<S: SnapshotStore + ?Sized>(
    store: &mut S,
) -> SnapshotResult<Option<Vec<Task>>> {
    let Some(text) = store.get(TASKS_KEY)? else {
        return Ok(None);
    };
    let tasks: Vec<Task> = decode(TASKS_KEY, &text)?;
    if rows_missing_ids(&text) {
        save_tasks(store, &tasks)?;
        info!(
            "event=task_ids_assigned module=session status=ok tasks={}",
            tasks.len()
        );
    }
    Ok(Some(tasks))
}

fn rows_missing_ids(text: &str) -> bool {
    serde_json::from_str::<Vec<serde_json::Map<String, serde_json::Value>>>(text)
        .map(|rows| rows.iter().any(|row| !row.contains_key("id")))
        .unwrap_or(false)
}

/// Replaces the member snapshot.
pub fn save_members<S: SnapshotStore + ?Sized>(
    store: &mut S,
    members: &[Member],
) -> SnapshotResult<()> {
    save_json(store, MEMBERS_KEY, members)
}

/// Replaces the task snapshot.
pub fn save_tasks<S: SnapshotStore + ?Sized>(store: &mut S, tasks: &[Task]) -> SnapshotResult<()> {
    save_json(store, TASKS_KEY, tasks)
}

fn load_json<S, T>(store: &S, key: &'static str) -> SnapshotResult<Option<T>>
where
    S: SnapshotStore + ?Sized,
    T: serde::de::DeserializeOwned,
{
    match store.get(key)? {
        Some(text) => decode(key, &text).map(Some),
        None => Ok(None),
    }
}

fn decode<T: serde::de::DeserializeOwned>(key: &'static str, text: &str) -> SnapshotResult<T> {
    serde_json::from_str(text).map_err(|source| SnapshotError::Codec { key, source })
}

fn save_json<S, T>(store: &mut S, key: &'static str, value: &T) -> SnapshotResult<()>
where
    S: SnapshotStore + ?Sized,
    T: serde::Serialize + ?Sized,
{
    let text =
        serde_json::to_string(value).map_err(|source| SnapshotError::Codec { key, source })?;
    store.set(key, text)
}
