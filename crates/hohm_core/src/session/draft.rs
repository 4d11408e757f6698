//! Household setup draft.
//!
//! # Responsibility
//! - Hold the members and tasks a user builds up before reaching the
//!   calendar, without a server round trip per step.
//! - Gate flow steps (members before tasks, tasks before calendar).
//! - Provide a versioned shape that `HouseholdService::commit_draft`
//!   reconciles into durable storage.
//!
//! # Invariants
//! - `schema_version` never exceeds `DRAFT_SCHEMA_VERSION`.
//! - Every task assignee names a member of the draft.
//! - Task ids are unique within the draft.

use super::{
    load_members, load_tasks_pinning_ids, save_members, save_tasks, SnapshotError,
    SnapshotStore, DRAFT_VERSION_KEY,
};
use crate::model::member::{Member, MemberValidationError};
use crate::model::task::{parse_task_date, Task, TaskId, TaskValidationError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Current draft schema version.
pub const DRAFT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug)]
pub enum DraftError {
    MissingMemberFields,
    InvalidMember(MemberValidationError),
    MissingTaskFields,
    InvalidTask(TaskValidationError),
    UnknownAssignee(String),
    DuplicateTaskId(TaskId),
    NoMembers,
    NoTasks,
    UnsupportedSchemaVersion { found: u32, supported: u32 },
    /// The stored version marker is not a number.
    CorruptSchemaVersion(String),
    Snapshot(SnapshotError),
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMemberFields => write!(f, "Both name and email are required."),
            Self::InvalidMember(err) => write!(f, "{err}"),
            Self::MissingTaskFields => write!(f, "Please fill in all fields."),
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::UnknownAssignee(name) => write!(f, "`{name}` is not a household member"),
            Self::DuplicateTaskId(id) => write!(f, "task id {id} appears more than once"),
            Self::NoMembers => write!(f, "Please add at least one household member."),
            Self::NoTasks => write!(f, "Please add at least one task."),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "draft schema version {found} is newer than supported {supported}"
            ),
            Self::CorruptSchemaVersion(text) => {
                write!(f, "stored draft schema version `{text}` is not a number")
            }
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DraftError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidMember(err) => Some(err),
            Self::InvalidTask(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MemberValidationError> for DraftError {
    fn from(value: MemberValidationError) -> Self {
        Self::InvalidMember(value)
    }
}

impl From<TaskValidationError> for DraftError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<SnapshotError> for DraftError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Members and tasks collected during household setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdDraft {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

fn default_schema_version() -> u32 {
    DRAFT_SCHEMA_VERSION
}

impl Default for HouseholdDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl HouseholdDraft {
    pub fn new() -> Self {
        Self {
            schema_version: DRAFT_SCHEMA_VERSION,
            members: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Registers a member with a generated color.
    pub fn add_member(&mut self, name: &str, email: &str) -> Result<&Member, DraftError> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(DraftError::MissingMemberFields);
        }
        self.members.push(Member::new(name, email)?);
        Ok(&self.members[self.members.len() - 1])
    }

    /// Appends a task assigned to an existing member.
    pub fn add_task(
        &mut self,
        title: &str,
        date: &str,
        time: &str,
        assigned_to: &str,
    ) -> Result<&Task, DraftError> {
        if [title, date, time, assigned_to]
            .iter()
            .any(|value| value.trim().is_empty())
        {
            return Err(DraftError::MissingTaskFields);
        }
        let assigned_to = assigned_to.trim();
        if !self.has_member(assigned_to) {
            return Err(DraftError::UnknownAssignee(assigned_to.to_string()));
        }
        let task = Task::new(title, parse_task_date(date)?, time, assigned_to)?;
        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Gate before task assignment.
    pub fn ensure_members(&self) -> Result<(), DraftError> {
        if self.members.is_empty() {
            Err(DraftError::NoMembers)
        } else {
            Ok(())
        }
    }

    /// Gate before opening the calendar.
    pub fn ensure_tasks(&self) -> Result<(), DraftError> {
        self.ensure_members()?;
        if self.tasks.is_empty() {
            Err(DraftError::NoTasks)
        } else {
            Ok(())
        }
    }

    /// Checks the whole draft before it is committed.
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.schema_version > DRAFT_SCHEMA_VERSION {
            return Err(DraftError::UnsupportedSchemaVersion {
                found: self.schema_version,
                supported: DRAFT_SCHEMA_VERSION,
            });
        }
        for member in &self.members {
            member.validate()?;
        }
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            task.validate()?;
            if !self.has_member(&task.assigned_to) {
                return Err(DraftError::UnknownAssignee(task.assigned_to.clone()));
            }
            if !seen.insert(task.id) {
                return Err(DraftError::DuplicateTaskId(task.id));
            }
        }
        Ok(())
    }

    /// Writes members, tasks and schema version to the snapshot store.
    pub fn save<S: SnapshotStore + ?Sized>(&self, store: &mut S) -> Result<(), DraftError> {
        store.set(DRAFT_VERSION_KEY, self.schema_version.to_string())?;
        save_members(store, &self.members)?;
        save_tasks(store, &self.tasks)?;
        Ok(())
    }

    /// Reads a draft back; `None` when no member snapshot exists yet.
    ///
    /// Stores written without a version key are read as version 1. Tasks
    /// stored without ids get theirs written back.
    pub fn load<S: SnapshotStore + ?Sized>(store: &mut S) -> Result<Option<Self>, DraftError> {
        let schema_version = match store.get(DRAFT_VERSION_KEY)? {
            Some(text) => text
                .trim()
                .parse::<u32>()
                .map_err(|_| DraftError::CorruptSchemaVersion(text.trim().to_string()))?,
            None => DRAFT_SCHEMA_VERSION,
        };
        if schema_version > DRAFT_SCHEMA_VERSION {
            return Err(DraftError::UnsupportedSchemaVersion {
                found: schema_version,
                supported: DRAFT_SCHEMA_VERSION,
            });
        }

        let Some(members) = load_members(&*store)? else {
            return Ok(None);
        };
        let tasks = load_tasks_pinning_ids(store)?.unwrap_or_default();
        Ok(Some(Self {
            schema_version,
            members,
            tasks,
        }))
    }

    fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|member| member.name == name)
    }
}
