//! Task model.
//!
//! # Responsibility
//! - Define the task record rendered by the calendar and mutated by members.
//! - Provide both addressing schemes: surrogate `TaskId` and natural
//!   `TaskKey` (title, date, time).
//!
//! # Invariants
//! - `id` is non-nil and stable for the task lifetime.
//! - `title` and `assigned_to` are non-empty; `time` is `HH:MM` (24h).
//! - `rating`, when present, is within `1..=5`.
//! - `comments` is append-only from callers' perspective.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable surrogate identifier assigned when a task is created.
pub type TaskId = Uuid;

/// Wire format for task dates.
pub const TASK_DATE_FORMAT: &str = "%Y-%m-%d";

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex"));

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    EmptyTitle,
    EmptyAssignee,
    InvalidDate(String),
    InvalidTime(String),
    RatingOutOfRange(i64),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::EmptyAssignee => write!(f, "task assignee must not be empty"),
            Self::InvalidDate(value) => write!(f, "task date `{value}` must be YYYY-MM-DD"),
            Self::InvalidTime(value) => write!(f, "task time `{value}` must be HH:MM"),
            Self::RatingOutOfRange(value) => {
                write!(f, "rating {value} is outside {}..={}", Rating::MIN, Rating::MAX)
            }
        }
    }
}

impl Error for TaskValidationError {}

/// Star rating given to a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Builds a rating, rejecting values outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, TaskValidationError> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(TaskValidationError::RatingOutOfRange(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = TaskValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Natural key used by the calendar to address a task.
///
/// Two tasks with the same title, date and time share a key and are both
/// affected by key-addressed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub title: String,
    pub date: NaiveDate,
    pub time: String,
}

impl TaskKey {
    pub fn new(title: impl Into<String>, date: NaiveDate, time: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date,
            time: time.into(),
        }
    }

    /// Returns whether `task` carries this key.
    pub fn matches(&self, task: &Task) -> bool {
        task.title == self.title && task.date == self.date && task.time == self.time
    }
}

/// One chore assigned to a household member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Calendar day, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Clock time, `HH:MM`.
    pub time: String,
    /// Member name; a denormalized reference, not checked against members.
    pub assigned_to: String,
    pub comments: Vec<String>,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    // Snapshots written before surrogate ids existed get a fresh one.
    #[serde(default = "Uuid::new_v4")]
    id: TaskId,
    title: String,
    date: NaiveDate,
    time: String,
    assigned_to: String,
    #[serde(default)]
    comments: Vec<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    rating: Option<Rating>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(value: TaskRecord) -> Result<Self, Self::Error> {
        let task = Self {
            id: value.id,
            title: value.title,
            date: value.date,
            time: value.time,
            assigned_to: value.assigned_to,
            comments: value.comments,
            completed: value.completed,
            rating: value.rating,
        };
        task.validate()?;
        Ok(task)
    }
}

impl Task {
    /// Creates an incomplete, unrated task with a generated id.
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        time: impl Into<String>,
        assigned_to: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::new_v4(), title, date, time, assigned_to)
    }

    /// Creates a task with a caller-provided id.
    ///
    /// Used by storage read-back where identity already exists.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        date: NaiveDate,
        time: impl Into<String>,
        assigned_to: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            title: title.into().trim().to_string(),
            date,
            time: time.into().trim().to_string(),
            assigned_to: assigned_to.into().trim().to_string(),
            comments: Vec::new(),
            completed: false,
            rating: None,
        };
        task.validate()?;
        Ok(task)
    }

    /// Returns this task's natural key.
    pub fn key(&self) -> TaskKey {
        TaskKey::new(self.title.clone(), self.date, self.time.clone())
    }

    /// Validates task invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.assigned_to.trim().is_empty() {
            return Err(TaskValidationError::EmptyAssignee);
        }
        validate_time(&self.time)
    }
}

/// Parses a `YYYY-MM-DD` task date.
pub fn parse_task_date(value: &str) -> Result<NaiveDate, TaskValidationError> {
    NaiveDate::parse_from_str(value.trim(), TASK_DATE_FORMAT)
        .map_err(|_| TaskValidationError::InvalidDate(value.to_string()))
}

/// Checks a `HH:MM` clock time.
pub fn validate_time(value: &str) -> Result<(), TaskValidationError> {
    if TIME_RE.is_match(value) {
        Ok(())
    } else {
        Err(TaskValidationError::InvalidTime(value.to_string()))
    }
}
