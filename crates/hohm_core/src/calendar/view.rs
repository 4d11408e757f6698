//! Calendar view controller.
//!
//! # Responsibility
//! - Load the household working set from a snapshot store.
//! - Track the selected date, task and member.
//! - Apply comment, completion and rating edits through the mutation
//!   primitive and persist the whole task list after each one.
//!
//! # Invariants
//! - The selected task is held by `TaskId` and resolved against the current
//!   task list on every read, never against a pre-mutation copy.
//! - Rating is only accepted while the selected task is completed.

use super::derive::{
    day_marker, member_average_rating, member_color, member_points, member_tasks, task_dates,
    tasks_for_date, AverageRating, DayMarker,
};
use super::mutate::{append_comment, mutate_task_by_id, set_rating, toggle_completed};
use crate::model::member::Member;
use crate::model::task::{Rating, Task, TaskId, TaskValidationError};
use crate::session::{
    load_members, load_tasks_pinning_ids, save_tasks, SnapshotError, SnapshotStore,
};
use chrono::NaiveDate;
use log::info;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CalendarError {
    /// Members or tasks were never saved; setup has to run first.
    SetupRequired,
    NoTaskSelected,
    UnknownTask(TaskId),
    /// Rating requested on a task that is not completed.
    TaskNotCompleted(TaskId),
    InvalidRating(TaskValidationError),
    Snapshot(SnapshotError),
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SetupRequired => write!(f, "household setup has not been completed"),
            Self::NoTaskSelected => write!(f, "no task is selected"),
            Self::UnknownTask(id) => write!(f, "task not found: {id}"),
            Self::TaskNotCompleted(id) => write!(f, "task {id} must be completed before rating"),
            Self::InvalidRating(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CalendarError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRating(err) => Some(err),
            Self::Snapshot(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SnapshotError> for CalendarError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Result of a completion toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// `true` when the task moved from open to completed.
    pub just_completed: bool,
}

/// One legend row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub name: String,
    pub color: String,
    pub average_rating: Option<AverageRating>,
    pub points: u32,
}

/// Calendar state over a snapshot store.
pub struct CalendarView<S: SnapshotStore> {
    store: S,
    members: Vec<Member>,
    tasks: Vec<Task>,
    selected_date: Option<NaiveDate>,
    selected_task: Option<TaskId>,
    selected_member: Option<String>,
}

impl<S: SnapshotStore> CalendarView<S> {
    /// Loads members and tasks; both snapshots must exist.
    pub fn open(mut store: S) -> Result<Self, CalendarError> {
        let members = load_members(&store)?;
        let tasks = load_tasks_pinning_ids(&mut store)?;
        let (Some(members), Some(tasks)) = (members, tasks) else {
            return Err(CalendarError::SetupRequired);
        };

        info!(
            "event=calendar_open module=calendar status=ok members={} tasks={}",
            members.len(),
            tasks.len()
        );

        Ok(Self {
            store,
            members,
            tasks,
            selected_date: None,
            selected_task: None,
            selected_member: None,
        })
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Dates to highlight on the month grid.
    pub fn task_dates(&self) -> BTreeSet<NaiveDate> {
        task_dates(&self.tasks)
    }

    pub fn day_marker(&self, date: NaiveDate) -> DayMarker {
        day_marker(&self.tasks, date)
    }

    /// Selects a day and returns its tasks.
    pub fn select_date(&mut self, date: NaiveDate) -> Vec<&Task> {
        self.selected_date = Some(date);
        tasks_for_date(&self.tasks, date)
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    /// Tasks of the selected day; empty when no day is selected.
    pub fn selected_date_tasks(&self) -> Vec<&Task> {
        self.selected_date
            .map(|date| tasks_for_date(&self.tasks, date))
            .unwrap_or_default()
    }

    /// Opens the task detail for `id`.
    pub fn select_task(&mut self, id: TaskId) -> Result<&Task, CalendarError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(CalendarError::UnknownTask(id))?;
        self.selected_task = Some(id);
        Ok(&self.tasks[index])
    }

    pub fn close_task(&mut self) {
        self.selected_task = None;
    }

    /// The open task, read from the current task list.
    pub fn selected_task(&self) -> Option<&Task> {
        let id = self.selected_task?;
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Appends a comment to the open task.
    ///
    /// Blank input is ignored and returns `Ok(None)`; otherwise the comment
    /// is stored as typed and returned.
    pub fn add_comment(&mut self, text: &str) -> Result<Option<String>, CalendarError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        let id = self.require_selected()?.id;
        self.apply(id, append_comment(text))?;
        Ok(Some(text.to_string()))
    }

    /// Flips completion of the open task.
    pub fn toggle_completed(&mut self) -> Result<ToggleOutcome, CalendarError> {
        let task = self.require_selected()?;
        let (id, was_completed) = (task.id, task.completed);
        self.apply(id, toggle_completed())?;
        Ok(ToggleOutcome {
            just_completed: !was_completed,
        })
    }

    /// Sets the rating of the open, completed task.
    pub fn set_rating(&mut self, value: i64) -> Result<Rating, CalendarError> {
        let task = self.require_selected()?;
        if !task.completed {
            return Err(CalendarError::TaskNotCompleted(task.id));
        }
        let id = task.id;
        let rating = Rating::new(value).map_err(CalendarError::InvalidRating)?;
        self.apply(id, set_rating(rating))?;
        Ok(rating)
    }

    /// Selects a member and returns the tasks assigned to them.
    pub fn select_member(&mut self, name: &str) -> Vec<&Task> {
        self.selected_member = Some(name.to_string());
        member_tasks(&self.tasks, name)
    }

    pub fn close_member(&mut self) {
        self.selected_member = None;
    }

    pub fn selected_member(&self) -> Option<&Member> {
        let name = self.selected_member.as_deref()?;
        self.members.iter().find(|member| member.name == name)
    }

    pub fn member_color(&self, name: &str) -> &str {
        member_color(&self.members, name)
    }

    /// Email of the member a task is assigned to, when registered.
    pub fn assignee_email(&self, task: &Task) -> Option<&str> {
        self.members
            .iter()
            .find(|member| member.name == task.assigned_to)
            .map(|member| member.email.as_str())
    }

    /// Legend rows in member order.
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.members
            .iter()
            .map(|member| LegendEntry {
                name: member.name.clone(),
                color: member.color.clone(),
                average_rating: member_average_rating(&self.tasks, &member.name),
                points: member_points(&self.tasks, &member.name),
            })
            .collect()
    }

    fn require_selected(&self) -> Result<&Task, CalendarError> {
        let id = self.selected_task.ok_or(CalendarError::NoTaskSelected)?;
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or(CalendarError::UnknownTask(id))
    }

    fn apply<F>(&mut self, id: TaskId, patch: F) -> Result<(), CalendarError>
    where
        F: FnMut(Task) -> Task,
    {
        let updated = mutate_task_by_id(self.tasks.clone(), id, patch);
        save_tasks(&mut self.store, &updated)?;
        self.tasks = updated;
        Ok(())
    }
}
