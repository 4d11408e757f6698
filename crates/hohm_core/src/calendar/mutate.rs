//! Single mutation primitive for task edits.
//!
//! Comment-append, completion-toggle and rating-set are all patches applied
//! through `mutate_task` / `mutate_task_by_id`, so every edit path replaces
//! the task list the same way.
//!
//! # Invariants
//! - The task list is consumed and rebuilt; non-matching tasks are moved
//!   through untouched, never cloned.
//! - Patches never change `id`, `title`, `date` or `time`.

use crate::model::task::{Rating, Task, TaskId, TaskKey};

/// Replaces every task matching `key` with `patch(task)`.
///
/// Tasks sharing the same (title, date, time) are all patched.
pub fn mutate_task<F>(tasks: Vec<Task>, key: &TaskKey, mut patch: F) -> Vec<Task>
where
    F: FnMut(Task) -> Task,
{
    tasks
        .into_iter()
        .map(|task| if key.matches(&task) { patch(task) } else { task })
        .collect()
}

/// Replaces the task with surrogate id `id` with `patch(task)`.
pub fn mutate_task_by_id<F>(tasks: Vec<Task>, id: TaskId, mut patch: F) -> Vec<Task>
where
    F: FnMut(Task) -> Task,
{
    tasks
        .into_iter()
        .map(|task| if task.id == id { patch(task) } else { task })
        .collect()
}

/// Patch appending one comment.
pub fn append_comment(text: impl Into<String>) -> impl FnMut(Task) -> Task {
    let text = text.into();
    move |mut task| {
        task.comments.push(text.clone());
        task
    }
}

/// Patch flipping the completion flag. An existing rating is kept.
pub fn toggle_completed() -> impl FnMut(Task) -> Task {
    |mut task| {
        task.completed = !task.completed;
        task
    }
}

/// Patch setting (or overwriting) the rating.
pub fn set_rating(rating: Rating) -> impl FnMut(Task) -> Task {
    move |mut task| {
        task.rating = Some(rating);
        task
    }
}
