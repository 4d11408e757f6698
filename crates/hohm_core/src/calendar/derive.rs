//! Pure derivations over the member registry and task store.
//!
//! # Invariants
//! - Filters preserve task store (insertion) order.
//! - Average ratings are computed on exact integer sums and rounded half-up
//!   to one decimal.

use crate::model::member::Member;
use crate::model::task::Task;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Points announced to a member for each completed task.
pub const POINTS_PER_COMPLETED_TASK: u32 = 10;

/// Color used for assignees missing from the member registry.
pub const UNKNOWN_MEMBER_COLOR: &str = "#000";

/// Badge state of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayMarker {
    /// No task falls on the day.
    NoTasks,
    /// Every task on the day is completed.
    AllComplete,
    /// At least one task on the day is still open.
    SomeIncomplete,
}

impl DayMarker {
    /// Glyph rendered under the day tile, if any.
    pub fn badge(self) -> Option<&'static str> {
        match self {
            Self::NoTasks => None,
            Self::AllComplete => Some("✅"),
            Self::SomeIncomplete => Some("📌"),
        }
    }
}

/// Mean rating with one fractional digit, stored as tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AverageRating {
    tenths: u32,
}

impl AverageRating {
    /// Rounds `sum / count` half-up to tenths. `count` must be non-zero.
    fn from_sum(sum: u32, count: u32) -> Self {
        let (sum, count) = (u64::from(sum), u64::from(count));
        let tenths = (20 * sum + count) / (2 * count);
        Self {
            tenths: tenths as u32,
        }
    }

    pub fn tenths(self) -> u32 {
        self.tenths
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.tenths) / 10.0
    }
}

impl Display for AverageRating {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.tenths / 10, self.tenths % 10)
    }
}

/// Tasks scheduled on `date`, in store order.
pub fn tasks_for_date(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|task| task.date == date).collect()
}

/// Badge state for `date`.
pub fn day_marker(tasks: &[Task], date: NaiveDate) -> DayMarker {
    let mut day = tasks.iter().filter(|task| task.date == date).peekable();
    if day.peek().is_none() {
        return DayMarker::NoTasks;
    }
    if day.all(|task| task.completed) {
        DayMarker::AllComplete
    } else {
        DayMarker::SomeIncomplete
    }
}

/// Tasks assigned to `member_name` (exact match), in store order.
pub fn member_tasks<'a>(tasks: &'a [Task], member_name: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| task.assigned_to == member_name)
        .collect()
}

/// Mean of the ratings on tasks assigned to `member_name`.
///
/// Returns `None` when the member has no rated task; an unrated member is
/// not the same as a poorly rated one.
pub fn member_average_rating(tasks: &[Task], member_name: &str) -> Option<AverageRating> {
    let (sum, count) = tasks
        .iter()
        .filter(|task| task.assigned_to == member_name)
        .filter_map(|task| task.rating)
        .fold((0u32, 0u32), |(sum, count), rating| {
            (sum + u32::from(rating.get()), count + 1)
        });

    if count == 0 {
        None
    } else {
        Some(AverageRating::from_sum(sum, count))
    }
}

/// Distinct dates carrying at least one task.
pub fn task_dates(tasks: &[Task]) -> BTreeSet<NaiveDate> {
    tasks.iter().map(|task| task.date).collect()
}

/// Points earned by `member_name`: a fixed award per completed task.
pub fn member_points(tasks: &[Task], member_name: &str) -> u32 {
    let completed = tasks
        .iter()
        .filter(|task| task.assigned_to == member_name && task.completed)
        .count() as u32;
    completed * POINTS_PER_COMPLETED_TASK
}

/// Legend color for `name`, falling back to black for unknown assignees.
pub fn member_color<'a>(members: &'a [Member], name: &str) -> &'a str {
    members
        .iter()
        .find(|member| member.name == name)
        .map_or(UNKNOWN_MEMBER_COLOR, |member| member.color.as_str())
}

#[cfg(test)]
mod tests {
    use super::{
        day_marker, member_average_rating, member_color, member_points, member_tasks,
        task_dates, tasks_for_date, AverageRating, DayMarker,
    };
    use crate::model::member::Member;
    use crate::model::task::{parse_task_date, Rating, Task};

    fn task(title: &str, date: &str, assignee: &str) -> Task {
        Task::new(title, parse_task_date(date).unwrap(), "09:00", assignee).unwrap()
    }

    fn rated(mut task: Task, rating: i64) -> Task {
        task.completed = true;
        task.rating = Some(Rating::new(rating).unwrap());
        task
    }

    #[test]
    fn tasks_for_date_keeps_store_order() {
        let tasks = vec![
            task("b", "2024-06-01", "Ava"),
            task("x", "2024-06-02", "Ava"),
            task("a", "2024-06-01", "Ben"),
        ];
        let day = parse_task_date("2024-06-01").unwrap();

        let titles: Vec<&str> = tasks_for_date(&tasks, day)
            .into_iter()
            .map(|task| task.title.as_str())
            .collect();
        assert_eq!(titles, vec!["b", "a"]);

        let empty = parse_task_date("2024-07-01").unwrap();
        assert!(tasks_for_date(&tasks, empty).is_empty());
    }

    #[test]
    fn day_marker_covers_all_states() {
        let day = parse_task_date("2024-06-01").unwrap();
        assert_eq!(day_marker(&[], day), DayMarker::NoTasks);

        let mut tasks = vec![task("a", "2024-06-01", "Ava"), task("b", "2024-06-01", "Ava")];
        assert_eq!(day_marker(&tasks, day), DayMarker::SomeIncomplete);

        tasks[0].completed = true;
        assert_eq!(day_marker(&tasks, day), DayMarker::SomeIncomplete);

        tasks[1].completed = true;
        assert_eq!(day_marker(&tasks, day), DayMarker::AllComplete);
        assert_eq!(DayMarker::AllComplete.badge(), Some("✅"));
        assert_eq!(DayMarker::SomeIncomplete.badge(), Some("📌"));
        assert_eq!(DayMarker::NoTasks.badge(), None);
    }

    #[test]
    fn average_rating_ignores_unrated_and_other_members() {
        let tasks = vec![
            rated(task("a", "2024-06-01", "Ava"), 4),
            rated(task("b", "2024-06-02", "Ava"), 5),
            rated(task("c", "2024-06-03", "Ava"), 5),
            task("d", "2024-06-03", "Ava"),
            rated(task("e", "2024-06-03", "Ben"), 1),
        ];

        let avg = member_average_rating(&tasks, "Ava").unwrap();
        assert_eq!(avg.to_string(), "4.7");
        assert_eq!(member_average_rating(&tasks, "Ben").unwrap().to_string(), "1.0");
        assert_eq!(member_average_rating(&tasks, "Cy"), None);
    }

    #[test]
    fn average_rating_rounds_half_up() {
        assert_eq!(AverageRating::from_sum(17, 4).to_string(), "4.3");
        assert_eq!(AverageRating::from_sum(9, 2).to_string(), "4.5");
        assert_eq!(AverageRating::from_sum(4, 1).to_string(), "4.0");
        assert_eq!(AverageRating::from_sum(5, 3).to_string(), "1.7");
        assert_eq!(AverageRating::from_sum(10, 6).tenths(), 17);
    }

    #[test]
    fn member_filters_and_points() {
        let mut tasks = vec![
            task("a", "2024-06-01", "Ava"),
            task("b", "2024-06-01", "ava"),
            task("c", "2024-06-02", "Ava"),
        ];
        tasks[2].completed = true;

        assert_eq!(member_tasks(&tasks, "Ava").len(), 2);
        assert_eq!(member_points(&tasks, "Ava"), 10);
        assert_eq!(member_points(&tasks, "Ben"), 0);
        assert_eq!(task_dates(&tasks).len(), 2);
    }

    #[test]
    fn member_color_falls_back_for_unknown_names() {
        let members = vec![Member::with_color("Ava", "a@x.com", "#12ab34").unwrap()];
        assert_eq!(member_color(&members, "Ava"), "#12ab34");
        assert_eq!(member_color(&members, "Ben"), "#000");
    }
}
