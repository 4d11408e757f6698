//! Core domain logic for HOHM household chore coordination.
//! This crate is the single source of truth for business invariants.

pub mod calendar;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use calendar::derive::{
    day_marker, member_average_rating, member_color, member_points, member_tasks, task_dates,
    tasks_for_date, AverageRating, DayMarker, POINTS_PER_COMPLETED_TASK,
};
pub use calendar::mutate::{
    append_comment, mutate_task, mutate_task_by_id, set_rating, toggle_completed,
};
pub use calendar::view::{CalendarError, CalendarView, LegendEntry, ToggleOutcome};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::household::{Household, HouseholdId, User, UserId};
pub use model::member::{Member, MemberValidationError};
pub use model::task::{parse_task_date, Rating, Task, TaskId, TaskKey, TaskValidationError};
pub use repo::household_repo::{HouseholdRepository, Roster, SqliteHouseholdRepository};
pub use repo::user_repo::{NewUser, SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::account_service::{AccountError, AccountService, SignupRequest};
pub use service::household_service::{CommitSummary, HouseholdService, HouseholdServiceError};
pub use service::notify_service::{
    CommentNotification, MailError, MailReceipt, Mailer, NotifyError, NotifyService,
    OutgoingEmail,
};
pub use session::draft::{DraftError, HouseholdDraft, DRAFT_SCHEMA_VERSION};
pub use session::{
    MemorySnapshotStore, SnapshotError, SnapshotStore, SqliteSnapshotStore, MEMBERS_KEY,
    TASKS_KEY,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
