//! Household repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create and read durable household records.
//! - Replace and read back a household's committed member/task roster.
//!
//! # Invariants
//! - Roster replacement is atomic: readers see the old or the new roster.
//! - Member and task order is preserved through `position` columns.

use super::{bool_to_int, int_to_bool, timestamp_from_millis, RepoError, RepoResult};
use crate::model::household::{Household, HouseholdId};
use crate::model::member::Member;
use crate::model::task::{parse_task_date, Rating, Task, TaskId, TASK_DATE_FORMAT};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use uuid::Uuid;

/// Members and tasks committed for one household.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub members: Vec<Member>,
    pub tasks: Vec<Task>,
}

/// Repository interface for households and their rosters.
pub trait HouseholdRepository {
    fn create_household(&self, name: &str) -> RepoResult<Household>;
    fn get_household(&self, id: HouseholdId) -> RepoResult<Option<Household>>;
    fn count_households(&self) -> RepoResult<u64>;
    fn replace_roster(&self, id: HouseholdId, members: &[Member], tasks: &[Task])
        -> RepoResult<()>;
    fn load_roster(&self, id: HouseholdId) -> RepoResult<Roster>;
}

/// SQLite-backed household repository.
pub struct SqliteHouseholdRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHouseholdRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn ensure_exists(&self, id: HouseholdId) -> RepoResult<()> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM households WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(RepoError::HouseholdNotFound(id));
        }
        Ok(())
    }
}

impl HouseholdRepository for SqliteHouseholdRepository<'_> {
    fn create_household(&self, name: &str) -> RepoResult<Household> {
        self.conn
            .execute("INSERT INTO households (name) VALUES (?1);", [name])?;
        let id = self.conn.last_insert_rowid();
        self.get_household(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created household {id} missing on read-back"))
        })
    }

    fn get_household(&self, id: HouseholdId) -> RepoResult<Option<Household>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM households WHERE id = ?1;",
                [id],
                |row| {
                    Ok((
                        row.get::<_, i64>("id")?,
                        row.get::<_, String>("name")?,
                        row.get::<_, i64>("created_at")?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, name, created_at)| {
            Ok(Household {
                id,
                name,
                created_at: timestamp_from_millis("households.created_at", created_at)?,
            })
        })
        .transpose()
    }

    fn count_households(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM households;", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn replace_roster(
        &self,
        id: HouseholdId,
        members: &[Member],
        tasks: &[Task],
    ) -> RepoResult<()> {
        for member in members {
            member.validate()?;
        }
        for task in tasks {
            task.validate()?;
        }

        let tx = self.conn.unchecked_transaction()?;
        self.ensure_exists(id)?;

        tx.execute("DELETE FROM task_comments WHERE household_id = ?1;", [id])?;
        tx.execute("DELETE FROM household_tasks WHERE household_id = ?1;", [id])?;
        tx.execute("DELETE FROM household_members WHERE household_id = ?1;", [id])?;

        for (position, member) in members.iter().enumerate() {
            tx.execute(
                "INSERT INTO household_members (household_id, position, name, email, color, points)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    id,
                    position as i64,
                    member.name.as_str(),
                    member.email.as_str(),
                    member.color.as_str(),
                    i64::from(member.points),
                ],
            )?;
        }

        for (position, task) in tasks.iter().enumerate() {
            let uuid = task.id.to_string();
            tx.execute(
                "INSERT INTO household_tasks (
                    household_id, uuid, position, title, task_date, task_time,
                    assigned_to, completed, rating
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    id,
                    uuid.as_str(),
                    position as i64,
                    task.title.as_str(),
                    task.date.format(TASK_DATE_FORMAT).to_string(),
                    task.time.as_str(),
                    task.assigned_to.as_str(),
                    bool_to_int(task.completed),
                    task.rating.map(|rating| i64::from(rating.get())),
                ],
            )?;
            for (comment_position, body) in task.comments.iter().enumerate() {
                tx.execute(
                    "INSERT INTO task_comments (household_id, task_uuid, position, body)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![id, uuid.as_str(), comment_position as i64, body.as_str()],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn load_roster(&self, id: HouseholdId) -> RepoResult<Roster> {
        self.ensure_exists(id)?;

        let mut stmt = self.conn.prepare(
            "SELECT name, email, color, points
             FROM household_members
             WHERE household_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }

        let mut comments = load_comments(self.conn, id)?;

        let mut stmt = self.conn.prepare(
            "SELECT uuid, title, task_date, task_time, assigned_to, completed, rating
             FROM household_tasks
             WHERE household_id = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([id])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            let mut task = parse_task_row(row)?;
            task.comments = comments.remove(&task.id).unwrap_or_default();
            tasks.push(task);
        }

        Ok(Roster { members, tasks })
    }
}

fn load_comments(
    conn: &Connection,
    id: HouseholdId,
) -> RepoResult<HashMap<TaskId, Vec<String>>> {
    let mut stmt = conn.prepare(
        "SELECT task_uuid, body
         FROM task_comments
         WHERE household_id = ?1
         ORDER BY task_uuid ASC, position ASC;",
    )?;
    let mut rows = stmt.query([id])?;
    let mut comments: HashMap<TaskId, Vec<String>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let task_id = parse_uuid(&row.get::<_, String>("task_uuid")?, "task_comments.task_uuid")?;
        comments
            .entry(task_id)
            .or_default()
            .push(row.get("body")?);
    }
    Ok(comments)
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let mut member = Member::with_color(
        row.get::<_, String>("name")?,
        row.get::<_, String>("email")?,
        row.get::<_, String>("color")?,
    )?;
    let points: i64 = row.get("points")?;
    member.points = u32::try_from(points).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid points value `{points}` in household_members.points"
        ))
    })?;
    Ok(member)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id = parse_uuid(&row.get::<_, String>("uuid")?, "household_tasks.uuid")?;
    let date = parse_task_date(&row.get::<_, String>("task_date")?)?;
    let mut task = Task::with_id(
        id,
        row.get::<_, String>("title")?,
        date,
        row.get::<_, String>("task_time")?,
        row.get::<_, String>("assigned_to")?,
    )?;
    task.completed = int_to_bool("household_tasks.completed", row.get("completed")?)?;
    task.rating = row
        .get::<_, Option<i64>>("rating")?
        .map(Rating::new)
        .transpose()?;
    Ok(task)
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
