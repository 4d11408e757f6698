//! User account repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `email` is unique; duplicate inserts surface as `RepoError::Conflict`.
//! - Only password hashes are stored, never plaintext.

use super::{timestamp_from_millis, RepoError, RepoResult};
use crate::model::household::{User, UserId};
use rusqlite::{params, Connection, ErrorCode, Row};

const USER_SELECT_SQL: &str = "SELECT id, name, email, password_hash, created_at FROM users";

/// Input for account creation; `password_hash` is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Repository interface for user accounts.
pub trait UserRepository {
    fn create_user(&self, user: &NewUser<'_>) -> RepoResult<User>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn count_users(&self) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &NewUser<'_>) -> RepoResult<User> {
        let inserted = self.conn.execute(
            "INSERT INTO users (name, email, password_hash) VALUES (?1, ?2, ?3);",
            params![user.name, user.email, user.password_hash],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                return Err(RepoError::Conflict(user.email.to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        let id = self.conn.last_insert_rowid();
        self.get_user(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created user {id} missing on read-back"))
        })
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let sql = format!("{USER_SELECT_SQL} WHERE email = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([email])?;
        match rows.next()? {
            Some(row) => parse_user_row(row).map(Some),
            None => Ok(None),
        }
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let sql = format!("{USER_SELECT_SQL} WHERE id = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => parse_user_row(row).map(Some),
            None => Ok(None),
        }
    }

    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: timestamp_from_millis("users.created_at", row.get("created_at")?)?,
    })
}
