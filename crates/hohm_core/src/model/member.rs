//! Household member model.
//!
//! # Responsibility
//! - Define the member record shown in legends and used as task assignee.
//! - Generate the display color once, at creation time.
//!
//! # Invariants
//! - `name` and `email` are non-empty after trimming.
//! - `color` is a `#rrggbb` hex string and is never recomputed.
//! - `points` is carried for snapshot compatibility; awarded points are
//!   derived from tasks (see `calendar::derive::member_points`).

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid color regex"));

/// Validation failures for member records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberValidationError {
    EmptyName,
    EmptyEmail,
    InvalidColor(String),
}

impl Display for MemberValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "member name must not be empty"),
            Self::EmptyEmail => write!(f, "member email must not be empty"),
            Self::InvalidColor(value) => {
                write!(f, "member color `{value}` must be a #rrggbb hex value")
            }
        }
    }
}

impl Error for MemberValidationError {}

/// One household member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MemberRecord")]
pub struct Member {
    /// Display identifier, unique within a household by convention.
    pub name: String,
    /// Contact address used for comment notifications.
    pub email: String,
    /// Legend color in `#rrggbb` form.
    pub color: String,
    /// Stored accumulator; always `0` for members created by this crate.
    pub points: u32,
}

#[derive(Deserialize)]
struct MemberRecord {
    name: String,
    email: String,
    color: String,
    #[serde(default)]
    points: u32,
}

impl TryFrom<MemberRecord> for Member {
    type Error = MemberValidationError;

    fn try_from(value: MemberRecord) -> Result<Self, Self::Error> {
        let member = Self {
            name: value.name,
            email: value.email,
            color: value.color,
            points: value.points,
        };
        member.validate()?;
        Ok(member)
    }
}

impl Member {
    /// Creates a member with a freshly generated display color.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, MemberValidationError> {
        Self::with_color(name, email, random_color())
    }

    /// Creates a member with a caller-provided color.
    ///
    /// Used by storage read-back and tests where the color already exists.
    pub fn with_color(
        name: impl Into<String>,
        email: impl Into<String>,
        color: impl Into<String>,
    ) -> Result<Self, MemberValidationError> {
        let member = Self {
            name: name.into().trim().to_string(),
            email: email.into().trim().to_string(),
            color: color.into(),
            points: 0,
        };
        member.validate()?;
        Ok(member)
    }

    /// Validates member invariants.
    pub fn validate(&self) -> Result<(), MemberValidationError> {
        if self.name.trim().is_empty() {
            return Err(MemberValidationError::EmptyName);
        }
        if self.email.trim().is_empty() {
            return Err(MemberValidationError::EmptyEmail);
        }
        if !COLOR_RE.is_match(&self.color) {
            return Err(MemberValidationError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }
}

/// Generates a random `#rrggbb` color.
pub fn random_color() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..=0x00FF_FFFF);
    format!("#{value:06x}")
}
