//! Account use-case service: signup and credential checks.
//!
//! # Invariants
//! - An email is registered at most once.
//! - Passwords are stored as bcrypt hashes only.
//! - Credential checks answer a plain success/failure; no session state.

use crate::model::household::User;
use crate::repo::user_repo::{NewUser, UserRepository};
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// bcrypt cost used for stored password hashes.
pub const PASSWORD_HASH_COST: u32 = 10;

#[derive(Debug)]
pub enum AccountError {
    MissingFields,
    EmailInUse,
    Hash(bcrypt::BcryptError),
    Repo(RepoError),
}

impl Display for AccountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFields => write!(f, "Missing fields"),
            Self::EmailInUse => write!(f, "Email already in use"),
            Self::Hash(err) => write!(f, "password hashing failed: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Hash(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AccountError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Conflict(_) => Self::EmailInUse,
            other => Self::Repo(other),
        }
    }
}

impl From<bcrypt::BcryptError> for AccountError {
    fn from(value: bcrypt::BcryptError) -> Self {
        Self::Hash(value)
    }
}

/// Signup input as received from callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Account service facade over repository implementations.
pub struct AccountService<R: UserRepository> {
    repo: R,
    hash_cost: u32,
}

impl<R: UserRepository> AccountService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_hash_cost(repo, PASSWORD_HASH_COST)
    }

    /// Uses a custom bcrypt cost (tests run with the minimum cost).
    pub fn with_hash_cost(repo: R, hash_cost: u32) -> Self {
        Self { repo, hash_cost }
    }

    /// Registers a user.
    ///
    /// # Errors
    /// - `MissingFields` when name, email or password is absent or blank.
    /// - `EmailInUse` when the email is already registered; nothing is written.
    pub fn signup(&self, request: &SignupRequest) -> Result<User, AccountError> {
        let (Some(name), Some(email), Some(password)) = (
            non_blank(request.name.as_deref()),
            non_blank(request.email.as_deref()),
            request.password.as_deref().filter(|value| !value.is_empty()),
        ) else {
            return Err(AccountError::MissingFields);
        };

        if self.repo.find_by_email(email)?.is_some() {
            warn!("event=signup module=service status=rejected reason=email_in_use");
            return Err(AccountError::EmailInUse);
        }

        let password_hash = bcrypt::hash(password, self.hash_cost)?;
        let user = self.repo.create_user(&NewUser {
            name,
            email,
            password_hash: &password_hash,
        })?;
        info!("event=signup module=service status=ok user_id={}", user.id);
        Ok(user)
    }

    /// Checks an email/password pair; unknown emails simply fail.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<bool, AccountError> {
        let Some(user) = self.repo.find_by_email(email.trim())? else {
            return Ok(false);
        };
        Ok(bcrypt::verify(password, &user.password_hash)?)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
