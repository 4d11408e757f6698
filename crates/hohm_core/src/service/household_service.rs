//! Household use-case service.
//!
//! # Responsibility
//! - Create and read households.
//! - Commit a setup draft into the household's durable roster.
//!
//! # Invariants
//! - A household is never created with a blank name.
//! - A draft is validated in full before any roster row is written.

use crate::model::household::{Household, HouseholdId};
use crate::repo::household_repo::HouseholdRepository;
use crate::repo::RepoError;
use crate::session::draft::{DraftError, HouseholdDraft, DRAFT_SCHEMA_VERSION};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum HouseholdServiceError {
    NameRequired,
    NotFound(HouseholdId),
    InvalidDraft(DraftError),
    Repo(RepoError),
}

impl Display for HouseholdServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameRequired => write!(f, "Name is required"),
            Self::NotFound(id) => write!(f, "household not found: {id}"),
            Self::InvalidDraft(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HouseholdServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDraft(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for HouseholdServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::HouseholdNotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<DraftError> for HouseholdServiceError {
    fn from(value: DraftError) -> Self {
        Self::InvalidDraft(value)
    }
}

/// Counts written by a draft commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    pub household_id: HouseholdId,
    pub members: usize,
    pub tasks: usize,
}

/// Household service facade over repository implementations.
pub struct HouseholdService<R: HouseholdRepository> {
    repo: R,
}

impl<R: HouseholdRepository> HouseholdService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a household; `None` or blank names are rejected.
    pub fn create_household(
        &self,
        name: Option<&str>,
    ) -> Result<Household, HouseholdServiceError> {
        let name = name
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(HouseholdServiceError::NameRequired)?;
        let household = self.repo.create_household(name)?;
        info!(
            "event=household_create module=service status=ok household_id={}",
            household.id
        );
        Ok(household)
    }

    pub fn get_household(&self, id: HouseholdId) -> Result<Household, HouseholdServiceError> {
        self.repo
            .get_household(id)?
            .ok_or(HouseholdServiceError::NotFound(id))
    }

    /// Replaces the household roster with the draft's members and tasks.
    pub fn commit_draft(
        &self,
        id: HouseholdId,
        draft: &HouseholdDraft,
    ) -> Result<CommitSummary, HouseholdServiceError> {
        draft.validate()?;
        self.repo.replace_roster(id, &draft.members, &draft.tasks)?;
        info!(
            "event=draft_commit module=service status=ok household_id={} members={} tasks={}",
            id,
            draft.members.len(),
            draft.tasks.len()
        );
        Ok(CommitSummary {
            household_id: id,
            members: draft.members.len(),
            tasks: draft.tasks.len(),
        })
    }

    /// Rebuilds a draft from the committed roster, e.g. to resume a session.
    pub fn load_draft(&self, id: HouseholdId) -> Result<HouseholdDraft, HouseholdServiceError> {
        let roster = self.repo.load_roster(id)?;
        Ok(HouseholdDraft {
            schema_version: DRAFT_SCHEMA_VERSION,
            members: roster.members,
            tasks: roster.tasks,
        })
    }
}
