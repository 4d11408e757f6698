//! API error type and its JSON rendering.
//!
//! Every error body is `{"error": "<message>"}`. Unexpected failures are
//! logged with their cause and answered with a generic message.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hohm_core::{AccountError, HouseholdServiceError, NotifyError};
use log::{error, warn};
use serde_json::json;
use std::fmt::{Display, Formatter};

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong.";
pub const HOUSEHOLD_NOT_FOUND_MESSAGE: &str = "Household not found.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub const SEND_FAILED_MESSAGE: &str = "Failed to send email";

#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    Conflict(String),
    Unauthorized(String),
    NotFound(String),
    /// `public` is returned to the client; `cause` is only logged.
    Unexpected { public: String, cause: String },
}

impl ApiError {
    pub fn unexpected(cause: impl Display) -> Self {
        Self::Unexpected {
            public: GENERIC_ERROR_MESSAGE.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::Conflict(message)
            | Self::Unauthorized(message)
            | Self::NotFound(message) => message,
            Self::Unexpected { public, .. } => public,
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unexpected { public, cause } => write!(f, "{public} ({cause})"),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Unexpected { cause, .. } => error!(
                "event=api_error module=server status=error http_status={} cause={}",
                status.as_u16(),
                cause
            ),
            _ => warn!(
                "event=api_error module=server status=rejected http_status={}",
                status.as_u16()
            ),
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::Validation(value.body_text())
    }
}

impl From<HouseholdServiceError> for ApiError {
    fn from(value: HouseholdServiceError) -> Self {
        match value {
            HouseholdServiceError::NameRequired => Self::Validation(value.to_string()),
            HouseholdServiceError::InvalidDraft(err) => Self::Validation(err.to_string()),
            HouseholdServiceError::NotFound(_) => {
                Self::NotFound(HOUSEHOLD_NOT_FOUND_MESSAGE.to_string())
            }
            HouseholdServiceError::Repo(err) => Self::unexpected(err),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(value: AccountError) -> Self {
        match value {
            AccountError::MissingFields => Self::Validation(value.to_string()),
            AccountError::EmailInUse => Self::Conflict(value.to_string()),
            other => Self::unexpected(other),
        }
    }
}

impl From<NotifyError> for ApiError {
    fn from(value: NotifyError) -> Self {
        match value {
            NotifyError::MissingFields => Self::Validation(value.to_string()),
            NotifyError::Mail(err) => Self::Unexpected {
                public: SEND_FAILED_MESSAGE.to_string(),
                cause: err.to_string(),
            },
        }
    }
}
