//! Comment notification emails.
//!
//! # Responsibility
//! - Validate a comment notification request.
//! - Render the subject and HTML body.
//! - Hand the message to a `Mailer` once; no retry.
//!
//! # Invariants
//! - All user-provided text is HTML-escaped before interpolation.
//! - A request missing recipient, task title or comment is never sent.

use log::{error, info};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Commenter name used when the request does not carry one.
pub const DEFAULT_COMMENTER_NAME: &str = "Someone";

/// A fully rendered outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgement, passed back to callers as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct MailReceipt {
    pub payload: serde_json::Value,
}

#[derive(Debug)]
pub enum MailError {
    /// The mailer has no credentials configured.
    NotConfigured,
    Transport(String),
    Rejected { status: u16, body: String },
}

impl Display for MailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "mail provider is not configured"),
            Self::Transport(message) => write!(f, "mail transport failed: {message}"),
            Self::Rejected { status, body } => {
                write!(f, "mail provider rejected message with status {status}: {body}")
            }
        }
    }
}

impl Error for MailError {}

/// Outbound email transport.
pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutgoingEmail) -> Result<MailReceipt, MailError>;
}

#[derive(Debug)]
pub enum NotifyError {
    MissingFields,
    Mail(MailError),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFields => write!(f, "Missing fields"),
            Self::Mail(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NotifyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Mail(err) => Some(err),
            Self::MissingFields => None,
        }
    }
}

/// Request to notify a task's assignee about a new comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNotification {
    pub recipient_email: Option<String>,
    pub task_title: Option<String>,
    pub comment_text: Option<String>,
    pub commenter_name: Option<String>,
}

/// Sends comment notifications through a shared mailer.
pub struct NotifyService {
    mailer: Arc<dyn Mailer>,
    from: String,
}

impl NotifyService {
    pub fn new(mailer: Arc<dyn Mailer>, from: impl Into<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
        }
    }

    /// Renders and sends one notification.
    pub fn send_comment_email(
        &self,
        request: &CommentNotification,
    ) -> Result<MailReceipt, NotifyError> {
        let email = compose_comment_email(&self.from, request)?;
        match self.mailer.send(&email) {
            Ok(receipt) => {
                info!("event=comment_email module=notify status=ok");
                Ok(receipt)
            }
            Err(err) => {
                error!(
                    "event=comment_email module=notify status=error error={}",
                    err
                );
                Err(NotifyError::Mail(err))
            }
        }
    }
}

/// Renders the notification email.
pub fn compose_comment_email(
    from: &str,
    request: &CommentNotification,
) -> Result<OutgoingEmail, NotifyError> {
    let (Some(recipient), Some(title), Some(comment)) = (
        non_blank(request.recipient_email.as_deref()),
        non_blank(request.task_title.as_deref()),
        non_blank(request.comment_text.as_deref()),
    ) else {
        return Err(NotifyError::MissingFields);
    };
    let commenter = non_blank(request.commenter_name.as_deref()).unwrap_or(DEFAULT_COMMENTER_NAME);

    Ok(OutgoingEmail {
        from: from.to_string(),
        to: recipient.to_string(),
        subject: format!("New Comment on Task: \"{title}\""),
        html: format!(
            "<p><strong>{}</strong> commented on <em>{}</em>:</p>\n<blockquote>{}</blockquote>",
            escape_html(commenter),
            escape_html(title),
            escape_html(comment)
        ),
    })
}

/// Escapes text for interpolation into HTML element content.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
