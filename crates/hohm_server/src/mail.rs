//! Resend email client.

use hohm_core::{MailError, MailReceipt, Mailer, OutgoingEmail};
use log::debug;
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;

pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Sends email through the Resend HTTP API. One attempt per message.
pub struct ResendMailer {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: Option<String>) -> Result<Self, MailError> {
        Self::with_endpoint(api_key, RESEND_ENDPOINT)
    }

    pub fn with_endpoint(
        api_key: Option<String>,
        endpoint: impl Into<String>,
    ) -> Result<Self, MailError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| MailError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            api_key,
            endpoint: endpoint.into(),
        })
    }
}

impl Mailer for ResendMailer {
    fn send(&self, email: &OutgoingEmail) -> Result<MailReceipt, MailError> {
        let api_key = self.api_key.as_deref().ok_or(MailError::NotConfigured)?;
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&SendEmailBody {
                from: &email.from,
                to: &email.to,
                subject: &email.subject,
                html: &email.html,
            })
            .send()
            .map_err(|err| MailError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| MailError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        debug!(
            "event=mail_send module=mail status=ok http_status={}",
            status.as_u16()
        );

        let payload = serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body));
        Ok(MailReceipt { payload })
    }
}
