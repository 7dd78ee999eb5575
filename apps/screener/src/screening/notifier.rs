//! Notifier: sends each candidate one pass/fail email over an SMTP relay.
//!
//! The template is chosen only by the screening status. Delivery failures are
//! captured in `NotificationStatus` and never abort the batch.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::screening::scorer::{MatchOutcome, ScreeningStatus};
use crate::screening::session::SenderCredentials;

/// What happened to a row's notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum NotificationStatus {
    Sent,
    Failed(String),
    Skipped(String),
}

impl NotificationStatus {
    pub fn label(&self) -> String {
        match self {
            NotificationStatus::Sent => "Sent".to_string(),
            NotificationStatus::Failed(reason) => format!("Failed: {reason}"),
            NotificationStatus::Skipped(reason) => format!("Skipped: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail transport seam. `SmtpMailer` in production, a recorder in tests.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        sender: &SenderCredentials,
        message: &OutgoingMessage,
    ) -> Result<(), AppError>;
}

/// SMTP over implicit TLS (port 465 by default), authenticated per send with
/// the session's sender address and app password.
pub struct SmtpMailer {
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        sender: &SenderCredentials,
        message: &OutgoingMessage,
    ) -> Result<(), AppError> {
        let email = Message::builder()
            .from(
                sender
                    .address
                    .parse()
                    .map_err(|e| AppError::Mail(format!("Invalid sender address: {e}")))?,
            )
            .to(message
                .to
                .parse()
                .map_err(|e| AppError::Mail(format!("Invalid recipient address: {e}")))?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| AppError::Mail(format!("Unable to build message: {e}")))?;

        let creds = Credentials::new(
            sender.address.clone(),
            sender.app_password.expose().to_string(),
        );
        let host = self.host.clone();
        let port = self.port;

        // lettre's SmtpTransport blocks; keep it off the async workers.
        tokio::task::spawn_blocking(move || {
            let mailer = SmtpTransport::relay(&host)
                .map_err(|e| AppError::Mail(e.to_string()))?
                .port(port)
                .credentials(creds)
                .build();

            mailer
                .send(&email)
                .map(|_| ())
                .map_err(|e| AppError::Mail(e.to_string()))
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("mail task failed: {e}")))?
    }
}

/// Picks the template for the candidate's status.
pub fn compose_message(to: &str, outcome: &MatchOutcome) -> OutgoingMessage {
    let (subject, body) = match outcome.status() {
        ScreeningStatus::Passed => (
            "🎉 Next Step in Your Application".to_string(),
            format!(
                "Dear Candidate,\n\n\
                 Congratulations! Based on your CV, you've passed to the next step in our recruitment process.\n\n\
                 Match Score: {}\n\n\
                 Best regards,\nHR Team",
                format_score(outcome.score)
            ),
        ),
        ScreeningStatus::NotPassed => (
            "Thank You for Applying".to_string(),
            format!(
                "Dear Candidate,\n\n\
                 Thank you for applying. Unfortunately, your profile did not meet the criteria for this position.\n\n\
                 Match Score: {}\n\n\
                 Kind regards,\nHR Team",
                format_score(outcome.score)
            ),
        ),
    };

    OutgoingMessage {
        to: to.to_string(),
        subject,
        body,
    }
}

fn format_score(score: Option<i64>) -> String {
    match score {
        Some(s) => format!("{s}%"),
        None => "N/A".to_string(),
    }
}

/// Sends the candidate's notification if there is somewhere to send it and
/// someone to send it from.
pub async fn notify(
    mailer: &dyn Mailer,
    sender: Option<&SenderCredentials>,
    email: Option<&str>,
    outcome: &MatchOutcome,
) -> NotificationStatus {
    let Some(to) = email else {
        return NotificationStatus::Skipped("no email address on file".to_string());
    };
    let Some(sender) = sender else {
        return NotificationStatus::Skipped("sender credentials not supplied".to_string());
    };

    let message = compose_message(to, outcome);
    match mailer.send(sender, &message).await {
        Ok(()) => {
            info!("Notification sent to {to}");
            NotificationStatus::Sent
        }
        Err(e) => {
            warn!("Failed to send notification to {to}: {e}");
            NotificationStatus::Failed(e.to_string())
        }
    }
}
