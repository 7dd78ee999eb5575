//! Screening pipeline: runs one session end to end.
//!
//! Flow: extract job description → build email directory → for each CV in
//! upload order: extract → score → resolve email → notify → append row.
//!
//! Run-wide inputs (job description, spreadsheet) fail the whole run before any
//! row exists. Per-CV failures never do: the row is still appended, with an
//! absent score and an `error: <cause>` explanation, and processing moves on.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::CompletionModel;
use crate::screening::directory::{EmailDirectory, SheetFormat};
use crate::screening::extractor::{extract_text, DocumentKind};
use crate::screening::notifier::{notify, Mailer, NotificationStatus};
use crate::screening::report::{ScreeningReport, ScreeningResult, NOT_FOUND_EMAIL};
use crate::screening::scorer::{MatchOutcome, MatchScorer, ScreeningStatus};
use crate::screening::session::{ScreeningSession, Upload};

const EMPTY_DIRECTORY_MESSAGE: &str =
    "The spreadsheet has no rows with both a filename and an email";

pub async fn run_screening(
    session: ScreeningSession,
    model: &dyn CompletionModel,
    mailer: &dyn Mailer,
) -> Result<ScreeningReport, AppError> {
    let job_description = read_document(&session.job_description)
        .map_err(|e| prefix_input_error("Job description", e))?;

    let format = SheetFormat::from_filename(&session.spreadsheet.filename).ok_or_else(|| {
        AppError::Validation(format!(
            "Unsupported spreadsheet '{}'",
            session.spreadsheet.filename
        ))
    })?;
    let directory = EmailDirectory::from_spreadsheet(&session.spreadsheet.bytes, format)?;

    info!(
        "Screening {} CV(s) against a {}-character job description ({} directory entries)",
        session.resumes.len(),
        job_description.len(),
        directory.len()
    );

    let scorer = MatchScorer::new(model, session.api_key.expose());
    let mut results = Vec::with_capacity(session.resumes.len());
    let mut messages = Vec::new();

    if directory.is_empty() {
        warn!("Spreadsheet has no filename/email rows; no candidate can be notified");
        messages.push(EMPTY_DIRECTORY_MESSAGE.to_string());
    }

    for resume in &session.resumes {
        let filename = resume.filename.clone();
        let email = directory.email_for(&filename);

        let scored = match read_document(resume) {
            Ok(text) => scorer.score(&job_description, &text).await,
            Err(e) => Err(e),
        };

        let (outcome, notification) = match scored {
            Ok(outcome) => {
                let notification =
                    notify(mailer, session.sender.as_ref(), email, &outcome).await;
                (outcome, notification)
            }
            Err(e) => {
                warn!("Scoring failed for {filename}: {e}");
                messages.push(format!("Could not score {filename}: {e}"));
                let outcome = MatchOutcome {
                    score: None,
                    explanation: format!("error: {e}"),
                };
                (
                    outcome,
                    NotificationStatus::Skipped("scoring failed".to_string()),
                )
            }
        };

        match (&notification, email) {
            (NotificationStatus::Sent, Some(to)) => messages.push(format!("Email sent to {to}")),
            (NotificationStatus::Failed(reason), Some(to)) => {
                messages.push(format!("Failed to send email to {to}: {reason}"))
            }
            _ => {}
        }

        let status = ScreeningStatus::from_score(outcome.score);
        info!(
            "Screened {filename}: score={:?} status={}",
            outcome.score,
            status.label()
        );

        results.push(ScreeningResult {
            filename,
            email: email.unwrap_or(NOT_FOUND_EMAIL).to_string(),
            score: outcome.score,
            status,
            explanation: outcome.explanation,
            notification,
        });
    }

    Ok(ScreeningReport::new(results, messages))
}

fn read_document(upload: &Upload) -> Result<String, AppError> {
    let kind = DocumentKind::from_filename(&upload.filename).ok_or_else(|| {
        AppError::Validation(format!("Unsupported file type: '{}'", upload.filename))
    })?;
    extract_text(&upload.bytes, kind)
}

fn prefix_input_error(what: &str, err: AppError) -> AppError {
    match err {
        AppError::InputFormat(msg) => AppError::InputFormat(format!("{what}: {msg}")),
        other => other,
    }
}
