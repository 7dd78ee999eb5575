//! Server-rendered pages: the upload form and the results page.
//! Markup lives in `templates/`; askama escapes every interpolated value.

use askama::Template;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::errors::AppError;
use crate::screening::report::{ScreeningReport, ScreeningResult, EXPORT_FILENAME};
use crate::screening::scorer::ScreeningStatus;

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormPage<'a> {
    /// Shown above the form when a previous submit failed.
    pub error: Option<&'a str>,
}

/// One table row, pre-formatted for display.
pub struct ReportRow<'a> {
    pub filename: &'a str,
    pub email: &'a str,
    pub score: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub explanation: &'a str,
    pub notification: String,
}

impl<'a> From<&'a ScreeningResult> for ReportRow<'a> {
    fn from(result: &'a ScreeningResult) -> Self {
        Self {
            filename: &result.filename,
            email: &result.email,
            score: result.score.map(|s| s.to_string()).unwrap_or_default(),
            status: result.status.label(),
            status_class: match result.status {
                ScreeningStatus::Passed => "passed",
                ScreeningStatus::NotPassed => "not-passed",
            },
            explanation: &result.explanation,
            notification: result.notification.label(),
        }
    }
}

#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportPage<'a> {
    pub passed: usize,
    pub total: usize,
    pub messages: &'a [String],
    pub rows: Vec<ReportRow<'a>>,
    pub download_name: &'static str,
    pub csv_b64: String,
}

impl<'a> ReportPage<'a> {
    pub fn new(report: &'a ScreeningReport, csv: &str) -> Self {
        Self {
            passed: report.passed_count(),
            total: report.results.len(),
            messages: &report.messages,
            rows: report.results.iter().map(ReportRow::from).collect(),
            download_name: EXPORT_FILENAME,
            csv_b64: STANDARD.encode(csv.as_bytes()),
        }
    }
}

pub fn render_form_page(error: Option<&str>) -> Result<String, AppError> {
    FormPage { error }.render().map_err(render_error)
}

/// Results table, inline status messages and the CSV download link.
pub fn render_report_page(report: &ScreeningReport, csv: &str) -> Result<String, AppError> {
    ReportPage::new(report, csv).render().map_err(render_error)
}

fn render_error(e: askama::Error) -> AppError {
    AppError::Internal(anyhow::anyhow!("template rendering failed: {e}"))
}
