//! Axum route handlers for the screening form and API.

use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::screening::pipeline::run_screening;
use crate::screening::report::{ScreeningReport, EXPORT_FILENAME};
use crate::screening::session::ScreeningSession;
use crate::screening::views::{render_form_page, render_report_page};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Json,
    Csv,
}

impl ExportQuery {
    fn export_format(&self) -> Result<ExportFormat, AppError> {
        match self.format.as_deref() {
            None | Some("json") => Ok(ExportFormat::Json),
            Some("csv") => Ok(ExportFormat::Csv),
            Some(other) => Err(AppError::Validation(format!(
                "Unsupported format '{other}'; use json or csv"
            ))),
        }
    }
}

async fn screen(state: &AppState, multipart: Multipart) -> Result<ScreeningReport, AppError> {
    let session = ScreeningSession::from_multipart(multipart).await?;
    let report = run_screening(session, state.llm.as_ref(), state.mailer.as_ref()).await?;
    info!(
        "Screening run {} finished: {} row(s), {} passed",
        report.run_id,
        report.results.len(),
        report.passed_count()
    );
    Ok(report)
}

/// GET /
pub async fn handle_form() -> Result<Html<String>, AppError> {
    Ok(Html(render_form_page(None)?))
}

/// POST /screen
///
/// Form submit. Renders the results page, or the form again with the error inline.
pub async fn handle_screen_form(State(state): State<AppState>, multipart: Multipart) -> Response {
    let outcome = match screen(&state, multipart).await {
        Ok(report) => report
            .to_csv()
            .and_then(|csv| render_report_page(&report, &csv)),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            let (status, _, message) = e.parts();
            match render_form_page(Some(&message)) {
                Ok(html) => (status, Html(html)).into_response(),
                Err(render_err) => render_err.into_response(),
            }
        }
    }
}

/// POST /api/v1/screenings
///
/// Same input as the form. Returns the JSON report, or the CSV export with `?format=csv`.
pub async fn handle_create_screening(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    // Checked before the run so a bad query never triggers notifications.
    let format = query.export_format()?;
    let report = screen(&state, multipart).await?;

    match format {
        ExportFormat::Json => Ok(Json(report).into_response()),
        ExportFormat::Csv => {
            let csv = report.to_csv()?;
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{EXPORT_FILENAME}\""),
                    ),
                ],
                csv,
            )
                .into_response())
        }
    }
}
