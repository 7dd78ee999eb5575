//! Screening results and their CSV export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::screening::notifier::NotificationStatus;
use crate::screening::scorer::ScreeningStatus;

/// Email shown for CVs whose filename is not in the spreadsheet.
pub const NOT_FOUND_EMAIL: &str = "Not found";
pub const EXPORT_FILENAME: &str = "cv_screening_results.csv";

/// One row per uploaded CV, appended in upload order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningResult {
    pub filename: String,
    pub email: String,
    pub score: Option<i64>,
    pub status: ScreeningStatus,
    pub explanation: String,
    pub notification: NotificationStatus,
}

#[derive(Debug, Serialize)]
pub struct ScreeningReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub results: Vec<ScreeningResult>,
    /// Inline status lines for the user (emails sent, per-row failures).
    pub messages: Vec<String>,
}

/// CSV row layout: `Filename,Email,Score,Status,Explanation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "Filename")]
    pub filename: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Score")]
    pub score: Option<i64>,
    #[serde(rename = "Status")]
    pub status: ScreeningStatus,
    #[serde(rename = "Explanation")]
    pub explanation: String,
}

impl From<&ScreeningResult> for ExportRow {
    fn from(result: &ScreeningResult) -> Self {
        Self {
            filename: result.filename.clone(),
            email: result.email.clone(),
            score: result.score,
            status: result.status,
            explanation: result.explanation.clone(),
        }
    }
}

impl ScreeningReport {
    pub fn new(results: Vec<ScreeningResult>, messages: Vec<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            results,
            messages,
        }
    }

    pub fn passed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == ScreeningStatus::Passed)
            .count()
    }

    /// Absent scores become empty fields.
    pub fn to_csv(&self) -> Result<String, AppError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for result in &self.results {
            writer
                .serialize(ExportRow::from(result))
                .map_err(|e| AppError::Internal(e.into()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV flush failed: {e}")))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(e.into()))
    }
}

/// Reads an exported CSV back into rows.
#[cfg(test)]
pub fn parse_csv(text: &str) -> Result<Vec<ExportRow>, AppError> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    reader
        .deserialize()
        .collect::<Result<Vec<ExportRow>, _>>()
        .map_err(|e| AppError::InputFormat(format!("Unreadable results CSV: {e}")))
}
