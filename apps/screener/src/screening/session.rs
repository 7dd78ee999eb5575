//! Per-run screening context.
//!
//! A `ScreeningSession` is built from one form submission, moved into the
//! pipeline, and dropped once the report has been rendered. Nothing in it
//! outlives the request.

use axum::extract::Multipart;
use bytes::Bytes;
use std::fmt;

use crate::errors::AppError;
use crate::screening::directory::SheetFormat;
use crate::screening::extractor::DocumentKind;

/// A credential that must never reach logs or debug output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// One uploaded file, held in memory.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Mailbox the notifications are sent from.
#[derive(Debug, Clone)]
pub struct SenderCredentials {
    pub address: String,
    pub app_password: Secret,
}

#[derive(Debug)]
pub struct ScreeningSession {
    pub api_key: Secret,
    pub job_description: Upload,
    pub resumes: Vec<Upload>,
    pub spreadsheet: Upload,
    /// `None` unless both the sender address and the app password were filled in.
    pub sender: Option<SenderCredentials>,
}

impl ScreeningSession {
    /// Reads the screening form out of a multipart body and validates it.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = SessionForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed form submission: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().map(str::to_string);

            match name.as_str() {
                "api_key" | "sender_email" | "sender_password" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Unreadable field '{name}': {e}")))?;
                    form.set_text(&name, value);
                }
                "job_description" | "resumes" | "spreadsheet" => {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("Unreadable upload '{name}': {e}")))?;
                    // Browsers send an empty part for file inputs left blank.
                    let Some(file_name) = file_name.filter(|f| !f.is_empty()) else {
                        continue;
                    };
                    form.add_upload(&name, Upload::new(file_name, bytes));
                }
                // Unread fields are skipped by the next `next_field` call.
                _ => {}
            }
        }

        form.into_session()
    }
}

/// Raw, unvalidated form contents.
#[derive(Debug, Default)]
pub struct SessionForm {
    pub api_key: Option<String>,
    pub job_description: Option<Upload>,
    pub resumes: Vec<Upload>,
    pub spreadsheet: Option<Upload>,
    pub sender_email: Option<String>,
    pub sender_password: Option<String>,
}

impl SessionForm {
    fn set_text(&mut self, name: &str, value: String) {
        match name {
            "api_key" => self.api_key = Some(value),
            "sender_email" => self.sender_email = Some(value),
            "sender_password" => self.sender_password = Some(value),
            _ => {}
        }
    }

    fn add_upload(&mut self, name: &str, upload: Upload) {
        match name {
            "job_description" => self.job_description = Some(upload),
            "resumes" => self.resumes.push(upload),
            "spreadsheet" => self.spreadsheet = Some(upload),
            _ => {}
        }
    }

    pub fn into_session(self) -> Result<ScreeningSession, AppError> {
        let api_key = self
            .api_key
            .map(|k| Secret::new(k.trim()))
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::Validation("An API key is required".to_string()))?;

        let job_description = self
            .job_description
            .ok_or_else(|| AppError::Validation("Upload a job description (PDF or TXT)".to_string()))?;
        if DocumentKind::from_filename(&job_description.filename).is_none() {
            return Err(AppError::Validation(format!(
                "Job description '{}' must be a PDF or TXT file",
                job_description.filename
            )));
        }

        if self.resumes.is_empty() {
            return Err(AppError::Validation(
                "Upload at least one candidate CV".to_string(),
            ));
        }
        if let Some(bad) = self
            .resumes
            .iter()
            .find(|r| DocumentKind::from_filename(&r.filename).is_none())
        {
            return Err(AppError::Validation(format!(
                "CV '{}' must be a PDF or TXT file",
                bad.filename
            )));
        }

        let spreadsheet = self.spreadsheet.ok_or_else(|| {
            AppError::Validation("Upload a spreadsheet with candidate emails".to_string())
        })?;
        if SheetFormat::from_filename(&spreadsheet.filename).is_none() {
            return Err(AppError::Validation(format!(
                "Spreadsheet '{}' must be an Excel workbook or CSV file",
                spreadsheet.filename
            )));
        }

        let sender = match (self.sender_email, self.sender_password) {
            (Some(address), Some(password))
                if !address.trim().is_empty() && !password.trim().is_empty() =>
            {
                Some(SenderCredentials {
                    address: address.trim().to_string(),
                    app_password: Secret::new(password.trim()),
                })
            }
            _ => None,
        };

        Ok(ScreeningSession {
            api_key,
            job_description,
            resumes: self.resumes,
            spreadsheet,
            sender,
        })
    }
}
