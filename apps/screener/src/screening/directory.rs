//! Email directory: maps a CV's upload filename to the candidate's address.
//!
//! Built once per run from a spreadsheet with literal `filename` and `email`
//! header cells. Duplicate filenames resolve to the last row.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use crate::errors::AppError;

pub const FILENAME_COLUMN: &str = "filename";
pub const EMAIL_COLUMN: &str = "email";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    /// xlsx / xlsm / xls / ods, first worksheet only.
    Workbook,
    Csv,
}

impl SheetFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)?;

        match extension.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => Some(SheetFormat::Workbook),
            "csv" => Some(SheetFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmailDirectory {
    entries: HashMap<String, String>,
}

impl EmailDirectory {
    pub fn from_spreadsheet(bytes: &[u8], format: SheetFormat) -> Result<Self, AppError> {
        let (headers, rows) = match format {
            SheetFormat::Workbook => read_workbook(bytes)?,
            SheetFormat::Csv => read_csv(bytes)?,
        };
        Self::from_table(&headers, rows)
    }

    /// Builds the directory from a header row and data rows.
    /// Rows without a filename or without an email are ignored.
    pub fn from_table<I>(headers: &[String], rows: I) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let filename_idx = column_index(headers, FILENAME_COLUMN)?;
        let email_idx = column_index(headers, EMAIL_COLUMN)?;

        let mut entries = HashMap::new();
        for row in rows {
            let filename = row.get(filename_idx).map(|s| s.trim()).unwrap_or("");
            let email = row.get(email_idx).map(|s| s.trim()).unwrap_or("");
            if filename.is_empty() || email.is_empty() {
                continue;
            }
            entries.insert(filename.to_string(), email.to_string());
        }

        debug!("Email directory built with {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn email_for(&self, filename: &str) -> Option<&str> {
        self.entries.get(filename).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn column_index(headers: &[String], name: &str) -> Result<usize, AppError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| {
            AppError::InputFormat(format!(
                "Spreadsheet is missing the required '{name}' column"
            ))
        })
}

fn read_workbook(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<String>>), AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::InputFormat(format!("Unable to open the spreadsheet: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::InputFormat("The workbook has no worksheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| AppError::InputFormat(format!("Unable to read worksheet '{sheet_name}': {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .ok_or_else(|| AppError::InputFormat("The worksheet is empty".to_string()))?;

    let data: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok((headers, data))
}

fn read_csv(bytes: &[u8]) -> Result<(Vec<String>, Vec<Vec<String>>), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::InputFormat(format!("Unable to read CSV header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut data: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| AppError::InputFormat(format!("Unable to read CSV row: {e}")))?;
        data.push(record.iter().map(str::to_string).collect());
    }

    Ok((headers, data))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        _ => cell.to_string().trim().to_string(),
    }
}
