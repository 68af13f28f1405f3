//! Report composition and export sinks.

mod html;
mod json;
mod pdf;

pub use html::*;
pub use json::*;
pub use pdf::*;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{Assignment, Palette, PatientError, PatientRecord, Region, Rgb, Tally};
use crate::session::{Legend, TotalsView};

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: no scores have been generated")]
    NothingGenerated,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Invalid patient record: {0}")]
    Patient(#[from] PatientError),
}

impl From<tera::Error> for ExportError {
    fn from(e: tera::Error) -> Self {
        ExportError::Template(e.to_string())
    }
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Turns a composed report into a document on disk.
pub trait ReportSink {
    /// Write the document and return where it landed.
    fn export(&self, report: &Report) -> ExportResult<PathBuf>;
}

/// A region as printed on the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRegion {
    pub region: Region,
    pub level: usize,
    pub label: String,
    pub color: Rgb,
}

/// Fully composed report, ready for any sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Unique report ID
    pub id: String,
    pub title: String,
    pub patient: PatientRecord,
    /// Scores in catalog order
    pub regions: Vec<ReportRegion>,
    pub legend: Legend,
    pub totals: TotalsView,
    /// RFC 3339 creation timestamp
    pub generated_at: String,
}

impl Report {
    /// Compose a report from a generation and the form contents.
    pub fn compose(
        title: &str,
        patient: PatientRecord,
        assignment: &Assignment,
        tally: &Tally,
        palette: &Palette,
    ) -> Self {
        let regions = assignment
            .iter()
            .map(|score| ReportRegion {
                region: score.region.clone(),
                level: score.level.index,
                label: score.level.label.clone(),
                color: score.level.color,
            })
            .collect();

        let mut totals = TotalsView::from_palette(palette);
        totals.set_counts(tally);

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            patient,
            regions,
            legend: Legend::from_palette(palette),
            totals,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Serialize to canonical JSON (compact, field order fixed by the type).
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// SHA-256 of the canonical JSON, hex encoded.
    pub fn digest(&self) -> Result<String, serde_json::Error> {
        let payload = self.to_canonical_json()?;
        Ok(hash_data(payload.as_bytes()))
    }

    /// File name stem: `Report <last name> <name> <id prefix>`.
    pub fn file_stem(&self) -> String {
        let short_id: String = self.id.chars().take(8).collect();
        let raw = format!(
            "Report {} {} {}",
            self.patient.last_name, self.patient.name, short_id
        );
        sanitize_file_stem(&raw)
    }
}

/// Hash bytes with SHA-256 and return hex.
pub fn hash_data(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Keep letters, digits, `-` and `_`; collapse everything else to single spaces.
fn sanitize_file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write `bytes` to `dir/file_name`, creating the directory and replacing any
/// existing file.
pub(crate) fn write_replacing(dir: &Path, file_name: &str, bytes: &[u8]) -> ExportResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    std::fs::write(&path, bytes)?;
    Ok(path)
}
