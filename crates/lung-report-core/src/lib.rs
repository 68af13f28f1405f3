//! Lung Report Core Library
//!
//! Region scoring and report export for the lung ultrasound diagnosis support app.
//!
//! # Architecture
//!
//! ```text
//!   ReportConfig ──► RegionCatalog + Palette
//!                            │
//!              ReportGenerator (injected RandomSource)
//!                            │
//!                  Assignment ──► Tally
//!                            │
//!        ┌───────────────────┼───────────────────┐
//!        ▼                   ▼                   ▼
//!  RegionRenderer      ReportSession        PatientForm
//!  (diagram, totals)   (screen state)       (form fields, notes)
//!                            │
//!                         Report
//!                            │
//!              ┌─────────────┼─────────────┐
//!              ▼             ▼             ▼
//!         PdfExporter   HtmlExporter   JsonExporter
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (Region, SeverityLevel, Palette, Assignment, Tally, PatientRecord)
//! - [`generator`]: Random level assignment and tally aggregation
//! - [`session`]: Screen session state, legend and totals
//! - [`config`]: JSON-loadable session configuration
//! - [`export`]: Report composition, PDF, HTML and JSON sinks

pub mod config;
pub mod export;
pub mod generator;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use config::ReportConfig;
pub use export::{HtmlExporter, JsonExporter, PdfExporter, Report, ReportSink};
pub use generator::{tally, DrawPolicy, RandomSource, ReportGenerator, RngSource, ScriptedSource};
pub use models::{
    Assignment, Palette, PatientForm, PatientRecord, Region, RegionCatalog, Rgb, SeverityLevel,
    Tally,
};
pub use session::{Legend, RegionRenderer, ReportSession, TotalsView};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::StdRng;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum LungReportError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not ready: {0}")]
    NotReady(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<config::ConfigError> for LungReportError {
    fn from(e: config::ConfigError) -> Self {
        LungReportError::InvalidConfig(e.to_string())
    }
}

impl From<export::ExportError> for LungReportError {
    fn from(e: export::ExportError) -> Self {
        match e {
            export::ExportError::NothingGenerated => LungReportError::NotReady(e.to_string()),
            other => LungReportError::ExportFailed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for LungReportError {
    fn from(e: serde_json::Error) -> Self {
        LungReportError::ExportFailed(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for LungReportError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        LungReportError::Internal(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Start a session with OS-seeded randomness.
///
/// `config_json` overrides the built-in configuration; omitted fields keep
/// their defaults.
#[uniffi::export]
pub fn new_session(config_json: Option<String>) -> Result<Arc<LungReportCore>, LungReportError> {
    LungReportCore::build(config_json, RngSource::from_entropy())
}

/// Start a session whose draws are reproducible for a given seed.
#[uniffi::export]
pub fn new_seeded_session(
    seed: u64,
    config_json: Option<String>,
) -> Result<Arc<LungReportCore>, LungReportError> {
    LungReportCore::build(config_json, RngSource::seeded(seed))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe session wrapper for FFI.
#[derive(uniffi::Object)]
pub struct LungReportCore {
    session: Mutex<ReportSession<RngSource<StdRng>>>,
}

impl LungReportCore {
    fn build(
        config_json: Option<String>,
        source: RngSource<StdRng>,
    ) -> Result<Arc<Self>, LungReportError> {
        let config = match config_json {
            Some(json) => ReportConfig::from_json(&json)?,
            None => ReportConfig::default(),
        };
        let session = ReportSession::new(&config, source)?;
        Ok(Arc::new(Self {
            session: Mutex::new(session),
        }))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ReportSession<RngSource<StdRng>>>, LungReportError> {
        Ok(self.session.lock()?)
    }
}

#[uniffi::export]
impl LungReportCore {
    /// Region identifiers in display order.
    pub fn regions(&self) -> Result<Vec<String>, LungReportError> {
        let session = self.lock()?;
        Ok(session
            .catalog()
            .iter()
            .map(|r| r.as_str().to_string())
            .collect())
    }

    /// Legend rows, one per level.
    pub fn legend(&self) -> Result<Vec<FfiLegendRow>, LungReportError> {
        let session = self.lock()?;
        Ok(session
            .legend()
            .rows
            .into_iter()
            .map(|row| row.into())
            .collect())
    }

    /// Draw new scores for every region.
    pub fn generate(&self) -> Result<FfiGeneration, LungReportError> {
        let mut session = self.lock()?;
        let scores: Vec<FfiRegionScore> = session
            .generate()
            .iter()
            .map(|score| FfiRegionScore {
                region: score.region.as_str().to_string(),
                level: score.level.index as u32,
                label: score.level.label.clone(),
                color: score.level.color.to_hex(),
            })
            .collect();
        let tally = session.tally();

        Ok(FfiGeneration {
            scores,
            tally: tally.counts().to_vec(),
            pathological: tally.pathological(),
        })
    }

    /// Latest tally; zeros before the first generation.
    pub fn current_tally(&self) -> Result<Vec<u32>, LungReportError> {
        let session = self.lock()?;
        Ok(session.tally().counts().to_vec())
    }

    /// Whether a report can be exported yet.
    pub fn can_export(&self) -> Result<bool, LungReportError> {
        let session = self.lock()?;
        Ok(session.can_export())
    }

    /// Replace the patient form contents.
    pub fn set_patient(&self, patient: FfiPatientRecord) -> Result<(), LungReportError> {
        let mut session = self.lock()?;
        session.set_patient(patient.into());
        Ok(())
    }

    /// Write the PDF report into `output_dir` and return its path.
    pub fn export_pdf(&self, output_dir: String) -> Result<String, LungReportError> {
        let session = self.lock()?;
        let exporter = PdfExporter::new(&output_dir);
        let path = session.export_with(session.patient(), &exporter)?;
        Ok(path.to_string_lossy().into_owned())
    }

    /// Write the HTML report into `output_dir` and return its path.
    pub fn export_html(&self, output_dir: String) -> Result<String, LungReportError> {
        let session = self.lock()?;
        let exporter = HtmlExporter::new(&output_dir);
        let path = session.export_with(session.patient(), &exporter)?;
        Ok(path.to_string_lossy().into_owned())
    }

    /// Report as pretty JSON, digest included.
    pub fn export_json(&self) -> Result<String, LungReportError> {
        let session = self.lock()?;
        let report = session.report()?;
        let document = export::JsonReport::new(&report)?;
        Ok(document.to_json()?)
    }

    /// Report as in-memory PDF bytes.
    pub fn render_pdf(&self) -> Result<Vec<u8>, LungReportError> {
        let session = self.lock()?;
        let report = session.report()?;
        Ok(export::render_pdf(&report)?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe region score.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRegionScore {
    pub region: String,
    pub level: u32,
    pub label: String,
    /// `#RRGGBB`
    pub color: String,
}

/// FFI-safe result of one generation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiGeneration {
    pub scores: Vec<FfiRegionScore>,
    pub tally: Vec<u32>,
    pub pathological: u32,
}

/// FFI-safe legend row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiLegendRow {
    pub label: String,
    pub color: String,
}

impl From<session::LegendRow> for FfiLegendRow {
    fn from(row: session::LegendRow) -> Self {
        Self {
            label: row.label,
            color: row.color.to_hex(),
        }
    }
}

/// FFI-safe patient record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientRecord {
    pub name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub date_of_acquisition: String,
    pub notes: String,
}

impl From<FfiPatientRecord> for PatientRecord {
    fn from(patient: FfiPatientRecord) -> Self {
        PatientRecord {
            name: patient.name,
            last_name: patient.last_name,
            date_of_birth: patient.date_of_birth,
            date_of_acquisition: patient.date_of_acquisition,
            notes: patient.notes,
        }
    }
}

impl From<PatientRecord> for FfiPatientRecord {
    fn from(patient: PatientRecord) -> Self {
        Self {
            name: patient.name,
            last_name: patient.last_name,
            date_of_birth: patient.date_of_birth,
            date_of_acquisition: patient.date_of_acquisition,
            notes: patient.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> FfiPatientRecord {
        FfiPatientRecord {
            name: "Mario".into(),
            last_name: "Rossi".into(),
            date_of_birth: "21 Oct 1962".into(),
            date_of_acquisition: String::new(),
            notes: "Follow-up in 48h".into(),
        }
    }

    #[test]
    fn test_new_session_defaults() {
        let core = new_session(None).unwrap();
        assert_eq!(core.regions().unwrap().len(), 14);
        assert_eq!(core.legend().unwrap().len(), 5);
        assert_eq!(core.current_tally().unwrap(), vec![0, 0, 0, 0]);
        assert!(!core.can_export().unwrap());
    }

    #[test]
    fn test_invalid_config() {
        let result = new_session(Some(r#"{"levels": []}"#.into()));
        assert!(matches!(result, Err(LungReportError::InvalidConfig(_))));
    }

    #[test]
    fn test_seeded_sessions_agree() {
        let a = new_seeded_session(99, None).unwrap().generate().unwrap();
        let b = new_seeded_session(99, None).unwrap().generate().unwrap();
        let levels_a: Vec<u32> = a.scores.iter().map(|s| s.level).collect();
        let levels_b: Vec<u32> = b.scores.iter().map(|s| s.level).collect();
        assert_eq!(levels_a, levels_b);
        assert_eq!(a.tally, b.tally);
    }

    #[test]
    fn test_generation_invariants() {
        let core = new_seeded_session(3, None).unwrap();
        let generation = core.generate().unwrap();

        assert_eq!(generation.scores.len(), 14);
        let not_measured = generation.scores.iter().filter(|s| s.level == 4).count() as u32;
        assert_eq!(generation.tally.iter().sum::<u32>() + not_measured, 14);
        assert_eq!(core.current_tally().unwrap(), generation.tally);
        assert!(core.can_export().unwrap());
    }

    #[test]
    fn test_export_before_generate_is_not_ready() {
        let core = new_session(None).unwrap();
        assert!(matches!(core.export_json(), Err(LungReportError::NotReady(_))));
        assert!(matches!(core.render_pdf(), Err(LungReportError::NotReady(_))));
    }

    #[test]
    fn test_export_pdf_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let core = new_seeded_session(5, None).unwrap();
        core.set_patient(patient()).unwrap();
        core.generate().unwrap();

        let path = core
            .export_pdf(dir.path().to_string_lossy().into_owned())
            .unwrap();
        assert!(std::path::Path::new(&path).exists());

        let html = core
            .export_html(dir.path().to_string_lossy().into_owned())
            .unwrap();
        assert!(std::fs::read_to_string(&html).unwrap().contains("Rossi"));

        let json = core.export_json().unwrap();
        assert!(json.contains("Rossi"));
        assert!(json.contains("digest"));

        let bytes = core.render_pdf().unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn test_patient_record_conversion() {
        let record: PatientRecord = patient().into();
        assert_eq!(record.full_name(), "Mario Rossi");
        let back: FfiPatientRecord = record.into();
        assert_eq!(back.notes, "Follow-up in 48h");
    }
}
