//! JSON export.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{write_replacing, ExportResult, Report, ReportSink};

/// A report together with its digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    pub digest: String,
    pub report: Report,
}

impl JsonReport {
    pub fn new(report: &Report) -> ExportResult<Self> {
        Ok(Self {
            digest: report.digest()?,
            report: report.clone(),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Writes `<stem>.json` into a directory.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    output_dir: PathBuf,
}

impl JsonExporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }
}

impl ReportSink for JsonExporter {
    fn export(&self, report: &Report) -> ExportResult<PathBuf> {
        let document = JsonReport::new(report)?;
        let json = document.to_json()?;
        let file_name = format!("{}.json", report.file_stem());
        let path = write_replacing(&self.output_dir, &file_name, json.as_bytes())?;

        tracing::info!(path = %path.display(), digest = %document.digest, "exported JSON report");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::make_report;

    #[test]
    fn test_json_report_contains_digest() {
        let report = make_report();
        let document = JsonReport::new(&report).unwrap();
        let json = document.to_json().unwrap();

        assert!(json.contains(&document.digest));
        assert!(json.contains("lung_area_14"));
        assert!(json.contains("Rossi"));
    }

    #[test]
    fn test_json_exporter_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let report = make_report();

        let path = JsonExporter::new(dir.path()).export(&report).unwrap();

        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "json");
        let parsed: JsonReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.report, report);
        assert_eq!(parsed.digest, report.digest().unwrap());
    }
}
