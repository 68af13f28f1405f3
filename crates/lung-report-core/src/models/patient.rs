//! Patient models.

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Patient record errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatientError {
    #[error("Invalid date format: {0}")]
    DateFormat(String),
}

pub type PatientResult<T> = Result<T, PatientError>;

/// Reject blank strftime patterns and ones chrono cannot parse.
pub fn check_date_format(format: &str) -> PatientResult<()> {
    if format.trim().is_empty()
        || StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
    {
        return Err(PatientError::DateFormat(format.to_string()));
    }
    Ok(())
}

/// Patient details and clinician notes as entered in the form.
///
/// Values are free text; nothing here is validated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatientRecord {
    /// Given name
    pub name: String,
    /// Family name
    pub last_name: String,
    /// Date of birth, as typed
    pub date_of_birth: String,
    /// Date the scan was acquired, as typed
    pub date_of_acquisition: String,
    /// Free-text notes of the clinician
    pub notes: String,
}

impl PatientRecord {
    /// Create a record with the patient's names.
    pub fn new(name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }

    /// "Name Last-name", skipping whichever is blank.
    pub fn full_name(&self) -> String {
        [self.name.trim(), self.last_name.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Fill a blank acquisition date with today's local date.
    pub fn with_today_acquisition(mut self, format: &str) -> PatientResult<Self> {
        if self.date_of_acquisition.trim().is_empty() {
            check_date_format(format)?;
            self.date_of_acquisition = chrono::Local::now().format(format).to_string();
        }
        Ok(self)
    }
}

/// Source of patient details at export time.
pub trait PatientForm {
    fn patient_record(&self) -> PatientRecord;
}

impl PatientForm for PatientRecord {
    fn patient_record(&self) -> PatientRecord {
        self.clone()
    }
}
