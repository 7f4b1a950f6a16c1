//! Treatment Records
//!
//! What the clinician records against a booking at the end of a
//! consultation: a diagnosis, a severity level and a free-text note.
//! [`TreatmentDraft`] is the editable form state; [`TreatmentDraft::validate`]
//! turns it into a [`TreatmentRecord`] ready to send.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::{ApiClient, ApiError};

/// Errors from validating or saving a treatment
#[derive(Debug, Error)]
pub enum TreatmentError {
    /// No booking to attach the treatment to
    #[error("booking id is required")]
    MissingBooking,

    /// Diagnosis left blank
    #[error("diagnosis is required")]
    EmptyDiagnosis,

    /// Level not chosen
    #[error("treatment level is required")]
    MissingLevel,

    /// The API rejected or never received the record
    #[error("failed to save treatment: {0}")]
    Submit(#[from] ApiError),
}

/// Severity level of a treatment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TreatmentLevel {
    /// Mild
    Mild,
    /// Moderate
    Moderate,
    /// Severe
    Severe,
}

impl TreatmentLevel {
    /// All levels in display order
    pub const ALL: [Self; 3] = [Self::Mild, Self::Moderate, Self::Severe];

    /// Next level, wrapping around
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Mild => Self::Moderate,
            Self::Moderate => Self::Severe,
            Self::Severe => Self::Mild,
        }
    }
}

impl fmt::Display for TreatmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mild => write!(f, "Mild"),
            Self::Moderate => write!(f, "Moderate"),
            Self::Severe => write!(f, "Severe"),
        }
    }
}

/// A validated treatment, as sent to the API
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentRecord {
    /// Booking the treatment belongs to
    pub booking_id: String,
    /// Diagnosis text
    pub diagnosis: String,
    /// Severity level
    pub level: TreatmentLevel,
    /// Free-text note (may be empty)
    pub note: String,
}

/// Editable treatment form state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreatmentDraft {
    /// Booking the treatment belongs to
    pub booking_id: String,
    /// Diagnosis text
    pub diagnosis: String,
    /// Severity level, once chosen
    pub level: Option<TreatmentLevel>,
    /// Free-text note
    pub note: String,
}

impl TreatmentDraft {
    /// Empty draft for a booking
    #[must_use]
    pub fn for_booking(booking_id: impl Into<String>) -> Self {
        Self {
            booking_id: booking_id.into(),
            ..Self::default()
        }
    }

    /// Check the draft and produce the record to send
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    pub fn validate(&self) -> Result<TreatmentRecord, TreatmentError> {
        let booking_id = self.booking_id.trim();
        if booking_id.is_empty() {
            return Err(TreatmentError::MissingBooking);
        }
        let diagnosis = self.diagnosis.trim();
        if diagnosis.is_empty() {
            return Err(TreatmentError::EmptyDiagnosis);
        }
        let level = self.level.ok_or(TreatmentError::MissingLevel)?;

        Ok(TreatmentRecord {
            booking_id: booking_id.to_string(),
            diagnosis: diagnosis.to_string(),
            level,
            note: self.note.trim().to_string(),
        })
    }
}

/// Send a treatment record to the API
///
/// # Errors
///
/// Returns [`TreatmentError::Submit`] if the request fails.
pub async fn submit_treatment(
    client: &ApiClient,
    path: &str,
    record: &TreatmentRecord,
) -> Result<(), TreatmentError> {
    let _: serde_json::Value = client.post_json(path, record).await?;
    tracing::info!(
        booking_id = %record.booking_id,
        level = %record.level,
        "Treatment saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled() -> TreatmentDraft {
        TreatmentDraft {
            booking_id: "b-17".to_string(),
            diagnosis: "  Seasonal allergy ".to_string(),
            level: Some(TreatmentLevel::Mild),
            note: "Antihistamine for 7 days\n".to_string(),
        }
    }

    #[test]
    fn test_validate_trims() {
        let record = filled().validate().unwrap();
        assert_eq!(
            record,
            TreatmentRecord {
                booking_id: "b-17".to_string(),
                diagnosis: "Seasonal allergy".to_string(),
                level: TreatmentLevel::Mild,
                note: "Antihistamine for 7 days".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_missing_fields() {
        let mut draft = filled();
        draft.booking_id.clear();
        assert!(matches!(draft.validate(), Err(TreatmentError::MissingBooking)));

        let mut draft = filled();
        draft.diagnosis = "   ".to_string();
        assert!(matches!(draft.validate(), Err(TreatmentError::EmptyDiagnosis)));

        let mut draft = filled();
        draft.level = None;
        assert!(matches!(draft.validate(), Err(TreatmentError::MissingLevel)));
    }

    #[test]
    fn test_record_json_shape() {
        let json = serde_json::to_value(filled().validate().unwrap()).unwrap();
        assert_eq!(json["bookingId"], "b-17");
        assert_eq!(json["level"], "MILD");
    }

    #[test]
    fn test_level_cycles() {
        let mut level = TreatmentLevel::Mild;
        for _ in 0..TreatmentLevel::ALL.len() {
            level = level.next();
        }
        assert_eq!(level, TreatmentLevel::Mild);
    }
}
