//! Patient records.

pub mod model;

use crate::error::{MiaError, MiaResult};
use crate::session::required;
use model::NewPatient;

/// Validate a new patient form. Dates must be `YYYY-MM-DD` when given.
pub fn validate_new_patient(patient: &NewPatient) -> MiaResult<NewPatient> {
    let date_of_birth = match patient.date_of_birth.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let date = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                MiaError::validation(format!("date of birth '{}' is not YYYY-MM-DD", raw))
            })?;
            Some(date.format("%Y-%m-%dT00:00:00").to_string())
        }
    };

    Ok(NewPatient {
        patient_id: required("patient id", &patient.patient_id)?,
        first_name: required("first name", &patient.first_name)?,
        last_name: required("last name", &patient.last_name)?,
        date_of_birth,
        gender: optional(&patient.gender),
        medical_history: optional(&patient.medical_history),
    })
}

fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
