//! Reports written against uploaded images.

pub mod model;

use crate::error::{MiaError, MiaResult};
use crate::session::required;
use model::{NewReport, ReportUpdate};

/// Validate a new report form.
pub fn validate_new_report(report: &NewReport) -> MiaResult<NewReport> {
    Ok(NewReport {
        patient_id: required("patient id", &report.patient_id)?,
        image_id: required("image id", &report.image_id)?,
        study_type: report.study_type,
        findings: required("findings", &report.findings)?,
        impression: required("impression", &report.impression)?,
    })
}

/// An update must change at least one field.
pub fn validate_report_update(update: &ReportUpdate) -> MiaResult<()> {
    if update.is_empty() {
        return Err(MiaError::validation("report update has no fields to change"));
    }
    Ok(())
}
