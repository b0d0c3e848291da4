//! Patient records.

use mia_core::patient::model::{NewPatient, Page, Patient};
use mia_core::patient::validate_new_patient;
use mia_core::MiaResult;
use serde::Deserialize;
use tracing::info;

use crate::gateway::RequestGateway;
use crate::request::OutboundRequest;

#[derive(Debug, Deserialize)]
struct CreatedPatient {
    patient_id: String,
}

/// List the patients visible to the current user.
pub async fn list(gateway: &RequestGateway, page: Page) -> MiaResult<Vec<Patient>> {
    let request = OutboundRequest::get("/patients/")
        .query("skip", page.skip)
        .query("limit", page.limit);
    gateway.send_json(request).await.into_result()
}

/// Create a patient record. Returns the record id assigned by the service.
pub async fn create(gateway: &RequestGateway, patient: &NewPatient) -> MiaResult<String> {
    let patient = validate_new_patient(patient)?;
    let request = OutboundRequest::post("/patients/").json(&patient)?;

    let created: CreatedPatient = gateway.send_json(request).await.into_result()?;
    info!(patient_id = %patient.patient_id, id = %created.patient_id, "Created patient");
    Ok(created.patient_id)
}
