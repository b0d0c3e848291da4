//! Reports.

use mia_core::report::model::{NewReport, Report, ReportUpdate};
use mia_core::report::{validate_new_report, validate_report_update};
use mia_core::MiaResult;
use serde::Deserialize;
use tracing::info;

use crate::gateway::RequestGateway;
use crate::request::{path_segment, OutboundRequest};

#[derive(Debug, Deserialize)]
struct CreatedReport {
    report_id: String,
}

/// Create a draft report. Returns its id.
pub async fn create(gateway: &RequestGateway, report: &NewReport) -> MiaResult<String> {
    let report = validate_new_report(report)?;
    let request = OutboundRequest::post("/reports/").json(&report)?;

    let created: CreatedReport = gateway.send_json(request).await.into_result()?;
    info!(report_id = %created.report_id, patient_id = %report.patient_id, "Created report");
    Ok(created.report_id)
}

/// Reports written for a patient.
pub async fn for_patient(gateway: &RequestGateway, patient_id: &str) -> MiaResult<Vec<Report>> {
    let patient_id = path_segment("patient id", patient_id)?;
    let request = OutboundRequest::get(format!("/reports/patient/{}", patient_id));
    gateway.send_json(request).await.into_result()
}

/// Apply a partial update to a report.
pub async fn update(gateway: &RequestGateway, report_id: &str, update: &ReportUpdate) -> MiaResult<()> {
    let report_id = path_segment("report id", report_id)?;
    validate_report_update(update)?;

    let request = OutboundRequest::put(format!("/reports/{}", report_id)).json(update)?;
    gateway.send(request).await.into_result()?;
    info!(report_id = %report_id, "Updated report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use mia_core::report::model::ReportStatus;
    use mia_core::{MiaError, StudyType};
    use mia_store::SessionStore;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> RequestGateway {
        let config = ClientConfig::new(&server.uri()).unwrap();
        RequestGateway::new(&config, Arc::new(SessionStore::in_memory())).unwrap()
    }

    #[tokio::test]
    async fn test_create() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reports/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "message": "Report created successfully", "data": {"report_id": "r-1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let report = NewReport {
            patient_id: "P-001".to_string(),
            image_id: "img-1".to_string(),
            study_type: StudyType::BrainMri,
            findings: "Normal parenchyma.".to_string(),
            impression: "Normal brain MRI study.".to_string(),
        };
        assert_eq!(create(&gateway_for(&server), &report).await.unwrap(), "r-1");
    }

    #[tokio::test]
    async fn test_update_sends_only_changes() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/reports/r-1"))
            .and(body_json(serde_json::json!({"status": "reviewed", "review_notes": "ok"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "message": "Report updated successfully"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let change = ReportUpdate {
            status: Some(ReportStatus::Reviewed),
            review_notes: Some("ok".to_string()),
            ..Default::default()
        };
        update(&gateway_for(&server), "r-1", &change).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_missing_report() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/reports/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "detail": "Report not found"
            })))
            .mount(&server)
            .await;

        let change = ReportUpdate {
            findings: Some("x".to_string()),
            ..Default::default()
        };
        let err = update(&gateway_for(&server), "nope", &change).await.unwrap_err();
        assert_eq!(err.to_string(), "Report not found");
    }

    #[tokio::test]
    async fn test_for_patient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reports/patient/P-001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "Reports retrieved successfully",
                "data": [{
                    "_id": "r-1",
                    "patient_id": "P-001",
                    "image_id": "img-1",
                    "study_type": "brain_mri",
                    "findings": "Normal parenchyma.",
                    "impression": "Normal brain MRI study.",
                    "status": "draft"
                }]
            })))
            .mount(&server)
            .await;

        let reports = for_patient(&gateway_for(&server), "P-001").await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].version, 1);
        assert_eq!(reports[0].status, ReportStatus::Draft);
        assert!(matches!(
            for_patient(&gateway_for(&server), " ").await,
            Err(MiaError::Validation(_))
        ));
    }
}
