//! The analysis endpoint.

use mia_core::analysis::parse_confidence;
use mia_core::AnalysisRequest;
use serde_json::Value;
use tracing::{info, warn};

use crate::gateway::RequestGateway;
use crate::outcome::{ResponseOutcome, MALFORMED};
use crate::request::{MultipartBody, OutboundRequest};

/// Report returned by the analysis service.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteReport {
    pub report: String,
    /// As reported; 0 when the service gave none.
    pub confidence_score: f64,
}

/// Build the `POST /analyze` call for a request: multipart `file` plus
/// `study_type`.
pub fn analyze_request(request: &AnalysisRequest) -> OutboundRequest {
    let body = MultipartBody::new()
        .file("file", &request.file)
        .text("study_type", request.study_type.as_str());
    OutboundRequest::post("/analyze").multipart(body)
}

/// Send an `/analyze` call and decode its report. A 2xx without a usable
/// report is a [`ResponseOutcome::NetworkOrServerFailure`].
pub async fn analyze(gateway: &RequestGateway, request: OutboundRequest) -> ResponseOutcome<RemoteReport> {
    info!(path = %request.path, "Submitting image for analysis");
    gateway.send(request).await.and_then(|body| match decode_report(&body) {
        Some(report) => ResponseOutcome::Success(report),
        None => {
            warn!("Analysis response carried no report");
            ResponseOutcome::failure(MALFORMED)
        }
    })
}

/// `data.analysis` is either the report text, with the score on its
/// `CONFIDENCE SCORE:` line, or an object carrying `report` and
/// `confidence_score`.
fn decode_report(body: &Value) -> Option<RemoteReport> {
    let data = match body.get("success") {
        Some(_) => body.get("data")?,
        None => body,
    };

    match data.get("analysis")? {
        Value::String(report) => Some(RemoteReport {
            confidence_score: parse_confidence(report).unwrap_or(0.0),
            report: report.clone(),
        }),
        Value::Object(analysis) => {
            let report = analysis.get("report").and_then(Value::as_str)?;
            let confidence_score = analysis
                .get("confidence_score")
                .and_then(Value::as_f64)
                .or_else(|| parse_confidence(report))
                .unwrap_or(0.0);
            Some(RemoteReport {
                report: report.to_string(),
                confidence_score,
            })
        }
        _ => None,
    }
}
