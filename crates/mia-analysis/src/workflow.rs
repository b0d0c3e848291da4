//! The analysis workflow.
//!
//! ```text
//! Idle -> FileSelected -> Submitting -> Resolved(Remote | Fallback)
//! ```
//!
//! Every file selection starts a new request with a fresh [`RequestId`].
//! Previews and analysis outcomes carry the id they were started for and are
//! dropped when it is no longer current.

use mia_client::api::analysis::{analyze, analyze_request, RemoteReport};
use mia_client::{OutboundRequest, RequestGateway, ResponseOutcome};
use mia_core::{AnalysisRequest, AnalysisResult, ImageFile, RequestId, ResultOrigin, StudyType};
use tracing::{debug, info, warn};

use crate::export::ReportArtifact;
use crate::preview::{Preview, PreviewTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    FileSelected,
    Submitting,
    Resolved(ResultOrigin),
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FileSelected => "file_selected",
            Self::Submitting => "submitting",
            Self::Resolved(ResultOrigin::Remote) => "resolved_remote",
            Self::Resolved(ResultOrigin::Fallback) => "resolved_fallback",
        }
    }
}

/// A submission that has been started but not resolved.
#[derive(Debug)]
pub struct Submission {
    pub request_id: RequestId,
    pub request: OutboundRequest,
}

#[derive(Debug, Default)]
pub struct AnalysisWorkflow {
    study_type: StudyType,
    last_id: Option<RequestId>,
    current: Option<AnalysisRequest>,
    preview: Option<Preview>,
    result: Option<AnalysisResult>,
    /// Study type snapshot of the request in flight.
    in_flight: Option<(RequestId, StudyType)>,
    last_export_millis: Option<i64>,
}

impl AnalysisWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_study_type(study_type: StudyType) -> Self {
        Self {
            study_type,
            ..Self::default()
        }
    }

    pub fn state(&self) -> WorkflowState {
        if self.current.is_none() {
            WorkflowState::Idle
        } else if self.in_flight.is_some() {
            WorkflowState::Submitting
        } else if let Some(result) = &self.result {
            WorkflowState::Resolved(result.origin)
        } else {
            WorkflowState::FileSelected
        }
    }

    pub fn study_type(&self) -> StudyType {
        self.study_type
    }

    pub fn request(&self) -> Option<&AnalysisRequest> {
        self.current.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Start a new request for `file`, discarding any preview or result of
    /// the previous one.
    pub fn select_file(&mut self, file: ImageFile) -> PreviewTicket {
        let id = self.last_id.map_or(RequestId(1), RequestId::next);
        self.last_id = Some(id);

        if let Some((stale, _)) = self.in_flight.take() {
            debug!(request = %stale, "Abandoning in-flight analysis");
        }
        self.preview = None;
        self.result = None;

        info!(request = %id, file = %file.name, size = file.size(), study_type = %self.study_type, "File selected");
        self.current = Some(AnalysisRequest {
            id,
            file: file.clone(),
            study_type: self.study_type,
        });

        PreviewTicket { request_id: id, file }
    }

    /// Attach a decoded preview. Returns `false` when the ticket is stale.
    pub fn apply_preview(&mut self, ticket: &PreviewTicket, preview: Option<Preview>) -> bool {
        if !self.is_current(ticket.request_id) {
            debug!(request = %ticket.request_id, "Discarding stale preview");
            return false;
        }
        self.preview = preview;
        true
    }

    /// Change the modality. The selected file and preview are kept.
    pub fn change_study_type(&mut self, study_type: StudyType) {
        self.study_type = study_type;
        if let Some(current) = self.current.as_mut() {
            current.study_type = study_type;
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.preview = None;
        self.result = None;
        self.in_flight = None;
    }

    /// Move to `Submitting` and build the call to make. Returns `None`, with
    /// nothing changed, when no file is selected or a submission is already
    /// in flight.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.in_flight.is_some() {
            warn!("Analysis already in progress");
            return None;
        }
        let current = self.current.as_ref()?;

        self.result = None;
        self.in_flight = Some((current.id, current.study_type));
        Some(Submission {
            request_id: current.id,
            request: analyze_request(current),
        })
    }

    /// Apply the outcome of a submission. Returns `false` when the outcome
    /// belongs to a request that is no longer in flight.
    ///
    /// Only a `NetworkOrServerFailure` produces the fallback report.
    pub fn resolve(&mut self, request_id: RequestId, outcome: ResponseOutcome<RemoteReport>) -> bool {
        let study_type = match self.in_flight {
            Some((id, study_type)) if id == request_id => study_type,
            _ => {
                debug!(request = %request_id, outcome = outcome.kind(), "Discarding stale analysis outcome");
                return false;
            }
        };
        self.in_flight = None;

        match outcome {
            ResponseOutcome::Success(report) => {
                let result = AnalysisResult::remote(report.report, report.confidence_score);
                info!(request = %request_id, confidence = result.confidence_score, "Analysis completed");
                self.result = Some(result);
            }
            ResponseOutcome::NetworkOrServerFailure(detail) => {
                warn!(request = %request_id, detail = %detail, "Analysis failed, using fallback report");
                self.result = Some(AnalysisResult::fallback(study_type));
            }
            ResponseOutcome::AuthRejected => {
                info!(request = %request_id, "Analysis rejected, session expired");
                self.clear();
            }
        }
        true
    }

    /// Submit the current file and wait for the result.
    ///
    /// Returns the state reached, or `None` when nothing was submitted.
    pub async fn submit(&mut self, gateway: &RequestGateway) -> Option<WorkflowState> {
        let Submission { request_id, request } = self.begin_submit()?;
        let outcome = analyze(gateway, request).await;
        self.resolve(request_id, outcome);
        Some(self.state())
    }

    /// Package the resolved report for saving. `None` before a result exists.
    pub fn export(&mut self) -> Option<ReportArtifact> {
        if !matches!(self.state(), WorkflowState::Resolved(_)) {
            return None;
        }
        let report = self.result.as_ref()?.report_text.clone();

        let now = chrono::Utc::now().timestamp_millis();
        let millis = match self.last_export_millis {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last_export_millis = Some(millis);
        Some(ReportArtifact::new(millis, report))
    }

    fn is_current(&self, request_id: RequestId) -> bool {
        self.current.as_ref().is_some_and(|c| c.id == request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mia_client::{ClientConfig, GatewayEvent};
    use mia_core::{Session, UserProfile, UserRole};
    use mia_store::SessionStore;
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway_for(server: &MockServer) -> RequestGateway {
        let config = ClientConfig::new(&server.uri()).unwrap();
        let store = SessionStore::in_memory();
        store
            .set(Session::new(
                "tok-1",
                UserProfile {
                    id: "u-1".to_string(),
                    email: "a@b.com".to_string(),
                    first_name: "Ada".to_string(),
                    last_name: "Lovelace".to_string(),
                    role: UserRole::Student,
                    institution: None,
                },
            ))
            .unwrap();
        RequestGateway::new(&config, Arc::new(store)).unwrap()
    }

    fn chest_png() -> ImageFile {
        ImageFile::new("chest.png", vec![1, 2, 3])
    }

    #[tokio::test]
    async fn test_submit_without_file_makes_no_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut workflow = AnalysisWorkflow::new();
        assert!(workflow.submit(&gateway_for(&server)).await.is_none());
        assert_eq!(workflow.state(), WorkflowState::Idle);
        assert!(workflow.result().is_none());
    }

    #[tokio::test]
    async fn test_remote_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "message": "Image analyzed successfully",
                "data": {
                    "analysis": "Study Type: Brain Mri\nIMPRESSION:\nNormal.\nCONFIDENCE SCORE: 91.0%\n",
                    "study_type": "brain_mri"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut workflow = AnalysisWorkflow::with_study_type(StudyType::BrainMri);
        workflow.select_file(chest_png());
        let state = workflow.submit(&gateway_for(&server)).await;

        assert_eq!(state, Some(WorkflowState::Resolved(ResultOrigin::Remote)));
        let result = workflow.result().unwrap();
        assert!((result.confidence_score - 0.91).abs() < 1e-9);
        assert!(result.mentions_study_type(StudyType::BrainMri));
    }

    #[tokio::test]
    async fn test_server_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut workflow = AnalysisWorkflow::with_study_type(StudyType::ChestXray);
        workflow.select_file(chest_png());
        let state = workflow.submit(&gateway_for(&server)).await;

        assert_eq!(state, Some(WorkflowState::Resolved(ResultOrigin::Fallback)));
        let result = workflow.result().unwrap();
        assert!(result.report_text.contains("CHEST XRAY"));
        assert!(result.report_text.contains("85.0%"));
        assert_eq!(result.confidence_score, 0.85);
    }

    #[test]
    fn test_every_failure_falls_back_with_study_type() {
        for study_type in StudyType::ALL {
            for detail in ["service unreachable", "request timed out", "malformed response payload"] {
                let mut workflow = AnalysisWorkflow::with_study_type(study_type);
                workflow.select_file(chest_png());
                let submission = workflow.begin_submit().unwrap();

                assert!(workflow.resolve(submission.request_id, ResponseOutcome::failure(detail)));
                let result = workflow.result().unwrap();
                assert_eq!(result.origin, ResultOrigin::Fallback);
                assert_eq!(result.confidence_score, 0.85);
                assert!(result.report_text.contains(&study_type.report_label()));
            }
        }
    }

    #[test]
    fn test_success_always_resolves_remote() {
        let mut workflow = AnalysisWorkflow::with_study_type(StudyType::ChestXray);
        workflow.select_file(chest_png());
        let submission = workflow.begin_submit().unwrap();

        let report = RemoteReport {
            report: "IMPRESSION:\nNo acute findings.\n".to_string(),
            confidence_score: 0.0,
        };
        assert!(workflow.resolve(submission.request_id, ResponseOutcome::Success(report)));
        assert_eq!(workflow.state(), WorkflowState::Resolved(ResultOrigin::Remote));
        let result = workflow.result().unwrap();
        assert_eq!(result.confidence_score, 0.0);
        assert!(!result.report_text.contains("85.0%"));
    }

    #[tokio::test]
    async fn test_success_without_report_falls_back_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true, "data": {"analysis": null}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut workflow = AnalysisWorkflow::with_study_type(StudyType::BrainMri);
        workflow.select_file(chest_png());
        let submission = workflow.begin_submit().unwrap();
        let outcome = analyze(&gateway_for(&server), submission.request).await;
        assert!(matches!(outcome, ResponseOutcome::NetworkOrServerFailure(_)));

        workflow.resolve(submission.request_id, outcome);
        assert_eq!(workflow.state(), WorkflowState::Resolved(ResultOrigin::Fallback));
        assert!(workflow.result().unwrap().report_text.contains("BRAIN MRI"));
    }

    #[tokio::test]
    async fn test_auth_rejected_returns_to_idle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/analyze"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        let mut events = gateway.subscribe();
        let mut workflow = AnalysisWorkflow::new();
        workflow.select_file(chest_png());

        assert_eq!(workflow.submit(&gateway).await, Some(WorkflowState::Idle));
        assert!(workflow.request().is_none());
        assert!(!gateway.session().is_present());
        assert_eq!(
            events.try_recv().unwrap(),
            GatewayEvent::LoginRequired {
                path: "/analyze".to_string()
            }
        );
    }

    #[test]
    fn test_new_file_discards_result() {
        let mut workflow = AnalysisWorkflow::new();
        workflow.select_file(chest_png());
        let submission = workflow.begin_submit().unwrap();
        workflow.resolve(submission.request_id, ResponseOutcome::failure("down"));
        assert!(workflow.result().is_some());

        workflow.select_file(ImageFile::new("knee.jpg", vec![9]));
        assert_eq!(workflow.state(), WorkflowState::FileSelected);
        assert!(workflow.result().is_none());
        assert!(workflow.preview().is_none());
    }

    #[test]
    fn test_overlapping_submit_is_rejected() {
        let mut workflow = AnalysisWorkflow::new();
        workflow.select_file(chest_png());
        let first = workflow.begin_submit().unwrap();

        assert!(workflow.begin_submit().is_none());
        assert_eq!(workflow.state(), WorkflowState::Submitting);
        assert!(workflow.resolve(first.request_id, ResponseOutcome::failure("down")));
    }

    #[test]
    fn test_stale_outcome_is_ignored() {
        let mut workflow = AnalysisWorkflow::new();
        workflow.select_file(chest_png());
        let old = workflow.begin_submit().unwrap();

        workflow.select_file(ImageFile::new("knee.jpg", vec![9]));
        assert!(!workflow.resolve(old.request_id, ResponseOutcome::failure("down")));
        assert_eq!(workflow.state(), WorkflowState::FileSelected);
        assert!(workflow.result().is_none());
    }

    #[test]
    fn test_stale_preview_is_ignored() {
        let mut workflow = AnalysisWorkflow::new();
        let old = workflow.select_file(chest_png());
        let current = workflow.select_file(ImageFile::new("knee.jpg", vec![9]));

        let stale = Preview::decode(&old.file).ok();
        assert!(!workflow.apply_preview(&old, stale));
        assert!(workflow.preview().is_none());

        let fresh = Preview::decode(&current.file).ok();
        assert!(workflow.apply_preview(&current, fresh));
        assert_eq!(workflow.preview().unwrap().mime, "image/jpeg");
    }

    #[test]
    fn test_change_study_type_keeps_file() {
        let mut workflow = AnalysisWorkflow::new();
        let ticket = workflow.select_file(chest_png());
        workflow.apply_preview(&ticket, Preview::decode(&ticket.file).ok());

        workflow.change_study_type(StudyType::Mammography);
        assert_eq!(workflow.request().unwrap().study_type, StudyType::Mammography);
        assert_eq!(workflow.request().unwrap().file.name, "chest.png");
        assert!(workflow.preview().is_some());

        workflow.select_file(ImageFile::new("knee.jpg", vec![9]));
        assert_eq!(workflow.request().unwrap().study_type, StudyType::Mammography);
    }

    #[test]
    fn test_fallback_uses_submitted_study_type() {
        let mut workflow = AnalysisWorkflow::with_study_type(StudyType::SpineMri);
        workflow.select_file(chest_png());
        let submission = workflow.begin_submit().unwrap();
        workflow.change_study_type(StudyType::General);

        workflow.resolve(submission.request_id, ResponseOutcome::failure("down"));
        assert!(workflow.result().unwrap().report_text.contains("SPINE MRI"));
    }

    #[test]
    fn test_clear_resets() {
        let mut workflow = AnalysisWorkflow::new();
        workflow.select_file(chest_png());
        let submission = workflow.begin_submit().unwrap();

        workflow.clear();
        assert_eq!(workflow.state(), WorkflowState::Idle);
        assert!(!workflow.resolve(submission.request_id, ResponseOutcome::failure("down")));
    }

    #[test]
    fn test_export() {
        let mut workflow = AnalysisWorkflow::new();
        assert!(workflow.export().is_none());

        workflow.select_file(chest_png());
        assert!(workflow.export().is_none());
        let submission = workflow.begin_submit().unwrap();
        assert!(workflow.export().is_none());
        workflow.resolve(submission.request_id, ResponseOutcome::failure("down"));

        let first = workflow.export().unwrap();
        let second = workflow.export().unwrap();
        assert_ne!(first.file_name, second.file_name);
        assert!(first.file_name.starts_with("analysis_report_"));
        assert!(first.file_name.ends_with(".txt"));
        assert_eq!(first.contents, workflow.result().unwrap().report_text);
    }
}
