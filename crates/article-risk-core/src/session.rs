use std::sync::Arc;

use tracing::{debug, warn};

use crate::analysis::{AnalysisRequest, AnalysisResponse, AnalysisService, RequestValidationError};
use crate::client::ServiceError;

/// Shown when a failure carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "분석 중 오류가 발생했습니다.";

/// Lifecycle of the current analysis request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded(AnalysisResponse),
    Failed(String),
}

/// Owns the single in-flight analysis and the latest outcome.
pub struct AnalysisSession<S: AnalysisService> {
    service: Arc<S>,
    state: SubmissionState,
}

impl<S: AnalysisService> AnalysisSession<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            state: SubmissionState::Idle,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting)
    }

    pub fn latest_result(&self) -> Option<&AnalysisResponse> {
        match &self.state {
            SubmissionState::Succeeded(response) => Some(response),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Whether a submit with these inputs would start a request right now.
    pub fn can_submit(&self, title: &str, body: &str) -> bool {
        !self.is_submitting() && AnalysisRequest::is_submittable(title, body)
    }

    /// Enter `Submitting` and hand back the request to send.
    ///
    /// Returns `Ok(None)` without touching the state when a request is
    /// already outstanding. Invalid input leaves the state unchanged.
    pub fn begin(
        &mut self,
        title: &str,
        body: &str,
    ) -> Result<Option<AnalysisRequest>, RequestValidationError> {
        let request = AnalysisRequest::new(title, body)?;
        if self.is_submitting() {
            debug!("submission ignored while a request is in flight");
            return Ok(None);
        }
        self.state = SubmissionState::Submitting;
        Ok(Some(request))
    }

    /// Record the outcome of the outstanding request.
    pub fn complete(&mut self, outcome: Result<AnalysisResponse, ServiceError>) {
        if !self.is_submitting() {
            warn!("completion received with no request in flight; ignoring");
            return;
        }
        self.state = match outcome {
            Ok(response) => {
                debug!(
                    categories = response.breakdown.len(),
                    score = response.final_risk_score,
                    "analysis succeeded"
                );
                SubmissionState::Succeeded(response)
            }
            Err(err) => {
                warn!(error = %err, "analysis failed");
                SubmissionState::Failed(
                    err.user_message()
                        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string()),
                )
            }
        };
    }

    /// Validate, send, and record one analysis.
    pub async fn submit(
        &mut self,
        title: &str,
        body: &str,
    ) -> Result<&SubmissionState, RequestValidationError> {
        if let Some(request) = self.begin(title, body)? {
            let outcome = self.service.analyze(&request).await;
            self.complete(outcome);
        }
        Ok(&self.state)
    }
}
