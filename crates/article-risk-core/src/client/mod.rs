mod http;
mod settings;

use thiserror::Error;

pub use http::{HttpAnalysisClient, ANALYZE_PATH};
pub use settings::{parse_timeout, ServiceSettings};

/// Failures surfaced while talking to the analysis service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to reach analysis service: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("analysis service responded with status {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("failed to decode analysis response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("analysis failed without further details")]
    Unspecified,
}

impl ServiceError {
    /// Human-readable text for the operator, if the failure carries any.
    pub fn user_message(&self) -> Option<String> {
        let message = match self {
            Self::Transport(err) => err.to_string(),
            Self::Status { status, detail } => detail
                .clone()
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| format!("Request failed with status code {status}")),
            Self::Decode(err) => err.to_string(),
            Self::Unspecified => return None,
        };
        Some(message).filter(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_prefers_service_detail() {
        let err = ServiceError::Status {
            status: 422,
            detail: Some("본문이 너무 짧습니다".into()),
        };
        assert_eq!(err.user_message().as_deref(), Some("본문이 너무 짧습니다"));

        let err = ServiceError::Status {
            status: 500,
            detail: None,
        };
        assert_eq!(
            err.user_message().as_deref(),
            Some("Request failed with status code 500")
        );
    }

    #[test]
    fn blank_detail_falls_back_to_status_text() {
        let err = ServiceError::Status {
            status: 502,
            detail: Some("  ".into()),
        };
        assert_eq!(
            err.user_message().as_deref(),
            Some("Request failed with status code 502")
        );
        assert!(ServiceError::Unspecified.user_message().is_none());
    }
}
