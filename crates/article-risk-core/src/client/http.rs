use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{ServiceError, ServiceSettings};
use crate::analysis::{AnalysisRequest, AnalysisResponse, AnalysisService};

/// Relative path of the analysis endpoint.
pub const ANALYZE_PATH: &str = "/api/v1/analyze";

#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    http: Client,
    url: String,
}

impl HttpAnalysisClient {
    pub fn new(settings: &ServiceSettings) -> Result<Self> {
        let user_agent = settings
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("article-risk/{}", env!("CARGO_PKG_VERSION")));
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(settings.timeout)
            .build()
            .context("failed to build analysis HTTP client")?;
        Ok(Self {
            http,
            url: settings.analyze_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    #[instrument(name = "analyze_article", skip(self, request), fields(url = %self.url, body_len = request.body().len()))]
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, ServiceError> {
        let response = self
            .http
            .post(&self.url)
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(ServiceError::Transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ServiceError::Transport)?;
        debug!(status = status.as_u16(), bytes = body.len(), "analysis service responded");

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(ServiceError::Decode)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<serde_json::Value>,
}

/// Pull a textual `detail` or `message` field out of an error body.
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    [parsed.detail, parsed.message]
        .into_iter()
        .flatten()
        .find_map(|value| match value {
            serde_json::Value::String(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        })
}
