use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::AnalysisError;
use crate::response::RawResponse;
use crate::state::SubmissionTicket;

/// Carries one submission to the analysis service.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    async fn send(&self, ticket: &SubmissionTicket) -> Result<RawResponse, AnalysisError>;
}

pub struct HttpTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(format!("analysis-client/{}", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    /// Fetches the service root and returns its `message` field.
    pub async fn health(&self) -> anyhow::Result<String> {
        let url = self.config.service_root();
        let resp = self.http.get(url.clone()).send().await?.error_for_status()?;
        let json: serde_json::Value = resp.json().await?;
        Ok(json["message"]
            .as_str()
            .map(String::from)
            .unwrap_or_else(|| format!("{url} answered without a message")))
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    async fn send(&self, ticket: &SubmissionTicket) -> Result<RawResponse, AnalysisError> {
        let part = Part::bytes(ticket.file.bytes.clone())
            .file_name(ticket.file.name.clone())
            .mime_str(ticket.file.mime_type())
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);

        debug!(url = %self.config.endpoint, request_id = %ticket.request_id, "posting file");
        let resp = self
            .http
            .post(self.config.endpoint.clone())
            .header("x-request-id", ticket.request_id.to_string())
            .multipart(form)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        Ok(RawResponse { status, body })
    }
}
