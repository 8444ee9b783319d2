//! Client side of the Summarization and Length-Adjustment Services.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::core::config::ClientConfig;
use crate::core::models::{
    AdjustLengthRequest, AdjustLengthResponse, ErrorBody, SourceKind, SummarizeResponse,
    SummarizeTextRequest, SummaryLength,
};
use crate::errors::SummaristError;

/// The remote summarizer as seen by the extension and the web front end.
#[async_trait]
pub trait SummaryService: Send + Sync {
    /// Summarizes raw page text.
    async fn summarize_text(&self, text: &str) -> Result<String, SummaristError>;

    /// Summarizes the page or video behind `url`.
    async fn summarize_url(
        &self,
        kind: SourceKind,
        url: &str,
        length: SummaryLength,
    ) -> Result<String, SummaristError>;

    /// Rewrites `summary` of `text` to the requested length.
    async fn adjust_length(
        &self,
        text: &str,
        summary: &str,
        length: SummaryLength,
    ) -> Result<String, SummaristError>;
}

/// `SummaryService` over HTTP (`/api/summarize`, `/api/adjust-length`).
#[derive(Debug, Clone)]
pub struct HttpSummaryService {
    http: Client,
    api_base: Url,
}

impl HttpSummaryService {
    /// # Errors
    ///
    /// Returns `SummaristError::ConfigError` if the API base is not a valid URL.
    pub fn new(config: &ClientConfig) -> Result<Self, SummaristError> {
        let mut api_base = Url::parse(&config.api_base)
            .map_err(|e| SummaristError::ConfigError(format!("Invalid API base URL: {e}")))?;
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            api_base,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SummaristError> {
        self.api_base
            .join(path)
            .map_err(|e| SummaristError::ConfigError(format!("Invalid endpoint {path}: {e}")))
    }
}

#[async_trait]
impl SummaryService for HttpSummaryService {
    async fn summarize_text(&self, text: &str) -> Result<String, SummaristError> {
        let response = self
            .http
            .post(self.endpoint("api/summarize")?)
            .json(&SummarizeTextRequest {
                text: text.to_string(),
            })
            .send()
            .await?;
        let body: SummarizeResponse = read_json(response).await?;
        Ok(body.summary)
    }

    async fn summarize_url(
        &self,
        kind: SourceKind,
        url: &str,
        length: SummaryLength,
    ) -> Result<String, SummaristError> {
        let mut endpoint = self.endpoint("api/summarize")?;
        let kind = match kind {
            SourceKind::WebPage => "page",
            SourceKind::Video => "video",
        };
        endpoint
            .query_pairs_mut()
            .append_pair("url", url)
            .append_pair("kind", kind)
            .append_pair("length", length.as_str());

        let response = self.http.get(endpoint).send().await?;
        let body: SummarizeResponse = read_json(response).await?;
        Ok(body.summary)
    }

    async fn adjust_length(
        &self,
        text: &str,
        summary: &str,
        length: SummaryLength,
    ) -> Result<String, SummaristError> {
        let response = self
            .http
            .post(self.endpoint("api/adjust-length")?)
            .json(&AdjustLengthRequest {
                text: text.to_string(),
                summary: summary.to_string(),
                length,
            })
            .send()
            .await?;
        let body: AdjustLengthResponse = read_json(response).await?;
        Ok(body.adjusted_summary)
    }
}

/// Decodes a service response, turning error statuses and `{ error }`
/// payloads into `SummaristError::UpstreamError`.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SummaristError> {
    let status = response.status();
    let text = response.text().await?;
    debug!(%status, bytes = text.len(), "Summarization Service response");

    let value: Option<Value> = serde_json::from_str(&text).ok();
    let error_body = value
        .as_ref()
        .filter(|v| v.get("error").is_some())
        .and_then(|v| serde_json::from_value::<ErrorBody>(v.clone()).ok());

    if let Some(ErrorBody { error, details }) = error_body {
        warn!(%status, %error, "Summarization Service returned an error");
        return Err(SummaristError::UpstreamError { error, details });
    }

    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("Unknown status");
        return Err(SummaristError::HttpError(format!(
            "Server error: {} {reason}",
            status.as_u16()
        )));
    }

    let value = value.ok_or_else(|| {
        SummaristError::ParseError("Summarization Service returned invalid JSON".to_string())
    })?;
    Ok(serde_json::from_value(value)?)
}
