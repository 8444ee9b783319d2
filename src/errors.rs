use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaristError {
    #[error("Missing API Key: {0}")]
    MissingApiKey(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Failed to parse request: {0}")]
    ParseError(String),

    #[error("Failed to access OpenAI API: {0}")]
    OpenAIError(String),

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    /// Error payload returned by the Summarization Service.
    #[error("{}", .details.as_deref().unwrap_or(.error.as_str()))]
    UpstreamError {
        error: String,
        details: Option<String>,
    },

    #[error("Could not communicate with the extension background worker: {0}")]
    ChannelError(String),

    #[error("Failed to inject content script: {0}")]
    InjectionError(String),
}

impl SummaristError {
    /// True for errors raised before any network call was attempted.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }
}

impl From<reqwest::Error> for SummaristError {
    fn from(error: reqwest::Error) -> Self {
        SummaristError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for SummaristError {
    fn from(error: serde_json::Error) -> Self {
        SummaristError::ParseError(error.to_string())
    }
}
