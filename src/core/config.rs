use std::env;

use crate::errors::SummaristError;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-5";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_BASE: &str = "http://localhost:9002";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Absent credentials are reported per request, not at load time.
    pub openai_api_key: Option<String>,
    pub openai_org_id: Option<String>,
    pub openai_model: Option<String>,
    pub openai_base_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            openai_api_key: non_blank(env::var("OPENAI_API_KEY").ok()),
            openai_org_id: non_blank(env::var("OPENAI_ORG_ID").ok()),
            openai_model: non_blank(env::var("OPENAI_MODEL").ok()),
            openai_base_url: non_blank(env::var("OPENAI_BASE_URL").ok()),
        })
    }

    /// Returns the provider credential or the distinguished missing-key error.
    pub fn require_api_key(&self) -> Result<&str, SummaristError> {
        self.openai_api_key.as_deref().ok_or_else(|| {
            SummaristError::MissingApiKey(
                "The OPENAI_API_KEY environment variable is not set on the server.".to_string(),
            )
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.openai_model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.openai_base_url
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_BASE_URL)
            .trim_end_matches('/')
    }
}

/// Settings for code that talks to the Summarization Service.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, String> {
        let api_base = non_blank(env::var("SUMMARIST_API_BASE").ok())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        url::Url::parse(&api_base).map_err(|e| format!("SUMMARIST_API_BASE: {}", e))?;
        Ok(Self { api_base })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
