//! LLM (`OpenAI`) API client module
//!
//! Encapsulates all LLM API interactions for generating and resizing summaries.

use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};

use super::prompt::{self, SYSTEM_PROMPT};
use crate::core::config::AppConfig;
use crate::core::models::{SourceKind, SummaryLength, SummaryPayload, SummaryRequest};
use crate::errors::SummaristError;

const MAX_CONTEXT_TOKENS: usize = 400_000;
const MAX_OUTPUT_TOKENS: usize = 16_000;
const TOKEN_BUFFER: usize = 250;
const MIN_OUTPUT_TOKENS: usize = 500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(810);

pub const TOO_LONG_MESSAGE: &str =
    "The page is too long to summarize in full. Try summarizing a shorter page or a single section.";

#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4 + 1
}

/// LLM API client for generating summaries
pub struct LlmClient {
    api_key: String,
    org_id: Option<String>,
    model_name: String,
    base_url: String,
}

impl LlmClient {
    #[must_use]
    pub fn new(api_key: String, org_id: Option<String>, model_name: String, base_url: String) -> Self {
        Self {
            api_key,
            org_id,
            model_name,
            base_url,
        }
    }

    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `SummaristError::MissingApiKey` when no credential is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, SummaristError> {
        let api_key = config.require_api_key()?.to_string();
        Ok(Self::new(
            api_key,
            config.openai_org_id.clone(),
            config.model().to_string(),
            config.base_url().to_string(),
        ))
    }

    pub fn build_prompt(&self, user_content: &str) -> Vec<ChatCompletionMessage> {
        vec![
            ChatCompletionMessage {
                role: MessageRole::system,
                content: Content::Text(SYSTEM_PROMPT.to_string()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
            ChatCompletionMessage {
                role: MessageRole::user,
                content: Content::Text(user_content.to_string()),
                name: None,
                tool_calls: None,
                tool_call_id: None,
            },
        ]
    }

    /// Summarizes whatever the request carries: page text or a URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the `OpenAI` call fails.
    pub async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummaristError> {
        match &request.payload {
            SummaryPayload::Text(text) => self.summarize_text(text).await,
            SummaryPayload::Url(url) => {
                self.summarize_url(request.source_kind, url, request.desired_length)
                    .await
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if the `OpenAI` call fails.
    pub async fn summarize_text(&self, text: &str) -> Result<String, SummaristError> {
        let prompt = self.build_prompt(&prompt::summarize_text_prompt(text));
        self.generate_summary(prompt).await
    }

    /// # Errors
    ///
    /// Returns an error if the `OpenAI` call fails.
    pub async fn summarize_url(
        &self,
        kind: SourceKind,
        url: &str,
        length: SummaryLength,
    ) -> Result<String, SummaristError> {
        let user_content = match kind {
            SourceKind::WebPage => prompt::summarize_web_page_prompt(url, length),
            SourceKind::Video => prompt::summarize_video_prompt(url, length),
        };
        self.generate_summary(self.build_prompt(&user_content)).await
    }

    /// # Errors
    ///
    /// Returns an error if the `OpenAI` call fails.
    pub async fn adjust_length(
        &self,
        text: &str,
        summary: &str,
        length: SummaryLength,
    ) -> Result<String, SummaristError> {
        let prompt = self.build_prompt(&prompt::adjust_length_prompt(text, summary, length));
        self.generate_summary(prompt).await
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP request to `OpenAI` fails or the response
    /// cannot be parsed into the expected shape.
    pub async fn generate_summary(
        &self,
        prompt: Vec<ChatCompletionMessage>,
    ) -> Result<String, SummaristError> {
        #[cfg(feature = "debug-logs")]
        info!("Using prompt:\n{:?}", prompt);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            "Generating summary with {} messages in prompt",
            prompt.len()
        );

        let estimated_input_tokens = prompt
            .iter()
            .map(|msg| estimate_tokens(&format!("{:?}", msg.content)))
            .sum::<usize>();

        info!("Estimated input tokens: {}", estimated_input_tokens);

        // Saturating math keeps oversized input from underflowing.
        let max_output_tokens = MAX_CONTEXT_TOKENS
            .saturating_sub(estimated_input_tokens)
            .saturating_sub(TOKEN_BUFFER)
            .min(MAX_OUTPUT_TOKENS);

        debug!("Calculated max output tokens: {}", max_output_tokens);

        if max_output_tokens < MIN_OUTPUT_TOKENS {
            return Ok(TOO_LONG_MESSAGE.to_string());
        }

        let request_body = json!({
            "model": self.model_name,
            "input": build_responses_input_from_prompt(&prompt),
            "max_output_tokens": max_output_tokens
        });

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                SummaristError::HttpError(format!("Failed to build OpenAI HTTP client: {e}"))
            })?;

        let mut headers = reqwest::header::HeaderMap::new();
        let auth_value = format!("Bearer {}", self.api_key)
            .parse()
            .map_err(|e| SummaristError::HttpError(format!("Invalid Authorization header: {e}")))?;
        headers.insert("Authorization", auth_value);

        if let Some(org) = &self.org_id {
            let org_value = org.parse().map_err(|e| {
                SummaristError::HttpError(format!("Invalid OpenAI-Organization header: {e}"))
            })?;
            headers.insert("OpenAI-Organization", org_value);
        }

        let response = client
            .post(format!("{}/responses", self.base_url))
            .headers(headers)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| SummaristError::HttpError(format!("OpenAI API request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            return Err(SummaristError::OpenAIError(format!(
                "OpenAI API error (status {status}): {error_text}"
            )));
        }

        let response_json: Value = response.json().await.map_err(|e| {
            SummaristError::OpenAIError(format!("Failed to parse OpenAI response: {e}"))
        })?;

        extract_output_text(&response_json)
            .ok_or_else(|| SummaristError::OpenAIError("No text in response".to_string()))
    }
}

/// Pulls the generated text out of a Responses API payload, preferring the
/// flattened `output_text` field and falling back to the `output` items.
#[must_use]
pub fn extract_output_text(response_json: &Value) -> Option<String> {
    if let Some(s) = response_json.get("output_text").and_then(|v| v.as_str()) {
        return Some(s.to_string());
    }

    let mut collected: Vec<String> = Vec::new();
    let items = response_json.get("output").and_then(|o| o.as_array())?;
    for item in items {
        let Some(parts) = item.get("content").and_then(|c| c.as_array()) else {
            continue;
        };
        for p in parts {
            let is_output_text = p
                .get("type")
                .and_then(|t| t.as_str())
                .is_some_and(|t| t == "output_text");
            if !is_output_text {
                continue;
            }
            if let Some(s) = p.get("text").and_then(|t| t.as_str()) {
                collected.push(s.to_string());
            } else if let Some(s) = p
                .get("text")
                .and_then(|t| t.get("value"))
                .and_then(|v| v.as_str())
            {
                collected.push(s.to_string());
            }
        }
    }

    if collected.is_empty() {
        None
    } else {
        Some(collected.join("\n"))
    }
}

/// Converts chat-style messages to Responses API `input` items. Only system
/// and user text is sent; assistant turns would be read back as output.
pub(crate) fn build_responses_input_from_prompt(prompt: &[ChatCompletionMessage]) -> Vec<Value> {
    prompt
        .iter()
        .filter_map(|m| {
            let role = match m.role {
                MessageRole::system => "system",
                MessageRole::assistant => return None,
                _ => "user",
            };
            let Content::Text(text) = &m.content else {
                return None;
            };
            Some(json!({
                "role": role,
                "content": [{ "type": "input_text", "text": text }]
            }))
        })
        .collect()
}
