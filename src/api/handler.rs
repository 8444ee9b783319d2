//! Summarization Service handler - thin router over the LLM client.
//!
//! Routes:
//! - `POST /api/summarize` with `{ text }`
//! - `GET /api/summarize?url=...&length=...&kind=...`
//! - `POST /api/adjust-length` with `{ text, summary, length }`

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, warn};

use super::{helpers, parsing};
use crate::ai::LlmClient;
use crate::core::config::AppConfig;
use crate::core::models::{
    AdjustLengthRequest, AdjustLengthResponse, SourceKind, SummarizeResponse, SummaryLength,
    SummaryPayload, SummaryRequest,
};
use crate::errors::SummaristError;
use crate::utils::links;

pub use self::function_handler as handler;

pub const SUMMARIZE_PATH: &str = "/api/summarize";
pub const ADJUST_LENGTH_PATH: &str = "/api/adjust-length";

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Returns an error only when configuration cannot be read; every request
/// failure is turned into an HTTP error payload.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;
    Ok(handle_request(&config, &event.payload).await)
}

/// Routes one proxy event and always produces a response payload.
pub async fn handle_request(config: &AppConfig, payload: &Value) -> Value {
    let method = parsing::request_method(payload);
    let path = parsing::request_path(payload).unwrap_or("/");
    let trace_id = payload
        .get("headers")
        .and_then(|h| parsing::get_header_value(h, "X-Amzn-Trace-Id"))
        .unwrap_or("");
    info!(%method, %path, xray_trace_id = %trace_id, "Summarization Service request");

    if method == "OPTIONS" {
        return helpers::no_content();
    }

    let path = path.trim_end_matches('/');
    if path.ends_with(SUMMARIZE_PATH) {
        match method.as_str() {
            "POST" => summarize_text(config, payload).await,
            "GET" => summarize_url(config, payload).await,
            _ => helpers::err_response(405, "Method not allowed", None),
        }
    } else if path.ends_with(ADJUST_LENGTH_PATH) {
        match method.as_str() {
            "POST" => adjust_length(config, payload).await,
            _ => helpers::err_response(405, "Method not allowed", None),
        }
    } else {
        warn!(%path, "Unknown route");
        helpers::err_response(404, "Not found", None)
    }
}

// ============================================================================
// Routes
// ============================================================================

async fn summarize_text(config: &AppConfig, payload: &Value) -> Value {
    let llm = match LlmClient::from_config(config) {
        Ok(c) => c,
        Err(e) => return missing_key(&e),
    };

    let request = match parse_text_body(payload) {
        Ok(text) => SummaryRequest {
            source_kind: SourceKind::WebPage,
            payload: SummaryPayload::Text(text),
            desired_length: SummaryLength::default(),
        },
        Err(e) => return helpers::error_response(&e, helpers::GENERIC_SUMMARY_FAILURE),
    };

    info!("Summarizing page text");
    summarize(&llm, &request).await
}

async fn summarize_url(config: &AppConfig, payload: &Value) -> Value {
    let llm = match LlmClient::from_config(config) {
        Ok(c) => c,
        Err(e) => return missing_key(&e),
    };

    let request = match parse_url_query(payload) {
        Ok((source_kind, url, desired_length)) => SummaryRequest {
            source_kind,
            payload: SummaryPayload::Url(url),
            desired_length,
        },
        Err(e) => return helpers::error_response(&e, helpers::GENERIC_SUMMARY_FAILURE),
    };

    info!(kind = ?request.source_kind, length = %request.desired_length, "Summarizing URL");
    summarize(&llm, &request).await
}

async fn summarize(llm: &LlmClient, request: &SummaryRequest) -> Value {
    match llm.summarize(request).await {
        Ok(summary) => helpers::ok_json(&SummarizeResponse { summary }),
        Err(e) => {
            error!("Error summarizing {:?}: {}", request.source_kind, e);
            helpers::error_response(&e, helpers::GENERIC_SUMMARY_FAILURE)
        }
    }
}

async fn adjust_length(config: &AppConfig, payload: &Value) -> Value {
    let llm = match LlmClient::from_config(config) {
        Ok(c) => c,
        Err(e) => return missing_key(&e),
    };

    let request = match parse_adjust_body(payload) {
        Ok(r) => r,
        Err(e) => return helpers::error_response(&e, helpers::GENERIC_ADJUST_FAILURE),
    };

    info!(length = %request.length, "Adjusting summary length");
    match llm
        .adjust_length(&request.text, &request.summary, request.length)
        .await
    {
        Ok(adjusted_summary) => helpers::ok_json(&AdjustLengthResponse { adjusted_summary }),
        Err(e) => {
            error!("Error adjusting summary length: {}", e);
            helpers::error_response(&e, helpers::GENERIC_ADJUST_FAILURE)
        }
    }
}

fn missing_key(err: &SummaristError) -> Value {
    error!("Rejecting request: {}", err);
    helpers::error_response(err, helpers::GENERIC_SUMMARY_FAILURE)
}

// ============================================================================
// Request Parsing
// ============================================================================

fn parse_text_body(payload: &Value) -> Result<String, SummaristError> {
    let body = parsing::extract_body(payload)?;
    let json: Value = serde_json::from_str(&body)
        .map_err(|_| SummaristError::ParseError("Invalid JSON body".to_string()))?;

    json.get("text")
        .and_then(|t| t.as_str())
        .filter(|t| !t.trim().is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| SummaristError::ValidationError("Text content is required".to_string()))
}

fn parse_url_query(payload: &Value) -> Result<(SourceKind, String, SummaryLength), SummaristError> {
    let raw_url = parsing::query_param(payload, "url")
        .ok_or_else(|| SummaristError::ValidationError("URL is required".to_string()))?;
    let url = links::parse_web_url(&raw_url)?;

    let kind = match parsing::query_param(payload, "kind") {
        Some(k) => k.parse::<SourceKind>()?,
        None => links::classify_url(&url),
    };
    if kind == SourceKind::Video && !links::is_video_url(&url) {
        return Err(SummaristError::ValidationError(
            links::INVALID_VIDEO_URL_MESSAGE.to_string(),
        ));
    }

    let length = match parsing::query_param(payload, "length") {
        Some(l) => l.parse::<SummaryLength>()?,
        None => SummaryLength::default(),
    };

    Ok((kind, links::normalize_url(url), length))
}

fn parse_adjust_body(payload: &Value) -> Result<AdjustLengthRequest, SummaristError> {
    let body = parsing::extract_body(payload)?;
    let request: AdjustLengthRequest = serde_json::from_str(&body).map_err(|e| {
        SummaristError::ValidationError(format!("Invalid adjust-length request: {e}"))
    })?;

    if request.text.trim().is_empty() || request.summary.trim().is_empty() {
        return Err(SummaristError::ValidationError(
            "Text and summary are required".to_string(),
        ));
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_body_requires_non_blank_text() {
        let ok = json!({ "body": r#"{"text":"hello"}"# });
        assert_eq!(parse_text_body(&ok).unwrap(), "hello");

        for body in [r#"{}"#, r#"{"text":"   "}"#, r#"{"text":5}"#] {
            let err = parse_text_body(&json!({ "body": body })).unwrap_err();
            assert_eq!(err.to_string(), "Text content is required");
        }

        let err = parse_text_body(&json!({ "body": "not json" })).unwrap_err();
        assert!(matches!(err, SummaristError::ParseError(_)));
    }

    #[test]
    fn url_query_infers_kind_and_defaults_length() {
        let payload = json!({ "queryStringParameters": { "url": "https://youtu.be/abc" } });
        let (kind, url, length) = parse_url_query(&payload).unwrap();
        assert_eq!(kind, SourceKind::Video);
        assert_eq!(url, "https://youtu.be/abc");
        assert_eq!(length, SummaryLength::Medium);
    }

    #[test]
    fn url_query_rejects_video_kind_for_page_url() {
        let payload = json!({ "queryStringParameters": {
            "url": "https://example.com/article", "kind": "video"
        }});
        let err = parse_url_query(&payload).unwrap_err();
        assert_eq!(err.to_string(), links::INVALID_VIDEO_URL_MESSAGE);
    }

    #[test]
    fn adjust_body_rejects_unknown_length() {
        let payload = json!({ "body": r#"{"text":"t","summary":"s","length":"huge"}"# });
        assert!(parse_adjust_body(&payload).unwrap_err().is_validation());
    }
}
