//! Response builders for the Summarization Service.
//!
//! Responses use the API Gateway / Function URL proxy shape: a `statusCode`,
//! CORS `headers`, and a JSON-encoded string `body`.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use crate::core::models::ErrorBody;
use crate::errors::SummaristError;

pub const GENERIC_SUMMARY_FAILURE: &str = "Failed to generate summary.";
pub const GENERIC_ADJUST_FAILURE: &str = "Failed to adjust summary length.";

fn cors_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*",
        "Access-Control-Allow-Methods": "GET, POST, OPTIONS",
        "Access-Control-Allow-Headers": "Content-Type"
    })
}

/// Returns a 200 OK response carrying `body` as JSON.
#[must_use]
pub fn ok_json<T: Serialize>(body: &T) -> Value {
    match serde_json::to_string(body) {
        Ok(body) => json!({ "statusCode": 200, "headers": cors_headers(), "body": body }),
        Err(e) => {
            error!("Failed to serialize response body: {}", e);
            err_response(500, "Failed to encode response", None)
        }
    }
}

/// Returns a 204 response for CORS preflight requests.
#[must_use]
pub fn no_content() -> Value {
    json!({ "statusCode": 204, "headers": cors_headers(), "body": "" })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str, details: Option<&str>) -> Value {
    let body = ErrorBody {
        error: message.to_string(),
        details: details.map(ToString::to_string),
    };
    let body = serde_json::to_string(&body)
        .unwrap_or_else(|_| json!({ "error": message }).to_string());
    json!({ "statusCode": status_code, "headers": cors_headers(), "body": body })
}

/// Maps an error to its HTTP response. `failure` is the generic message
/// used for upstream (LLM) failures on this route.
#[must_use]
pub fn error_response(err: &SummaristError, failure: &str) -> Value {
    match err {
        SummaristError::MissingApiKey(details) => err_response(500, "Missing API Key", Some(details)),
        SummaristError::ValidationError(msg) | SummaristError::ParseError(msg) => {
            err_response(400, msg, None)
        }
        other => err_response(500, failure, Some(&other.to_string())),
    }
}
