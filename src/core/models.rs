use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::SummaristError;

/// Target length category for a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryLength {
    type Err = SummaristError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            other => Err(SummaristError::ValidationError(format!(
                "Unknown summary length '{other}'. Expected short, medium, or long."
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    WebPage,
    Video,
}

impl FromStr for SourceKind {
    type Err = SummaristError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "page" | "webpage" | "web" => Ok(Self::WebPage),
            "video" | "youtube" => Ok(Self::Video),
            other => Err(SummaristError::ValidationError(format!(
                "Unknown source kind '{other}'. Expected page or video."
            ))),
        }
    }
}

/// What a summarization call is asked to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryPayload {
    Url(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub source_kind: SourceKind,
    pub payload: SummaryPayload,
    pub desired_length: SummaryLength,
}

/// A summary held by a session, mutated in place by length adjustments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub original_text: String,
    pub current_summary: String,
    pub current_length: SummaryLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiPhase {
    #[default]
    Idle,
    Loading,
    Adjusting,
    Ready,
    Errored,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiState {
    pub phase: UiPhase,
    pub error_message: Option<String>,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeTextRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustLengthRequest {
    pub text: String,
    pub summary: String,
    pub length: SummaryLength,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustLengthResponse {
    pub adjusted_summary: String,
}
