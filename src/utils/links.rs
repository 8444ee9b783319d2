use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::core::models::SourceKind;
use crate::errors::SummaristError;

pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL.";
pub const INVALID_VIDEO_URL_MESSAGE: &str = "Please enter a valid YouTube URL.";

/// URL prefixes of browser-internal pages that content scripts cannot run on.
const RESTRICTED_PREFIXES: &[&str] = &[
    "chrome://",
    "chrome-extension://",
    "edge://",
    "about:",
    "moz-extension://",
    "view-source:",
];

static VIDEO_HOST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:www|m|music)\.)?youtube\.com$|^youtu\.be$").expect("static regex compile")
});

/// True for pages under the browser's internal URL schemes.
#[must_use]
pub fn is_restricted_url(url: &str) -> bool {
    let lowered = url.trim().to_ascii_lowercase();
    RESTRICTED_PREFIXES.iter().any(|p| lowered.starts_with(p))
}

/// Parses user input as an absolute `http(s)` URL with a host.
///
/// # Errors
///
/// Returns `SummaristError::ValidationError` for blank or malformed input.
pub fn parse_web_url(raw: &str) -> Result<Url, SummaristError> {
    let raw = raw
        .trim()
        .trim_matches(|c: char| matches!(c, '<' | '>' | '"' | '\''));
    if raw.is_empty() {
        return Err(SummaristError::ValidationError(INVALID_URL_MESSAGE.to_string()));
    }

    let url = Url::parse(raw)
        .map_err(|_| SummaristError::ValidationError(INVALID_URL_MESSAGE.to_string()))?;

    let is_web = matches!(url.scheme(), "http" | "https");
    if !is_web || url.host_str().is_none_or(str::is_empty) {
        return Err(SummaristError::ValidationError(INVALID_URL_MESSAGE.to_string()));
    }

    Ok(url)
}

#[must_use]
pub fn is_video_url(url: &Url) -> bool {
    url.host_str()
        .map(str::to_ascii_lowercase)
        .is_some_and(|host| VIDEO_HOST_RE.is_match(&host))
}

/// Parses input for the video flow: a valid URL on a known video host.
///
/// # Errors
///
/// Returns `SummaristError::ValidationError` when the URL is malformed or not a video URL.
pub fn parse_video_url(raw: &str) -> Result<Url, SummaristError> {
    let url = parse_web_url(raw)
        .map_err(|_| SummaristError::ValidationError(INVALID_VIDEO_URL_MESSAGE.to_string()))?;
    if !is_video_url(&url) {
        return Err(SummaristError::ValidationError(
            INVALID_VIDEO_URL_MESSAGE.to_string(),
        ));
    }
    Ok(url)
}

/// Chooses the summarizer flow for a URL.
#[must_use]
pub fn classify_url(url: &Url) -> SourceKind {
    if is_video_url(url) {
        SourceKind::Video
    } else {
        SourceKind::WebPage
    }
}

/// Canonical string form passed to the service, without the fragment.
#[must_use]
pub fn normalize_url(mut url: Url) -> String {
    url.set_fragment(None);
    url.to_string()
}
