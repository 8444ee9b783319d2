//! One summarizer form (page or video) and its request lifecycle.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::clients::SummaryService;
use crate::core::models::{SourceKind, SummaryLength, SummaryResult, UiPhase, UiState};
use crate::errors::SummaristError;
use crate::utils::{links, markdown};

pub const PAGE_FAILURE_MESSAGE: &str =
    "Failed to summarize the web page. Please check the URL and try again.";
pub const VIDEO_FAILURE_MESSAGE: &str =
    "Failed to summarize the video. Please check the URL and try again.";
pub const ADJUST_FAILURE_MESSAGE: &str = "Failed to adjust summary length. Please try again.";

/// A user-visible toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    fn new(title: &str, description: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// Marks a request in flight. If the request future is dropped before
/// `complete`, the phase falls back to `cancelled` so the form is usable again.
struct InFlight<'a> {
    state: &'a mut UiState,
    cancelled: UiPhase,
    done: bool,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a mut UiState, busy: UiPhase, cancelled: UiPhase) -> Self {
        *state = UiState {
            phase: busy,
            error_message: None,
        };
        Self {
            state,
            cancelled,
            done: false,
        }
    }

    fn complete(mut self) {
        self.done = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.done {
            warn!(phase = ?self.cancelled, "Request dropped before completion");
            self.state.phase = self.cancelled;
        }
    }
}

pub struct SummarizerSession {
    kind: SourceKind,
    service: Arc<dyn SummaryService>,
    url_input: String,
    field_error: Option<String>,
    state: UiState,
    result: Option<SummaryResult>,
    notices: Vec<Notice>,
}

impl SummarizerSession {
    #[must_use]
    pub fn new(kind: SourceKind, service: Arc<dyn SummaryService>) -> Self {
        Self {
            kind,
            service,
            url_input: String::new(),
            field_error: None,
            state: UiState::default(),
            result: None,
            notices: Vec::new(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    #[must_use]
    pub fn state(&self) -> &UiState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> UiPhase {
        self.state.phase
    }

    #[must_use]
    pub fn result(&self) -> Option<&SummaryResult> {
        self.result.as_ref()
    }

    /// Inline validation message for the URL field.
    #[must_use]
    pub fn field_error(&self) -> Option<&str> {
        self.field_error.as_deref()
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    #[must_use]
    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    /// True while a request is in flight; the triggering controls are disabled.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self.state.phase, UiPhase::Loading | UiPhase::Adjusting)
    }

    /// The summary as display HTML. Hidden while a new summary is loading.
    #[must_use]
    pub fn rendered_summary(&self) -> Option<String> {
        if self.state.phase == UiPhase::Loading {
            return None;
        }
        self.result
            .as_ref()
            .map(|r| markdown::render_html(&r.current_summary))
    }

    fn validate(&self, raw_url: &str) -> Result<String, SummaristError> {
        let url = match self.kind {
            SourceKind::WebPage => links::parse_web_url(raw_url)?,
            SourceKind::Video => links::parse_video_url(raw_url)?,
        };
        Ok(links::normalize_url(url))
    }

    /// Submits the form. Invalid input sets the field error and makes no call.
    pub async fn submit(&mut self, raw_url: &str, length: SummaryLength) -> UiPhase {
        if self.is_busy() {
            warn!("Ignoring submit while a request is in flight");
            return self.state.phase;
        }

        self.url_input = raw_url.to_string();
        let url = match self.validate(raw_url) {
            Ok(url) => url,
            Err(e) => {
                self.field_error = Some(e.to_string());
                return self.state.phase;
            }
        };
        self.field_error = None;

        self.result = None;

        info!(kind = ?self.kind, %url, %length, "Requesting summary");
        let service = Arc::clone(&self.service);
        let outcome = {
            let in_flight = InFlight::enter(&mut self.state, UiPhase::Loading, UiPhase::Idle);
            let outcome = service.summarize_url(self.kind, &url, length).await;
            in_flight.complete();
            outcome
        };

        match outcome {
            Ok(summary) => {
                self.result = Some(SummaryResult {
                    original_text: summary.clone(),
                    current_summary: summary,
                    current_length: length,
                });
                self.state.phase = UiPhase::Ready;
            }
            Err(e) => {
                error!("Summarization failed: {}", e);
                let message = match self.kind {
                    SourceKind::WebPage => PAGE_FAILURE_MESSAGE,
                    SourceKind::Video => VIDEO_FAILURE_MESSAGE,
                };
                self.fail(message, &e);
            }
        }
        self.state.phase
    }

    /// Re-requests the current summary at another length. Without a summary
    /// the request is refused with a notice and no call is made.
    pub async fn adjust_length(&mut self, length: SummaryLength) -> UiPhase {
        if self.is_busy() {
            warn!("Ignoring length change while a request is in flight");
            return self.state.phase;
        }

        if self.kind == SourceKind::Video && self.validate(&self.url_input).is_err() {
            self.notices.push(Notice::new(
                "Missing URL",
                "Please enter a valid YouTube video URL first.",
            ));
            self.field_error = Some(links::INVALID_VIDEO_URL_MESSAGE.to_string());
            return self.state.phase;
        }

        let Some(result) = self.result.as_ref() else {
            self.notices.push(Notice::new(
                "No summary available",
                "Please generate a summary first before changing its length.",
            ));
            return self.state.phase;
        };
        let (text, summary) = (result.original_text.clone(), result.current_summary.clone());

        info!(%length, "Adjusting summary length");
        let service = Arc::clone(&self.service);
        let outcome = {
            let in_flight = InFlight::enter(&mut self.state, UiPhase::Adjusting, UiPhase::Ready);
            let outcome = service.adjust_length(&text, &summary, length).await;
            in_flight.complete();
            outcome
        };

        match outcome {
            Ok(adjusted) => {
                if let Some(result) = self.result.as_mut() {
                    result.current_summary = adjusted;
                    result.current_length = length;
                }
                self.state.phase = UiPhase::Ready;
            }
            Err(e) => {
                error!("Length adjustment failed: {}", e);
                self.fail(ADJUST_FAILURE_MESSAGE, &e);
            }
        }
        self.state.phase
    }

    fn fail(&mut self, message: &str, err: &SummaristError) {
        self.state = UiState {
            phase: UiPhase::Errored,
            error_message: Some(message.to_string()),
        };
        self.notices
            .push(Notice::new("An error occurred", err.to_string()));
    }
}
