//! The transient modal shown on a visited page, and the page it lives in.

use uuid::Uuid;

use crate::utils::markdown;

/// DOM id of the overlay element.
pub const OVERLAY_ELEMENT_ID: &str = "summarist-modal";
pub const OVERLAY_TITLE: &str = "Page Summary";
pub const FETCHING_MESSAGE: &str = "Fetching summary...";
pub const INSUFFICIENT_CONTENT_MESSAGE: &str =
    "Could not find enough text on this page to summarize.";
pub const FAILURE_PREFIX: &str = "Failed to fetch summary.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayStatus {
    Fetching,
    InsufficientContent,
    Rendered { html: String },
    Failed { message: String },
}

/// One overlay element. `instance` tells apart successive overlays that
/// share the same DOM id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub element_id: String,
    pub instance: Uuid,
    pub status: OverlayStatus,
}

impl Overlay {
    #[must_use]
    pub fn fetching() -> Self {
        Self {
            element_id: OVERLAY_ELEMENT_ID.to_string(),
            instance: Uuid::new_v4(),
            status: OverlayStatus::Fetching,
        }
    }

    pub fn show_insufficient_content(&mut self) {
        self.status = OverlayStatus::InsufficientContent;
    }

    pub fn show_summary(&mut self, summary_markdown: &str) {
        self.status = OverlayStatus::Rendered {
            html: markdown::render_html(summary_markdown),
        };
    }

    /// Shows `message` verbatim after the failure prefix.
    pub fn show_error(&mut self, message: &str) {
        self.status = OverlayStatus::Failed {
            message: format!("{FAILURE_PREFIX} {message}"),
        };
    }

    /// Body markup as the overlay would display it.
    #[must_use]
    pub fn body_html(&self) -> String {
        match &self.status {
            OverlayStatus::Fetching => format!("<p>{FETCHING_MESSAGE}</p>"),
            OverlayStatus::InsufficientContent => format!("<p>{INSUFFICIENT_CONTENT_MESSAGE}</p>"),
            OverlayStatus::Rendered { html } => html.clone(),
            OverlayStatus::Failed { message } => format!("<p>{}</p>", escape_text(message)),
        }
    }
}

/// Host page of one tab plus the elements the extension added to it.
#[derive(Debug, Clone)]
pub struct TabDocument {
    pub url: String,
    pub html: String,
    overlays: Vec<Overlay>,
}

impl TabDocument {
    #[must_use]
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            overlays: Vec::new(),
        }
    }

    /// Removes every element with `element_id`; returns how many went away.
    pub fn remove_element(&mut self, element_id: &str) -> usize {
        let before = self.overlays.len();
        self.overlays.retain(|o| o.element_id != element_id);
        before - self.overlays.len()
    }

    pub fn append_overlay(&mut self, overlay: Overlay) {
        self.overlays.push(overlay);
    }

    #[must_use]
    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    #[must_use]
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlays
            .iter()
            .find(|o| o.element_id == OVERLAY_ELEMENT_ID)
    }

    /// The overlay with this instance id, if the user has not closed it.
    pub fn overlay_mut(&mut self, instance: Uuid) -> Option<&mut Overlay> {
        self.overlays.iter_mut().find(|o| o.instance == instance)
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
