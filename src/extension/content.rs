//! Content script: per-tab overlay session driving one summary request.

use std::fmt;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::messaging::{ExtensionMessage, MessageReply, MessageSender};
use super::overlay::{OVERLAY_ELEMENT_ID, Overlay, OverlayStatus, TabDocument};
use crate::errors::SummaristError;
use crate::utils::{links, text};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabContext {
    pub tab_id: TabId,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Browser-internal page; nothing was touched.
    Refused,
    InsufficientContent,
    Rendered,
    Failed(String),
    /// The user closed the overlay before the reply arrived.
    Abandoned,
}

/// A summary request ready to be sent for a specific overlay instance.
#[derive(Debug)]
pub struct PendingSummary {
    pub instance: Uuid,
    pub text: String,
}

impl PendingSummary {
    /// Sends the text to the background dispatcher. Holds no borrow of the
    /// session, so the overlay can be closed while this is in flight.
    pub async fn request_summary(
        self,
        sender: &MessageSender,
    ) -> (Uuid, Result<MessageReply, SummaristError>) {
        let reply = sender.send(ExtensionMessage::summarize_text(self.text)).await;
        (self.instance, reply)
    }
}

/// Where `begin` left the overlay.
#[derive(Debug)]
pub enum Started {
    Refused,
    InsufficientContent,
    Pending(PendingSummary),
}

/// Overlay state for one tab. At most one overlay exists per session.
#[derive(Debug)]
pub struct OverlaySession {
    tab: TabContext,
    document: TabDocument,
}

impl OverlaySession {
    #[must_use]
    pub fn new(tab: TabContext, html: impl Into<String>) -> Self {
        let document = TabDocument::new(tab.url.clone(), html);
        Self { tab, document }
    }

    #[must_use]
    pub fn tab(&self) -> &TabContext {
        &self.tab
    }

    #[must_use]
    pub fn document(&self) -> &TabDocument {
        &self.document
    }

    /// Replaces any existing overlay with a fresh one and extracts the page
    /// text. Returns the request to send, if the page warrants one.
    pub fn begin(&mut self) -> Started {
        if links::is_restricted_url(&self.tab.url) {
            info!(tab_id = %self.tab.tab_id, url = %self.tab.url, "Cannot run on internal browser pages");
            return Started::Refused;
        }

        let removed = self.document.remove_element(OVERLAY_ELEMENT_ID);
        if removed > 0 {
            info!(tab_id = %self.tab.tab_id, "Replaced existing overlay");
        }
        let mut overlay = Overlay::fetching();
        let instance = overlay.instance;

        let page_text = match self.extract_text() {
            Ok(t) => t,
            Err(e) => {
                warn!(tab_id = %self.tab.tab_id, "Text extraction failed: {}", e);
                String::new()
            }
        };

        if !text::has_enough_content(&page_text) {
            overlay.show_insufficient_content();
            self.document.append_overlay(overlay);
            return Started::InsufficientContent;
        }

        self.document.append_overlay(overlay);
        Started::Pending(PendingSummary {
            instance,
            text: page_text,
        })
    }

    /// Visible text of the host page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page HTML cannot be rendered to text.
    pub fn extract_text(&self) -> Result<String, SummaristError> {
        text::visible_text(&self.document.html)
    }

    /// Applies a reply to the overlay it was requested for.
    pub fn finish(
        &mut self,
        instance: Uuid,
        reply: Result<MessageReply, SummaristError>,
    ) -> ActivationOutcome {
        let Some(overlay) = self.document.overlay_mut(instance) else {
            info!(tab_id = %self.tab.tab_id, "Overlay closed before summary arrived");
            return ActivationOutcome::Abandoned;
        };

        match reply {
            Ok(MessageReply::Summary { summary }) => {
                overlay.show_summary(&summary);
                ActivationOutcome::Rendered
            }
            Ok(MessageReply::Error { error }) => {
                error!(tab_id = %self.tab.tab_id, "Summarist error: {}", error);
                overlay.show_error(&error);
                ActivationOutcome::Failed(error)
            }
            Err(e) => {
                error!(tab_id = %self.tab.tab_id, "Summarist error: {}", e);
                let message = e.to_string();
                overlay.show_error(&message);
                ActivationOutcome::Failed(message)
            }
        }
    }

    /// The close button: removes the overlay from the page.
    pub fn close(&mut self) {
        self.document.remove_element(OVERLAY_ELEMENT_ID);
    }

    #[must_use]
    pub fn overlay_status(&self) -> Option<&OverlayStatus> {
        self.document.overlay().map(|o| &o.status)
    }
}
