use std::sync::Arc;

use tracing::info;

use super::session::SummarizerSession;
use crate::clients::SummaryService;
use crate::core::models::{SourceKind, SummaryLength, UiPhase};
use crate::utils::links;

/// The front page: a Web Page tab and a Video tab, each with its own session.
pub struct Summarizer {
    active: SourceKind,
    page: SummarizerSession,
    video: SummarizerSession,
    auto_submitted: bool,
}

impl Summarizer {
    #[must_use]
    pub fn new(service: Arc<dyn SummaryService>) -> Self {
        Self {
            active: SourceKind::WebPage,
            page: SummarizerSession::new(SourceKind::WebPage, Arc::clone(&service)),
            video: SummarizerSession::new(SourceKind::Video, service),
            auto_submitted: false,
        }
    }

    #[must_use]
    pub fn active_kind(&self) -> SourceKind {
        self.active
    }

    pub fn select(&mut self, kind: SourceKind) {
        self.active = kind;
    }

    #[must_use]
    pub fn session(&self, kind: SourceKind) -> &SummarizerSession {
        match kind {
            SourceKind::WebPage => &self.page,
            SourceKind::Video => &self.video,
        }
    }

    pub fn session_mut(&mut self, kind: SourceKind) -> &mut SummarizerSession {
        match kind {
            SourceKind::WebPage => &mut self.page,
            SourceKind::Video => &mut self.video,
        }
    }

    pub fn active_session_mut(&mut self) -> &mut SummarizerSession {
        self.session_mut(self.active)
    }

    /// Handles an externally supplied URL (e.g. `?url=` from the extension).
    /// Submits it once, on the video tab when it is a video URL.
    pub async fn mount(&mut self, initial_url: Option<&str>) -> Option<UiPhase> {
        let url = initial_url.map(str::trim).filter(|u| !u.is_empty())?;
        if self.auto_submitted {
            return None;
        }
        self.auto_submitted = true;

        let kind = links::parse_web_url(url)
            .map(|u| links::classify_url(&u))
            .unwrap_or(SourceKind::WebPage);
        info!(?kind, %url, "Auto-submitting initial URL");

        self.select(kind);
        Some(
            self.active_session_mut()
                .submit(url, SummaryLength::default())
                .await,
        )
    }
}
