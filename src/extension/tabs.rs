//! In-process browser model: open tabs, each with its own overlay session.
//!
//! Implements `Scripting` so the dispatcher can inject into these tabs the
//! same way it would into real ones.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::content::{ActivationOutcome, OverlaySession, Started, TabContext, TabId};
use super::dispatcher::{CONTENT_SCRIPT, CONTENT_STYLESHEET, Scripting};
use super::messaging::MessageSender;
use super::overlay::OverlayStatus;
use crate::errors::SummaristError;
use crate::utils::links;

#[derive(Debug)]
pub struct TabRegistry {
    sender: MessageSender,
    sessions: Mutex<HashMap<TabId, OverlaySession>>,
    styled: Mutex<HashSet<TabId>>,
    last_outcome: Mutex<HashMap<TabId, ActivationOutcome>>,
}

impl TabRegistry {
    #[must_use]
    pub fn new(sender: MessageSender) -> Self {
        Self {
            sender,
            sessions: Mutex::new(HashMap::new()),
            styled: Mutex::new(HashSet::new()),
            last_outcome: Mutex::new(HashMap::new()),
        }
    }

    /// Opens (or navigates) a tab to a page.
    pub async fn open_tab(&self, tab: TabContext, html: impl Into<String>) {
        let session = OverlaySession::new(tab.clone(), html);
        self.sessions.lock().await.insert(tab.tab_id, session);
        self.styled.lock().await.remove(&tab.tab_id);
    }

    pub async fn close_tab(&self, tab_id: TabId) {
        self.sessions.lock().await.remove(&tab_id);
        self.styled.lock().await.remove(&tab_id);
        self.last_outcome.lock().await.remove(&tab_id);
    }

    /// User clicked the overlay's close button.
    pub async fn close_overlay(&self, tab_id: TabId) {
        if let Some(session) = self.sessions.lock().await.get_mut(&tab_id) {
            session.close();
        }
    }

    pub async fn overlay_count(&self, tab_id: TabId) -> usize {
        self.sessions
            .lock()
            .await
            .get(&tab_id)
            .map_or(0, |s| s.document().overlay_count())
    }

    pub async fn overlay_status(&self, tab_id: TabId) -> Option<OverlayStatus> {
        self.sessions
            .lock()
            .await
            .get(&tab_id)
            .and_then(|s| s.overlay_status().cloned())
    }

    pub async fn has_stylesheet(&self, tab_id: TabId) -> bool {
        self.styled.lock().await.contains(&tab_id)
    }

    pub async fn last_outcome(&self, tab_id: TabId) -> Option<ActivationOutcome> {
        self.last_outcome.lock().await.get(&tab_id).cloned()
    }

    async fn tab_url(&self, tab_id: TabId) -> Result<String, SummaristError> {
        self.sessions
            .lock()
            .await
            .get(&tab_id)
            .map(|s| s.tab().url.clone())
            .ok_or_else(|| SummaristError::InjectionError(format!("No tab with id {tab_id}")))
    }
}

#[async_trait]
impl Scripting for TabRegistry {
    async fn insert_css(&self, tab_id: TabId, file: &str) -> Result<(), SummaristError> {
        let url = self.tab_url(tab_id).await?;
        if links::is_restricted_url(&url) {
            return Err(SummaristError::InjectionError(format!(
                "Cannot access contents of url \"{url}\""
            )));
        }
        if file != CONTENT_STYLESHEET {
            return Err(SummaristError::InjectionError(format!("Unknown stylesheet {file}")));
        }
        self.styled.lock().await.insert(tab_id);
        debug!(%tab_id, file, "Inserted stylesheet");
        Ok(())
    }

    async fn execute_script(&self, tab_id: TabId, file: &str) -> Result<(), SummaristError> {
        if file != CONTENT_SCRIPT {
            return Err(SummaristError::InjectionError(format!("Unknown script {file}")));
        }

        // The session map is never locked while the request is in flight.
        let started = {
            let mut sessions = self.sessions.lock().await;
            let session = sessions.get_mut(&tab_id).ok_or_else(|| {
                SummaristError::InjectionError(format!("No tab with id {tab_id}"))
            })?;
            session.begin()
        };

        let outcome = match started {
            Started::Refused => ActivationOutcome::Refused,
            Started::InsufficientContent => ActivationOutcome::InsufficientContent,
            Started::Pending(pending) => {
                let (instance, reply) = pending.request_summary(&self.sender).await;
                match self.sessions.lock().await.get_mut(&tab_id) {
                    Some(session) => session.finish(instance, reply),
                    None => {
                        info!(%tab_id, "Tab closed before summary arrived");
                        ActivationOutcome::Abandoned
                    }
                }
            }
        };

        info!(%tab_id, ?outcome, "Content script finished");
        self.last_outcome.lock().await.insert(tab_id, outcome);
        Ok(())
    }
}
