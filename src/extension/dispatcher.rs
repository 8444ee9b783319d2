//! Background dispatcher: activation triggers, script injection, and the
//! action dispatch table that relays requests to the Summarization Service.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{error, info, warn};

use super::content::{TabContext, TabId};
use super::messaging::{Action, ExtensionMessage, MessageReceiver, MessageReply};
use crate::clients::SummaryService;
use crate::errors::SummaristError;
use crate::utils::links;

pub const CONTEXT_MENU_ID: &str = "summarizePage";
pub const CONTEXT_MENU_TITLE: &str = "Summarize with Summarist";
pub const CONTENT_STYLESHEET: &str = "content.css";
pub const CONTENT_SCRIPT: &str = "content.js";

/// Browser scripting API used to inject the overlay into a tab.
#[async_trait]
pub trait Scripting: Send + Sync {
    async fn insert_css(&self, tab_id: TabId, file: &str) -> Result<(), SummaristError>;
    async fn execute_script(&self, tab_id: TabId, file: &str) -> Result<(), SummaristError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenuItem {
    pub id: &'static str,
    pub title: &'static str,
    pub contexts: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationEvent {
    ActionClicked,
    ContextMenuClicked { menu_item_id: String },
}

/// A tab as reported by the browser; the id may be absent (e.g. devtools).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: Option<TabId>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionOutcome {
    Injected,
    Ignored,
    Restricted,
    Failed(String),
}

pub type ActionHandler = Arc<dyn Fn(ExtensionMessage) -> BoxFuture<'static, MessageReply> + Send + Sync>;

/// Handlers keyed by message action.
#[derive(Clone, Default)]
pub struct DispatchTable {
    handlers: HashMap<Action, ActionHandler>,
}

impl DispatchTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with the `getSummary` and `adjustLength` relays.
    #[must_use]
    pub fn with_service(service: Arc<dyn SummaryService>) -> Self {
        let mut table = Self::new();

        let svc = Arc::clone(&service);
        table.register(
            Action::GetSummary,
            Arc::new(move |message: ExtensionMessage| {
                let svc = Arc::clone(&svc);
                async move { relay_summary_request(svc.as_ref(), &message).await }.boxed()
            }),
        );

        let svc = service;
        table.register(
            Action::AdjustLength,
            Arc::new(move |message: ExtensionMessage| {
                let svc = Arc::clone(&svc);
                async move { relay_adjust_length(svc.as_ref(), &message).await }.boxed()
            }),
        );

        table
    }

    pub fn register(&mut self, action: Action, handler: ActionHandler) {
        self.handlers.insert(action, handler);
    }

    #[must_use]
    pub fn handles(&self, action: Action) -> bool {
        self.handlers.contains_key(&action)
    }

    pub async fn dispatch(&self, message: ExtensionMessage) -> MessageReply {
        match self.handlers.get(&message.action) {
            Some(handler) => handler(message).await,
            None => {
                warn!(action = ?message.action, "No handler registered");
                MessageReply::error(format!("Unsupported action: {:?}", message.action))
            }
        }
    }

    /// Dispatches a raw JSON message, as received from another context.
    pub async fn dispatch_json(&self, raw: &str) -> MessageReply {
        match serde_json::from_str::<ExtensionMessage>(raw) {
            Ok(message) => self.dispatch(message).await,
            Err(e) => {
                warn!("Rejected malformed extension message: {}", e);
                MessageReply::error(format!("Invalid message: {e}"))
            }
        }
    }
}

/// Forwards a `getSummary` message: text when present, otherwise the URL.
pub async fn relay_summary_request(
    service: &dyn SummaryService,
    message: &ExtensionMessage,
) -> MessageReply {
    if let Some(text) = message.text.as_deref().filter(|t| !t.trim().is_empty()) {
        return MessageReply::from_result(service.summarize_text(text).await);
    }

    let Some(raw_url) = message.url.as_deref() else {
        return MessageReply::error("Text content is required");
    };
    let result = match links::parse_web_url(raw_url) {
        Ok(url) => {
            let kind = links::classify_url(&url);
            let length = message.length.unwrap_or_default();
            service
                .summarize_url(kind, &links::normalize_url(url), length)
                .await
        }
        Err(e) => Err(e),
    };
    MessageReply::from_result(result)
}

/// Forwards an `adjustLength` message.
pub async fn relay_adjust_length(
    service: &dyn SummaryService,
    message: &ExtensionMessage,
) -> MessageReply {
    let (Some(text), Some(summary), Some(length)) =
        (message.text.as_deref(), message.summary.as_deref(), message.length)
    else {
        return MessageReply::error("Please generate a summary first before changing its length.");
    };
    MessageReply::from_result(service.adjust_length(text, summary, length).await)
}

pub struct BackgroundDispatcher {
    scripting: Arc<dyn Scripting>,
    table: Arc<DispatchTable>,
}

impl BackgroundDispatcher {
    #[must_use]
    pub fn new(scripting: Arc<dyn Scripting>, table: DispatchTable) -> Self {
        Self {
            scripting,
            table: Arc::new(table),
        }
    }

    #[must_use]
    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    /// Context-menu entries to register when the extension is installed.
    #[must_use]
    pub fn on_installed(&self) -> Vec<ContextMenuItem> {
        vec![ContextMenuItem {
            id: CONTEXT_MENU_ID,
            title: CONTEXT_MENU_TITLE,
            contexts: vec!["page"],
        }]
    }

    /// Icon clicks and our context-menu item both lead to injection.
    pub async fn on_activation_event(&self, event: ActivationEvent, tab: &TabInfo) -> InjectionOutcome {
        let ours = match &event {
            ActivationEvent::ActionClicked => true,
            ActivationEvent::ContextMenuClicked { menu_item_id } => menu_item_id == CONTEXT_MENU_ID,
        };
        let Some(tab_id) = tab.id.filter(|_| ours) else {
            return InjectionOutcome::Ignored;
        };

        self.inject_overlay(&TabContext {
            tab_id,
            url: tab.url.clone(),
        })
        .await
    }

    /// Injects the stylesheet and then the content script. Failures are
    /// logged and end the attempt.
    pub async fn inject_overlay(&self, tab: &TabContext) -> InjectionOutcome {
        if links::is_restricted_url(&tab.url) {
            info!(tab_id = %tab.tab_id, "Cannot run on internal browser pages");
            return InjectionOutcome::Restricted;
        }

        let injected = match self.scripting.insert_css(tab.tab_id, CONTENT_STYLESHEET).await {
            Ok(()) => self.scripting.execute_script(tab.tab_id, CONTENT_SCRIPT).await,
            Err(e) => Err(e),
        };

        match injected {
            Ok(()) => InjectionOutcome::Injected,
            Err(e) => {
                error!(tab_id = %tab.tab_id, "Failed to inject content script: {}", e);
                InjectionOutcome::Failed(e.to_string())
            }
        }
    }

    /// Answers messages until every sender is dropped. Each message is
    /// handled on its own task and replied to exactly once.
    pub async fn serve(&self, mut receiver: MessageReceiver) {
        while let Some(envelope) = receiver.recv().await {
            let table = Arc::clone(&self.table);
            tokio::spawn(async move {
                let reply = table.dispatch(envelope.message.clone()).await;
                envelope.reply(reply);
            });
        }
        info!("Background dispatcher stopped: all senders closed");
    }
}
