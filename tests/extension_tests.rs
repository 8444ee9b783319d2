use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use summarist::clients::SummaryService;
use summarist::core::models::{SourceKind, SummaryLength};
use summarist::errors::SummaristError;
use summarist::extension::content::Started;
use summarist::extension::dispatcher::{
    ActivationEvent, CONTEXT_MENU_ID, InjectionOutcome, TabInfo,
};
use summarist::extension::messaging::{self, Action, ExtensionMessage, MessageReply};
use summarist::extension::overlay::OverlayStatus;
use summarist::extension::{
    ActivationOutcome, BackgroundDispatcher, DispatchTable, OverlaySession, Scripting, TabContext,
    TabId, TabRegistry,
};

const ARTICLE: &str = "<html><body><h1>Ownership</h1><p>Rust's ownership model lets the \
    compiler check memory safety without a garbage collector. Each value has a single owner, \
    and borrowing rules keep references valid.</p></body></html>";

#[derive(Default)]
struct MockService {
    calls: AtomicUsize,
    failure: Option<String>,
    last_url: Mutex<Option<(SourceKind, String, SummaryLength)>>,
}

impl MockService {
    fn failing(error: &str) -> Self {
        Self {
            failure: Some(error.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self, summary: &str) -> Result<String, SummaristError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(error) => Err(SummaristError::UpstreamError {
                error: error.clone(),
                details: None,
            }),
            None => Ok(summary.to_string()),
        }
    }
}

#[async_trait]
impl SummaryService for MockService {
    async fn summarize_text(&self, _text: &str) -> Result<String, SummaristError> {
        self.answer("# Core Message\nHello")
    }

    async fn summarize_url(
        &self,
        kind: SourceKind,
        url: &str,
        length: SummaryLength,
    ) -> Result<String, SummaristError> {
        *self.last_url.lock().unwrap() = Some((kind, url.to_string(), length));
        self.answer("# Core Message\nFrom URL")
    }

    async fn adjust_length(
        &self,
        _text: &str,
        _summary: &str,
        length: SummaryLength,
    ) -> Result<String, SummaristError> {
        self.answer(&format!("# Core Message\n{length}"))
    }
}

struct Harness {
    service: Arc<MockService>,
    registry: Arc<TabRegistry>,
    dispatcher: Arc<BackgroundDispatcher>,
}

fn start(service: MockService) -> Harness {
    let service = Arc::new(service);
    let (sender, receiver) = messaging::channel();
    let registry = Arc::new(TabRegistry::new(sender));
    let dispatcher = Arc::new(BackgroundDispatcher::new(
        Arc::clone(&registry) as Arc<dyn Scripting>,
        DispatchTable::with_service(Arc::clone(&service) as Arc<dyn SummaryService>),
    ));

    let serving = Arc::clone(&dispatcher);
    tokio::spawn(async move { serving.serve(receiver).await });

    Harness {
        service,
        registry,
        dispatcher,
    }
}

fn tab(id: u32, url: &str) -> TabInfo {
    TabInfo {
        id: Some(TabId(id)),
        url: url.to_string(),
    }
}

async fn open(h: &Harness, id: u32, url: &str, html: &str) -> TabInfo {
    h.registry
        .open_tab(
            TabContext {
                tab_id: TabId(id),
                url: url.to_string(),
            },
            html,
        )
        .await;
    tab(id, url)
}

#[tokio::test]
async fn test_icon_click_renders_summary() {
    let h = start(MockService::default());
    let info = open(&h, 1, "https://example.com/article", ARTICLE).await;

    let outcome = h
        .dispatcher
        .on_activation_event(ActivationEvent::ActionClicked, &info)
        .await;

    assert_eq!(outcome, InjectionOutcome::Injected);
    assert!(h.registry.has_stylesheet(TabId(1)).await);
    assert_eq!(
        h.registry.last_outcome(TabId(1)).await,
        Some(ActivationOutcome::Rendered)
    );
    match h.registry.overlay_status(TabId(1)).await {
        Some(OverlayStatus::Rendered { html }) => assert!(html.contains("<h1>Core Message</h1>")),
        other => panic!("Unexpected overlay status: {other:?}"),
    }
    assert_eq!(h.service.calls(), 1);
}

#[tokio::test]
async fn test_repeat_activation_keeps_one_overlay() {
    let h = start(MockService::default());
    let info = open(&h, 2, "https://example.com/article", ARTICLE).await;

    for _ in 0..2 {
        h.dispatcher
            .on_activation_event(ActivationEvent::ActionClicked, &info)
            .await;
    }

    assert_eq!(h.registry.overlay_count(TabId(2)).await, 1);
    assert_eq!(h.service.calls(), 2);
}

#[tokio::test]
async fn test_context_menu_item() {
    let h = start(MockService::default());
    let items = h.dispatcher.on_installed();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, CONTEXT_MENU_ID);
    assert_eq!(items[0].contexts, vec!["page"]);

    let info = open(&h, 3, "https://example.com/article", ARTICLE).await;

    let other = h
        .dispatcher
        .on_activation_event(
            ActivationEvent::ContextMenuClicked {
                menu_item_id: "somethingElse".to_string(),
            },
            &info,
        )
        .await;
    assert_eq!(other, InjectionOutcome::Ignored);
    assert_eq!(h.registry.overlay_count(TabId(3)).await, 0);

    let ours = h
        .dispatcher
        .on_activation_event(
            ActivationEvent::ContextMenuClicked {
                menu_item_id: CONTEXT_MENU_ID.to_string(),
            },
            &info,
        )
        .await;
    assert_eq!(ours, InjectionOutcome::Injected);
    assert_eq!(h.registry.overlay_count(TabId(3)).await, 1);
}

#[tokio::test]
async fn test_tab_without_id_is_ignored() {
    let h = start(MockService::default());
    let info = TabInfo {
        id: None,
        url: "https://example.com".to_string(),
    };

    let outcome = h
        .dispatcher
        .on_activation_event(ActivationEvent::ActionClicked, &info)
        .await;
    assert_eq!(outcome, InjectionOutcome::Ignored);
}

#[tokio::test]
async fn test_restricted_page_is_left_alone() {
    let h = start(MockService::default());
    let info = open(&h, 4, "chrome://settings", ARTICLE).await;

    let outcome = h
        .dispatcher
        .on_activation_event(ActivationEvent::ActionClicked, &info)
        .await;

    assert_eq!(outcome, InjectionOutcome::Restricted);
    assert!(!h.registry.has_stylesheet(TabId(4)).await);
    assert_eq!(h.registry.overlay_count(TabId(4)).await, 0);
    assert_eq!(h.service.calls(), 0);
}

#[tokio::test]
async fn test_unknown_tab_fails_injection() {
    let h = start(MockService::default());

    let outcome = h
        .dispatcher
        .on_activation_event(ActivationEvent::ActionClicked, &tab(99, "https://example.com"))
        .await;
    assert!(matches!(outcome, InjectionOutcome::Failed(_)));
}

#[tokio::test]
async fn test_short_page_makes_no_request() {
    let h = start(MockService::default());
    let info = open(&h, 5, "https://example.com/empty", "<p>Too short.</p>").await;

    h.dispatcher
        .on_activation_event(ActivationEvent::ActionClicked, &info)
        .await;

    assert_eq!(
        h.registry.overlay_status(TabId(5)).await,
        Some(OverlayStatus::InsufficientContent)
    );
    assert_eq!(h.service.calls(), 0);
}

#[tokio::test]
async fn test_service_error_is_shown_in_overlay() {
    let h = start(MockService::failing("rate_limited"));
    let info = open(&h, 6, "https://example.com/article", ARTICLE).await;

    h.dispatcher
        .on_activation_event(ActivationEvent::ActionClicked, &info)
        .await;

    assert_eq!(
        h.registry.overlay_status(TabId(6)).await,
        Some(OverlayStatus::Failed {
            message: "Failed to fetch summary. rate_limited".to_string()
        })
    );
    assert_eq!(
        h.registry.last_outcome(TabId(6)).await,
        Some(ActivationOutcome::Failed("rate_limited".to_string()))
    );
}

#[tokio::test]
async fn test_close_removes_overlay() {
    let h = start(MockService::default());
    let info = open(&h, 7, "https://example.com/article", ARTICLE).await;

    h.dispatcher
        .on_activation_event(ActivationEvent::ActionClicked, &info)
        .await;
    assert_eq!(h.registry.overlay_count(TabId(7)).await, 1);

    h.registry.close_overlay(TabId(7)).await;
    assert_eq!(h.registry.overlay_count(TabId(7)).await, 0);
    assert!(h.registry.overlay_status(TabId(7)).await.is_none());
}

#[tokio::test]
async fn test_reply_after_close_is_abandoned() {
    let mut session = OverlaySession::new(
        TabContext {
            tab_id: TabId(8),
            url: "https://example.com/article".to_string(),
        },
        ARTICLE,
    );

    let Started::Pending(pending) = session.begin() else {
        panic!("expected a pending request");
    };
    assert!(pending.text.contains("ownership model"));
    assert_eq!(session.overlay_status(), Some(&OverlayStatus::Fetching));

    session.close();
    let outcome = session.finish(
        pending.instance,
        Ok(MessageReply::Summary {
            summary: "late".to_string(),
        }),
    );

    assert_eq!(outcome, ActivationOutcome::Abandoned);
    assert_eq!(session.document().overlay_count(), 0);
}

#[tokio::test]
async fn test_stale_reply_does_not_touch_new_overlay() {
    let mut session = OverlaySession::new(
        TabContext {
            tab_id: TabId(9),
            url: "https://example.com/article".to_string(),
        },
        ARTICLE,
    );

    let Started::Pending(first) = session.begin() else {
        panic!("expected a pending request");
    };
    let Started::Pending(_second) = session.begin() else {
        panic!("expected a pending request");
    };

    let outcome = session.finish(
        first.instance,
        Ok(MessageReply::Summary {
            summary: "stale".to_string(),
        }),
    );
    assert_eq!(outcome, ActivationOutcome::Abandoned);
    assert_eq!(session.overlay_status(), Some(&OverlayStatus::Fetching));
}

#[tokio::test]
async fn test_dispatch_table_relays_url_requests() {
    let service = Arc::new(MockService::default());
    let table = DispatchTable::with_service(Arc::clone(&service) as Arc<dyn SummaryService>);
    assert!(table.handles(Action::GetSummary));
    assert!(table.handles(Action::AdjustLength));

    let reply = table
        .dispatch(ExtensionMessage::summarize_url(
            "https://youtu.be/dQw4w9WgXcQ#t=10",
            None,
        ))
        .await;
    assert_eq!(
        reply,
        MessageReply::Summary {
            summary: "# Core Message\nFrom URL".to_string()
        }
    );

    let (kind, url, length) = service.last_url.lock().unwrap().clone().unwrap();
    assert_eq!(kind, SourceKind::Video);
    assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
    assert_eq!(length, SummaryLength::Medium);
}

#[tokio::test]
async fn test_dispatch_table_adjust_length() {
    let service = Arc::new(MockService::default());
    let table = DispatchTable::with_service(Arc::clone(&service) as Arc<dyn SummaryService>);

    let reply = table
        .dispatch(ExtensionMessage::adjust_length("text", "summary", SummaryLength::Short))
        .await;
    assert_eq!(
        reply,
        MessageReply::Summary {
            summary: "# Core Message\nshort".to_string()
        }
    );

    let mut incomplete = ExtensionMessage::adjust_length("text", "summary", SummaryLength::Long);
    incomplete.summary = None;
    let reply = table.dispatch(incomplete).await;
    assert_eq!(
        reply,
        MessageReply::error("Please generate a summary first before changing its length.")
    );
    assert_eq!(service.calls(), 1);
}

#[tokio::test]
async fn test_dispatch_rejects_unknown_messages() {
    let table = DispatchTable::new();
    let reply = table
        .dispatch(ExtensionMessage::summarize_text("hello"))
        .await;
    assert!(matches!(reply, MessageReply::Error { error } if error.contains("Unsupported action")));

    let table = DispatchTable::with_service(Arc::new(MockService::default()));
    let reply = table
        .dispatch_json(r#"{"correlationId":"5b2f6a1e-3c1d-4a8e-9f57-2d6f0c9b1a11","action":"translate"}"#)
        .await;
    assert!(matches!(reply, MessageReply::Error { error } if error.starts_with("Invalid message")));

    let reply = table
        .dispatch_json(r#"{"correlationId":"5b2f6a1e-3c1d-4a8e-9f57-2d6f0c9b1a11","action":"getSummary","text":"hi"}"#)
        .await;
    assert_eq!(
        reply,
        MessageReply::Summary {
            summary: "# Core Message\nHello".to_string()
        }
    );
}

#[tokio::test]
async fn test_get_summary_without_text_or_url() {
    let table = DispatchTable::with_service(Arc::new(MockService::default()));
    let reply = table
        .dispatch(ExtensionMessage::summarize_text("   "))
        .await;
    assert_eq!(reply, MessageReply::error("Text content is required"));
}

/// Holds the first summary request until released; later requests answer at once.
#[derive(Default)]
struct GatedService {
    calls: AtomicUsize,
    started: tokio::sync::Notify,
    release: tokio::sync::Notify,
}

#[async_trait]
impl SummaryService for GatedService {
    async fn summarize_text(&self, _text: &str) -> Result<String, SummaristError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.started.notify_one();
            self.release.notified().await;
        }
        Ok("# Core Message\nHello".to_string())
    }

    async fn summarize_url(
        &self,
        _kind: SourceKind,
        _url: &str,
        _length: SummaryLength,
    ) -> Result<String, SummaristError> {
        Ok(String::new())
    }

    async fn adjust_length(
        &self,
        _text: &str,
        summary: &str,
        _length: SummaryLength,
    ) -> Result<String, SummaristError> {
        Ok(summary.to_string())
    }
}

fn start_gated() -> (Arc<GatedService>, Arc<TabRegistry>, Arc<BackgroundDispatcher>) {
    let service = Arc::new(GatedService::default());
    let (sender, receiver) = messaging::channel();
    let registry = Arc::new(TabRegistry::new(sender));
    let dispatcher = Arc::new(BackgroundDispatcher::new(
        Arc::clone(&registry) as Arc<dyn Scripting>,
        DispatchTable::with_service(Arc::clone(&service) as Arc<dyn SummaryService>),
    ));

    let serving = Arc::clone(&dispatcher);
    tokio::spawn(async move { serving.serve(receiver).await });
    (service, registry, dispatcher)
}

async fn open_tab(registry: &TabRegistry, id: u32) -> TabInfo {
    let url = format!("https://example.com/article-{id}");
    registry
        .open_tab(
            TabContext {
                tab_id: TabId(id),
                url: url.clone(),
            },
            ARTICLE,
        )
        .await;
    tab(id, &url)
}

#[tokio::test]
async fn test_overlay_closes_while_summary_is_in_flight() {
    let (service, registry, dispatcher) = start_gated();
    let info = open_tab(&registry, 1).await;

    let activating = Arc::clone(&dispatcher);
    let activation = tokio::spawn(async move {
        activating
            .on_activation_event(ActivationEvent::ActionClicked, &info)
            .await
    });
    service.started.notified().await;

    tokio::time::timeout(Duration::from_millis(500), registry.close_overlay(TabId(1)))
        .await
        .expect("close_overlay returns while the request is pending");
    assert_eq!(registry.overlay_count(TabId(1)).await, 0);

    service.release.notify_one();
    assert_eq!(activation.await.unwrap(), InjectionOutcome::Injected);
    assert_eq!(
        registry.last_outcome(TabId(1)).await,
        Some(ActivationOutcome::Abandoned)
    );
    assert_eq!(registry.overlay_count(TabId(1)).await, 0);
}

#[tokio::test]
async fn test_other_tabs_stay_usable_during_a_fetch() {
    let (service, registry, dispatcher) = start_gated();
    let slow = open_tab(&registry, 1).await;
    let fast = open_tab(&registry, 2).await;

    let activating = Arc::clone(&dispatcher);
    let activation = tokio::spawn(async move {
        activating
            .on_activation_event(ActivationEvent::ActionClicked, &slow)
            .await
    });
    service.started.notified().await;

    let outcome = tokio::time::timeout(
        Duration::from_millis(500),
        dispatcher.on_activation_event(ActivationEvent::ActionClicked, &fast),
    )
    .await
    .expect("second tab is not blocked by the first");
    assert_eq!(outcome, InjectionOutcome::Injected);
    assert_eq!(
        registry.last_outcome(TabId(2)).await,
        Some(ActivationOutcome::Rendered)
    );
    assert_eq!(
        registry.overlay_status(TabId(1)).await,
        Some(OverlayStatus::Fetching)
    );

    service.release.notify_one();
    activation.await.unwrap();
    assert_eq!(
        registry.last_outcome(TabId(1)).await,
        Some(ActivationOutcome::Rendered)
    );
}

#[tokio::test]
async fn test_reply_for_closed_tab_is_dropped() {
    let (service, registry, dispatcher) = start_gated();
    let info = open_tab(&registry, 3).await;

    let activating = Arc::clone(&dispatcher);
    let activation = tokio::spawn(async move {
        activating
            .on_activation_event(ActivationEvent::ActionClicked, &info)
            .await
    });
    service.started.notified().await;

    registry.close_tab(TabId(3)).await;
    service.release.notify_one();
    activation.await.unwrap();

    assert_eq!(
        registry.last_outcome(TabId(3)).await,
        Some(ActivationOutcome::Abandoned)
    );
    assert_eq!(registry.overlay_count(TabId(3)).await, 0);
}
