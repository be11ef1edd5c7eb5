use std::time::{Duration, Instant};

use kanal::{AsyncReceiver, AsyncSender};
use lexi_config::page::PageConfig;
use lexi_page::badge::{Badge, BadgePhase, BadgeTiming, BadgeView};
use lexi_page::highlight::{self, HighlightEngine, MarkerInfo, ScanReport};
use lexi_page::popup::{
    DismissReason, PopupFailure, PopupState, PopupView, SaveKind, TranslateTicket,
};
use lexi_page::selection::{self, TextSelection};
use lexi_page::tooltip::{TooltipState, TooltipView};
use lexi_page::{Document, MatcherError, NodePath, NodeRef, Overlay, Rect, Size};
use lexi_types::{AckResponse, TranslateResponse, VocabEntry};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::client::BackendClient;
use crate::state::AppState;

/// Commands the router forwards to the attached page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageCommand {
    Rescan,
    RemoveHighlight { word: String },
}

/// Input from the host; nodes are named by their path from the document root
#[derive(Debug)]
pub enum PageEvent {
    Selection {
        text: String,
        anchor: NodePath,
        rect: Rect,
    },
    /// The translate button, or the retry control after a failure
    TranslateClicked,
    Dismiss(DismissReason),
    PointerEnter {
        node: NodePath,
        rect: Rect,
    },
    PointerLeave {
        node: NodePath,
    },
    TranslationFinished {
        ticket: TranslateTicket,
        response: Result<TranslateResponse, String>,
    },
    Command {
        command: PageCommand,
        reply: oneshot::Sender<AckResponse>,
    },
    Snapshot(oneshot::Sender<PageSnapshot>),
}

/// Rendered state of a page at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub html: String,
    pub markers: Vec<MarkerInfo>,
    pub popup: Option<PopupView>,
    pub tooltip: Option<TooltipView>,
    pub badge: Option<BadgeView>,
}

/// One page's document plus the UI state drawn over it
pub struct PageSession {
    doc: Document,
    url: String,
    config: PageConfig,
    engine: HighlightEngine,
    popup: PopupState,
    tooltip: TooltipState,
    badge: Option<Badge>,
    overlay: Overlay,
    viewport: Size,
}

impl PageSession {
    pub fn new(doc: Document, url: impl Into<String>, config: PageConfig, viewport: Size) -> Self {
        Self {
            doc,
            url: url.into(),
            engine: HighlightEngine::new(&config),
            config,
            popup: PopupState::new(),
            tooltip: TooltipState::new(),
            badge: None,
            overlay: Overlay::new(),
            viewport,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn popup(&self) -> &PopupState {
        &self.popup
    }

    /// Rehighlights the page; the badge of this scan replaces any earlier one
    ///
    /// A failed scan leaves markers and badge as they were.
    pub fn apply_scan(
        &mut self,
        entries: &[VocabEntry],
        now: Instant,
    ) -> Result<ScanReport, MatcherError> {
        let report = self.engine.scan(&mut self.doc, entries).map_err(|e| {
            tracing::error!("[PAGE] Scan of {} failed: {}", self.url, e);
            e
        })?;

        self.badge = Badge::for_scan(report.matches, now);
        self.drop_stale_tooltip();
        self.render(now);
        Ok(report)
    }

    /// Opens the popup when the selection is a single word
    pub fn select(&mut self, selection: TextSelection, now: Instant) -> bool {
        match selection::capture(&self.doc, &selection, &self.config) {
            Ok(context) => {
                let shown = self.popup.show(context);
                self.render(now);
                shown
            }
            Err(e) => {
                tracing::debug!("[PAGE] Ignoring selection: {}", e);
                false
            }
        }
    }

    pub fn begin_translate(&mut self, now: Instant) -> Option<TranslateTicket> {
        let ticket = self.popup.begin_translate()?;
        self.render(now);
        Some(ticket)
    }

    /// Applies a TRANSLATE_WORD reply
    ///
    /// A saved word is highlighted even when the popup was closed meanwhile, since the entry
    /// exists either way.
    pub fn finish_translation(
        &mut self,
        ticket: &TranslateTicket,
        response: Result<TranslateResponse, String>,
        now: Instant,
    ) {
        let outcome = match response {
            Ok(response) if response.success => {
                let translation = response.translation.unwrap_or_default();
                self.refresh_word(&ticket.word, &translation);
                Ok((
                    translation,
                    SaveKind::from_updated(response.updated.unwrap_or(false)),
                ))
            }
            Ok(response) => {
                let message = response
                    .error
                    .unwrap_or_else(|| "Translation failed".to_string());
                match response.error_kind {
                    Some(kind) if !kind.is_retryable() => Err(PopupFailure::Auth(message)),
                    _ => Err(PopupFailure::Other(message)),
                }
            }
            Err(message) => Err(PopupFailure::Other(message)),
        };

        self.popup.finish(ticket, outcome, now);
        self.render(now);
    }

    pub fn dismiss(&mut self, reason: DismissReason, now: Instant) -> bool {
        let closed = self.popup.dismiss(reason);
        if closed {
            self.render(now);
        }
        closed
    }

    pub fn pointer_enter(&mut self, node: &NodeRef, rect: Rect, now: Instant) -> bool {
        let Some(marker) = highlight::marker_at(node) else {
            return false;
        };
        let Some(info) = highlight::marker_info(&marker) else {
            return false;
        };

        self.tooltip.enter(marker, info, rect);
        self.render(now);
        true
    }

    pub fn pointer_leave(&mut self, node: &NodeRef, now: Instant) -> bool {
        let Some(marker) = highlight::marker_at(node) else {
            return false;
        };
        let hidden = self.tooltip.leave(&marker);
        if hidden {
            self.render(now);
        }
        hidden
    }

    pub fn remove_highlight(&mut self, word: &str, now: Instant) -> usize {
        let removed = self.engine.remove_for_word(&mut self.doc, word);
        tracing::debug!("[PAGE] Removed {} markers for '{}'", removed, word);
        self.drop_stale_tooltip();
        self.render(now);
        removed
    }

    /// Expires the badge and a lingering result
    pub fn tick(&mut self, now: Instant) {
        let linger = Duration::from_millis(self.config.result_linger_ms);
        let mut changed = self.popup.expire(now, linger);

        match self.badge.map(|badge| badge.phase(now, self.badge_timing())) {
            Some(BadgePhase::Expired) => {
                self.badge = None;
                changed = true;
            }
            Some(BadgePhase::Fading { .. }) => changed = true,
            Some(BadgePhase::Visible) | None => {}
        }

        if changed {
            self.render(now);
        }
    }

    pub fn snapshot(&self, now: Instant) -> PageSnapshot {
        PageSnapshot {
            html: self.doc.body_html(),
            markers: highlight::markers(&self.doc)
                .iter()
                .filter_map(highlight::marker_info)
                .collect(),
            popup: self.popup.view(),
            tooltip: self.tooltip.view(self.viewport, &self.config),
            badge: self.badge_view(now),
        }
    }

    fn badge_timing(&self) -> BadgeTiming {
        BadgeTiming::from_config(&self.config)
    }

    fn badge_view(&self, now: Instant) -> Option<BadgeView> {
        self.badge
            .as_ref()
            .and_then(|badge| badge.view(now, self.badge_timing()))
    }

    /// Rewraps one word so its markers carry the latest translation
    fn refresh_word(&mut self, word: &str, translation: &str) {
        self.engine.remove_for_word(&mut self.doc, word);
        match self.engine.highlight_one(&mut self.doc, word, translation) {
            Ok(report) => tracing::debug!("[PAGE] '{}' highlighted {} times", word, report.matches),
            Err(e) => tracing::error!("[PAGE] Highlighting '{}' failed: {}", word, e),
        }
        self.drop_stale_tooltip();
    }

    fn drop_stale_tooltip(&mut self) {
        if let Some(marker) = self.tooltip.active_marker()
            && !self.doc.is_attached(marker)
        {
            self.tooltip.hide();
        }
    }

    fn render(&mut self, now: Instant) {
        let popup = self.popup.view();
        let tooltip = self.tooltip.view(self.viewport, &self.config);
        let badge = self.badge_view(now);
        self.overlay.sync(
            &self.doc,
            popup.as_ref(),
            tooltip.as_ref(),
            badge.as_ref(),
        );
    }
}

/// Handle to a running page loop
#[derive(Clone)]
pub struct PageHandle {
    tx: AsyncSender<PageEvent>,
    cancel: CancellationToken,
}

impl PageHandle {
    pub async fn send(&self, event: PageEvent) -> anyhow::Result<()> {
        self.tx.send(event).await?;
        Ok(())
    }

    pub async fn command(&self, command: PageCommand) -> anyhow::Result<AckResponse> {
        let (reply, ack) = oneshot::channel();
        self.send(PageEvent::Command { command, reply }).await?;
        Ok(ack.await?)
    }

    pub async fn snapshot(&self) -> anyhow::Result<PageSnapshot> {
        let (reply, snapshot) = oneshot::channel();
        self.send(PageEvent::Snapshot(reply)).await?;
        Ok(snapshot.await?)
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }
}

/// Starts page loops, each on its own thread
///
/// Page trees are not `Send`, so a page is parsed and served on the thread that owns it.
/// Everything crossing the thread boundary goes through the handle's channel.
#[derive(Clone)]
pub struct PageLauncher {
    client: BackendClient,
    cancel: CancellationToken,
}

impl PageLauncher {
    pub fn new(client: BackendClient, cancel: CancellationToken) -> Self {
        Self { client, cancel }
    }

    /// Parses `html` as the new attached page and runs its initial scan
    ///
    /// The page stays attached when the initial scan fails; the failure is returned.
    pub async fn attach(
        &self,
        state: &AppState,
        html: String,
        url: String,
        viewport: Option<Size>,
    ) -> anyhow::Result<PageHandle> {
        let (config, delta_time) = {
            let config = state.config.read().await;
            (config.page.clone(), Duration::from_millis(config.delta_time))
        };
        let viewport =
            viewport.unwrap_or_else(|| Size::new(config.viewport_width, config.viewport_height));
        let scan_on_load = config.scan_on_load;

        let handle = self.launch(html, url.clone(), config, viewport, delta_time)?;
        state.attach_page(handle.clone()).await;

        if scan_on_load {
            let ack = handle.command(PageCommand::Rescan).await?;
            if let Some(error) = ack.error {
                tracing::error!("[PAGE] Initial scan of {} failed: {}", url, error);
                anyhow::bail!("Initial scan failed: {error}");
            }
        }
        Ok(handle)
    }

    pub fn launch(
        &self,
        html: String,
        url: String,
        config: PageConfig,
        viewport: Size,
        delta_time: Duration,
    ) -> anyhow::Result<PageHandle> {
        let (tx, rx) = kanal::bounded_async(64);
        let cancel = self.cancel.child_token();
        let handle = PageHandle {
            tx: tx.clone(),
            cancel: cancel.clone(),
        };
        let client = self.client.clone();

        std::thread::Builder::new()
            .name("lexi-page".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        tracing::error!("[PAGE] Runtime for {} failed to start: {}", url, e);
                        return;
                    }
                };

                let session = PageSession::new(Document::parse(&html), url, config, viewport);
                if let Err(e) =
                    runtime.block_on(page_loop(session, rx, tx, client, delta_time, cancel))
                {
                    tracing::error!("[PAGE] Loop exited: {:#}", e);
                }
            })?;
        Ok(handle)
    }
}

/// Processes one event at a time, so the document is never touched concurrently
async fn page_loop(
    mut session: PageSession,
    events: AsyncReceiver<PageEvent>,
    events_tx: AsyncSender<PageEvent>,
    client: BackendClient,
    delta_time: Duration,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("[PAGE] Attached {}", session.url());

    // tokio intervals panic on a zero period
    let mut interval = tokio::time::interval(delta_time.max(Duration::from_millis(1)));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => session.tick(Instant::now()),
            event = events.recv() => {
                handle_page_event(&mut session, event?, &client, &events_tx).await;
            }
        }
    }

    tracing::info!("[PAGE] Detached {}", session.url());
    Ok(())
}

async fn rescan(session: &mut PageSession, client: &BackendClient) -> anyhow::Result<ScanReport> {
    let entries = client.scan_page().await?;
    let report = session.apply_scan(&entries, Instant::now())?;
    tracing::info!(
        "[PAGE] {} vocabulary matches on {}",
        report.matches,
        session.url()
    );
    Ok(report)
}

fn resolve(session: &PageSession, path: &NodePath) -> Option<NodeRef> {
    let node = session.document().resolve(path);
    if node.is_none() {
        tracing::debug!("[PAGE] No node at {:?}", path.indices());
    }
    node
}

async fn handle_page_event(
    session: &mut PageSession,
    event: PageEvent,
    client: &BackendClient,
    events_tx: &AsyncSender<PageEvent>,
) {
    let now = Instant::now();

    match event {
        PageEvent::Selection { text, anchor, rect } => {
            if let Some(anchor) = resolve(session, &anchor) {
                session.select(TextSelection { text, anchor, rect }, now);
            }
        }
        PageEvent::TranslateClicked => {
            if let Some(ticket) = session.begin_translate(now) {
                spawn_translation(ticket, session.url().to_string(), client, events_tx);
            }
        }
        PageEvent::Dismiss(reason) => {
            session.dismiss(reason, now);
        }
        PageEvent::PointerEnter { node, rect } => {
            if let Some(node) = resolve(session, &node) {
                session.pointer_enter(&node, rect, now);
            }
        }
        PageEvent::PointerLeave { node } => {
            if let Some(node) = resolve(session, &node) {
                session.pointer_leave(&node, now);
            }
        }
        PageEvent::TranslationFinished { ticket, response } => {
            session.finish_translation(&ticket, response, now);
        }
        PageEvent::Command { command, reply } => {
            let ack = match command {
                PageCommand::Rescan => match rescan(session, client).await {
                    Ok(_) => AckResponse::ok(),
                    Err(e) => AckResponse::failed(e.to_string()),
                },
                PageCommand::RemoveHighlight { word } => {
                    session.remove_highlight(&word, now);
                    AckResponse::ok()
                }
            };
            let _ = reply.send(ack);
        }
        PageEvent::Snapshot(reply) => {
            let _ = reply.send(session.snapshot(now));
        }
    }
}

/// The request runs off the loop; its reply comes back as an event
fn spawn_translation(
    ticket: TranslateTicket,
    source_url: String,
    client: &BackendClient,
    events_tx: &AsyncSender<PageEvent>,
) {
    let client = client.clone();
    let events_tx = events_tx.clone();

    tokio::spawn(async move {
        let response = client
            .translate_word(ticket.word.clone(), ticket.context.clone(), source_url)
            .await
            .map_err(|e| e.to_string());

        if let Err(e) = events_tx
            .send(PageEvent::TranslationFinished { ticket, response })
            .await
        {
            tracing::debug!("[PAGE] Page closed before translation finished: {}", e);
        }
    });
}
