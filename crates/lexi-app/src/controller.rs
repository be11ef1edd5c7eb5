use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use lexi_page::Size;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::client::BackendClient;
use crate::events::{Request, event_loop};
use crate::page::{PageHandle, PageLauncher};
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub requests: (AsyncSender<Request>, AsyncReceiver<Request>),
}

impl ChannelSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            requests: kanal::bounded_async(capacity),
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    launcher: PageLauncher,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>, request_capacity: usize) -> Self {
        let channels = ChannelSet::new(request_capacity);
        let cancel_token = CancellationToken::new();
        let launcher = PageLauncher::new(
            BackendClient::new(channels.requests.0.clone()),
            cancel_token.child_token(),
        );

        Self {
            channels,
            state,
            launcher,
            cancel_token,
        }
    }

    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    pub fn client(&self) -> BackendClient {
        BackendClient::new(self.channels.requests.0.clone())
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    pub fn spawn_tasks(&self) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Router
        tasks.spawn(event_loop(
            self.state.clone(),
            self.launcher.clone(),
            self.channels.requests.1.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    /// Parses `html` into a new page and makes it the target of page commands
    pub async fn attach_page(
        &self,
        html: &str,
        url: &str,
        viewport: Size,
    ) -> anyhow::Result<PageHandle> {
        self.launcher
            .attach(&self.state, html.to_string(), url.to_string(), Some(viewport))
            .await
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
