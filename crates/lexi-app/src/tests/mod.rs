use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use lexi_config::Config;
use lexi_page::{Document, NodePath, Size, dom};
use lexi_store::MemoryStorage;
use lexi_translator::{TranslateError, Translation, Translator};
use tokio::task::JoinSet;
use tokio::time::timeout;

use crate::controller::AppController;
use crate::page::{PageHandle, PageSnapshot};
use crate::state::AppState;

mod router_tests;

/// Canned translator; words it does not know come back empty
pub struct StubTranslator {
    answers: HashMap<String, String>,
    delay: Duration,
    status: Option<u16>,
    calls: AtomicUsize,
    last_model: Mutex<Option<String>>,
}

impl StubTranslator {
    pub fn new(answers: &[(&str, &str)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(word, translation)| (word.to_lowercase(), translation.to_string()))
                .collect(),
            delay: Duration::ZERO,
            status: None,
            calls: AtomicUsize::new(0),
            last_model: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every call fails with this HTTP status
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_model(&self) -> Option<String> {
        self.last_model.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Translator for StubTranslator {
    async fn translate(
        &self,
        _credential: &str,
        word: &str,
        _context: &str,
        model: Option<&str>,
    ) -> Result<Translation, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_model.lock().unwrap() = model.map(str::to_string);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if word == "boom" {
            panic!("stub translator exploded");
        }
        if let Some(status) = self.status {
            return Err(TranslateError::Upstream {
                status,
                body: "stub failure".to_string(),
            });
        }

        match self.answers.get(&word.to_lowercase()) {
            Some(text) => Ok(Translation {
                text: text.clone(),
                model: model.unwrap_or("stub-model").to_string(),
            }),
            None => Err(TranslateError::EmptyResponse),
        }
    }
}

/// Router running over in-memory storage
pub fn start(translator: Arc<StubTranslator>) -> (AppController, JoinSet<anyhow::Result<()>>) {
    let config = Config {
        delta_time: 10,
        ..Config::default()
    };
    start_with(config, translator)
}

pub fn start_with(
    config: Config,
    translator: Arc<StubTranslator>,
) -> (AppController, JoinSet<anyhow::Result<()>>) {
    let state = Arc::new(AppState::new(
        config,
        Arc::new(MemoryStorage::new()),
        translator,
    ));
    let controller = AppController::new(state, 64);
    let tasks = controller.spawn_tasks();
    (controller, tasks)
}

/// One paragraph per text
pub fn article(paragraphs: &[&str]) -> String {
    paragraphs.iter().map(|text| format!("<p>{text}</p>")).collect()
}

/// Path of the first text node of `html` containing `needle`
///
/// Parsing is deterministic, so the path holds for the page thread's copy too.
pub fn text_path(html: &str, needle: &str) -> NodePath {
    let doc = Document::parse(html);
    let node = doc
        .body()
        .descendants()
        .find(|n| dom::text(n).is_some_and(|t| t.contains(needle)))
        .unwrap();
    doc.path_of(&node).unwrap()
}

pub const VIEWPORT: Size = Size {
    width: 1280.0,
    height: 800.0,
};

/// Polls the page until `done` holds
pub async fn wait_for(page: &PageHandle, done: impl Fn(&PageSnapshot) -> bool) -> PageSnapshot {
    timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = page.snapshot().await.unwrap();
            if done(&snapshot) {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("page never reached the expected state")
}
