use std::sync::Arc;

use lexi_config::Config;
use lexi_store::{KeyValueStorage, SettingsStore, TaskQueue, VocabStore};
use lexi_translator::Translator;
use tokio::sync::RwLock;

use crate::page::PageHandle;

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub vocab: VocabStore,
    pub settings: SettingsStore,
    pub translator: Arc<dyn Translator>,
    page: RwLock<Option<PageHandle>>,
}

impl AppState {
    /// Vocabulary and settings share one queue, so their writes are ordered together
    pub fn new(
        config: Config,
        storage: Arc<dyn KeyValueStorage>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let queue = TaskQueue::new();
        let vocab = VocabStore::new(queue.clone(), storage.clone(), &config.store);
        let settings = SettingsStore::new(queue, storage);

        Self {
            config: Arc::new(RwLock::new(config)),
            vocab,
            settings,
            translator,
            page: RwLock::new(None),
        }
    }

    /// Routes page commands to `handle` from now on, closing the previous page
    pub async fn attach_page(&self, handle: PageHandle) {
        if let Some(previous) = self.page.write().await.replace(handle) {
            previous.close();
        }
    }

    pub async fn page(&self) -> Option<PageHandle> {
        self.page.read().await.clone()
    }
}
