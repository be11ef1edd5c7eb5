use std::future::Future;
use std::sync::Arc;

use lexi_types::Settings;
use serde_json::Value;

use crate::error::StoreError;
use crate::queue::TaskQueue;
use crate::storage::KeyValueStorage;

pub const SETTINGS_KEY: &str = "settings";

/// `{apiKey, model}` written by the options page
#[derive(Clone)]
pub struct SettingsStore {
    queue: TaskQueue,
    storage: Arc<dyn KeyValueStorage>,
}

impl SettingsStore {
    pub fn new(queue: TaskQueue, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { queue, storage }
    }

    /// Missing settings read as empty strings
    pub fn load(&self) -> impl Future<Output = Result<Settings, StoreError>> + Send + 'static {
        let storage = self.storage.clone();
        let task = self.queue.enqueue(async move {
            match storage.get(SETTINGS_KEY).await? {
                None | Some(Value::Null) => Ok(Settings::default()),
                Some(value) => Ok::<_, StoreError>(serde_json::from_value(value)?),
            }
        });
        async move { task.await? }
    }

    pub fn save(&self, settings: Settings) -> impl Future<Output = Result<(), StoreError>> + Send + 'static {
        let storage = self.storage.clone();
        let task = self.queue.enqueue(async move {
            storage
                .set(SETTINGS_KEY, serde_json::to_value(&settings)?)
                .await?;
            Ok::<_, StoreError>(())
        });
        async move { task.await? }
    }
}
