use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use lexi_config::store::StoreConfig;
use lexi_types::VocabEntry;
use serde_json::Value;

use crate::error::StoreError;
use crate::queue::TaskQueue;
use crate::storage::KeyValueStorage;

pub const VOCAB_KEY: &str = "vocabList";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// True when an existing entry was overwritten
    pub updated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub success: bool,
    pub list: Vec<VocabEntry>,
}

/// Persisted vocabulary list
///
/// Every operation reads the whole list, changes it and writes it back. All of them go
/// through one [`TaskQueue`], so they apply in the order they were called and a write can
/// never be lost to an interleaved one. The returned futures are `'static`: the operation is
/// already queued when the method returns.
#[derive(Clone)]
pub struct VocabStore {
    queue: TaskQueue,
    storage: Arc<dyn KeyValueStorage>,
    max_context_chars: usize,
}

impl VocabStore {
    pub fn new(queue: TaskQueue, storage: Arc<dyn KeyValueStorage>, config: &StoreConfig) -> Self {
        Self {
            queue,
            storage,
            max_context_chars: config.max_context_chars,
        }
    }

    pub fn list(&self) -> impl Future<Output = Result<Vec<VocabEntry>, StoreError>> + Send + 'static {
        let storage = self.storage.clone();
        let task = self
            .queue
            .enqueue(async move { load(storage.as_ref()).await });
        async move { task.await? }
    }

    /// Adds a word, or refreshes the entry that already holds it
    pub fn upsert(
        &self,
        word: impl Into<String>,
        translation: impl Into<String>,
        context: impl Into<String>,
        source_url: impl Into<String>,
    ) -> impl Future<Output = Result<UpsertOutcome, StoreError>> + Send + 'static {
        let storage = self.storage.clone();
        let word = word.into().trim().to_string();
        let translation = translation.into();
        let context = truncate_chars(context.into(), self.max_context_chars);
        let source_url = source_url.into();

        let task = self.queue.enqueue(async move {
            if word.is_empty() {
                return Err(StoreError::EmptyWord);
            }

            let mut list = load(storage.as_ref()).await?;
            let updated = match list.iter_mut().find(|entry| entry.is_word(&word)) {
                Some(entry) => {
                    entry.translation = translation;
                    entry.context = context;
                    entry.source_url = source_url;
                    true
                }
                None => {
                    list.push(VocabEntry {
                        word,
                        translation,
                        context,
                        source_url,
                        added_at: Utc::now(),
                    });
                    false
                }
            };

            save(storage.as_ref(), &list).await?;
            Ok::<_, StoreError>(UpsertOutcome { updated })
        });
        async move { task.await? }
    }

    /// Drops every entry matching `word`, returns what is left
    pub fn remove(
        &self,
        word: impl Into<String>,
    ) -> impl Future<Output = Result<Vec<VocabEntry>, StoreError>> + Send + 'static {
        let storage = self.storage.clone();
        let word = word.into().trim().to_string();

        let task = self.queue.enqueue(async move {
            let mut list = load(storage.as_ref()).await?;
            let before = list.len();
            list.retain(|entry| !entry.is_word(&word));

            if list.len() != before {
                save(storage.as_ref(), &list).await?;
                tracing::debug!("Removed '{}' from vocabulary", word);
            }
            Ok::<_, StoreError>(list)
        });
        async move { task.await? }
    }

    pub fn update_translation(
        &self,
        word: impl Into<String>,
        translation: impl Into<String>,
    ) -> impl Future<Output = Result<UpdateOutcome, StoreError>> + Send + 'static {
        let storage = self.storage.clone();
        let word = word.into().trim().to_string();
        let translation = translation.into();

        let task = self.queue.enqueue(async move {
            let mut list = load(storage.as_ref()).await?;
            let Some(entry) = list.iter_mut().find(|entry| entry.is_word(&word)) else {
                return Ok(UpdateOutcome {
                    success: false,
                    list,
                });
            };

            entry.translation = translation;
            save(storage.as_ref(), &list).await?;
            Ok::<_, StoreError>(UpdateOutcome {
                success: true,
                list,
            })
        });
        async move { task.await? }
    }
}

async fn load(storage: &dyn KeyValueStorage) -> Result<Vec<VocabEntry>, StoreError> {
    match storage.get(VOCAB_KEY).await? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => Ok(serde_json::from_value(value)?),
    }
}

async fn save(storage: &dyn KeyValueStorage, list: &[VocabEntry]) -> Result<(), StoreError> {
    storage.set(VOCAB_KEY, serde_json::to_value(list)?).await?;
    Ok(())
}

fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}
