mod error;
mod queue;
mod settings;
mod storage;
mod vocab;

pub use error::StoreError;
pub use queue::{QueueError, TaskQueue};
pub use settings::{SETTINGS_KEY, SettingsStore};
pub use storage::{JsonFileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use vocab::{UpdateOutcome, UpsertOutcome, VOCAB_KEY, VocabStore};
