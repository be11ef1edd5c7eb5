use crate::queue::QueueError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Malformed vocabulary data: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Word must not be empty")]
    EmptyWord,
}
