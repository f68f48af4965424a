use thiserror::Error;

/// Errors raised while reading or writing a persisted slot.
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Slot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Slot encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Slot backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors raised by the record stores.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No record with id {0}")]
    NotFound(u32),

    #[error("No ids left: the largest id in use is {0}")]
    IdsExhausted(u32),

    #[error("Persistence error: {0}")]
    Slot(#[from] SlotError),
}
