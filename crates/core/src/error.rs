use thiserror::Error;

/// Failures surfaced by the todo core.
///
/// Only [`TodoError::Transient`] is worth retrying; everything else describes
/// a request that will fail the same way again.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TodoError {
    /// Caller input was malformed (empty task, bad date, unknown enum literal)
    /// or the store rejected the request shape.
    #[error("{0}")]
    Validation(String),

    /// The referenced record does not exist in the collection.
    #[error("todo not found: {0}")]
    NotFound(String),

    /// Timeout, network failure, rate limiting or a 5xx from the store.
    #[error("store temporarily unavailable: {0}")]
    Transient(String),

    /// An upstream record could not be turned into a todo.
    #[error("malformed record: {0}")]
    Projection(String),
}

impl TodoError {
    pub fn validation(message: impl Into<String>) -> Self {
        TodoError::Validation(message.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, TodoError::Transient(_))
    }

    /// Classify a non-success store response by HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => TodoError::NotFound(message),
            429 | 500..=599 => TodoError::Transient(format!("HTTP {}: {}", status, message)),
            _ => TodoError::Validation(format!(
                "store rejected request (HTTP {}): {}",
                status, message
            )),
        }
    }
}

pub type TodoResult<T> = std::result::Result<T, TodoError>;
