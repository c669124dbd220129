use thiserror::Error;

/// Domain-rule violations raised by the booking engine and the
/// ownership checks around it. The HTTP layer maps each variant to a
/// status code.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    /// The entity exists but is in a state that rejects the operation
    /// (e.g. booking an item whose availability flag is off).
    #[error("{0}")]
    InvalidState(String),

    /// Date-range collision with an existing booking.
    #[error("{0}")]
    Conflict(String),
}

/// Structural storage failure (lost connection, malformed row). Absence
/// of an entity is never an error; stores return `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}
