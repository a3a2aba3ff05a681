use thiserror::Error;

/// Failure taxonomy of the aggregation engine.
///
/// Everything except `StoreUnavailable` is a caller error and will fail the
/// same way on retry; `StoreUnavailable` is transient and safe to retry with
/// backoff. No variant is ever fatal to the process.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}
