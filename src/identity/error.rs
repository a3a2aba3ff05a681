use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum IdentityError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Identity validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
