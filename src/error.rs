use thiserror::Error;

/// Failure taxonomy shared by the task executor and the store.
///
/// Every failed action surfaces one of these; the store treats them all the
/// same way for merge purposes (no local state change, propagate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Network failure or a non-success HTTP status, regardless of body.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered but reported a non-OK status with a message.
    #[error("{0}")]
    Application(String),

    /// The worker itself failed outside the request/response path.
    #[error("worker fault: {0}")]
    Worker(String),
}
