use thiserror::Error;

/// Failure of a worker call or a subscription operation.
///
/// Callers catch these at the call site and log them; there is no retry
/// layer and no recovery beyond the next poll cycle.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SyncError {
    /// The worker received the call and rejected it (validation failure,
    /// unknown entity, unknown user).
    #[error("worker rejected the call: {0}")]
    Rejected(String),
    /// The call never completed (connection failure, serialization).
    #[error("transport failure: {0}")]
    Transport(String),
}
