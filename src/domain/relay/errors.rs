//! Relay error taxonomy.

use thiserror::Error;

use crate::domain::foundation::ConnectionId;

/// Errors that can occur while handling relay events.
///
/// None of these are fatal to the process. A malformed frame is dropped and
/// the connection stays open; the other variants signal a lifecycle misuse
/// by the transport glue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Frame was not valid JSON, named an unknown event, or lacked a field.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Event arrived after the connection was closed.
    #[error("Connection session is closed")]
    SessionClosed,

    /// Connection is not known to the registry.
    #[error("Connection {0} is not registered")]
    NotConnected(ConnectionId),

    /// Connection identifier is already registered.
    #[error("Connection {0} is already registered")]
    AlreadyConnected(ConnectionId),
}

impl RelayError {
    /// True when the error is local to one frame and the connection can continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RelayError::MalformedPayload(_))
    }
}
