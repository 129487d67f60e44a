//! Connection lifecycle state machine.

use crate::domain::foundation::StateMachine;

/// Lifecycle of a single client connection.
///
/// `Open` on accept, `Closed` once the transport disconnects. `Closed` is
/// terminal; there is no reconnect, a new connection gets a new identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Open,
    Closed,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

impl StateMachine for ConnectionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (ConnectionState::Open, ConnectionState::Closed)
        )
    }
}
