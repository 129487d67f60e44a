//! RelaySession - lifecycle of one accepted connection.

use tokio::sync::mpsc;

use crate::domain::foundation::{ConnectionId, StateMachine};
use crate::domain::relay::{ClientEvent, ConnectionState, RelayError, ServerEvent};

use super::RelayHub;

/// One client connection, from accept to disconnect.
///
/// The session is `Open` until [`close`](Self::close) runs, after which
/// every event is rejected with [`RelayError::SessionClosed`]. Closing is
/// idempotent and releases all room memberships exactly once. A session
/// dropped while still open schedules the same cleanup on the runtime.
pub struct RelaySession {
    id: ConnectionId,
    hub: RelayHub,
    state: ConnectionState,
}

impl RelaySession {
    /// Accept a connection: register it and return its outbound queue.
    pub async fn open(
        hub: RelayHub,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerEvent>), RelayError> {
        let (id, outbox) = hub.connect().await?;
        tracing::info!(connection_id = %id, "Client connected");
        Ok((
            Self {
                id,
                hub,
                state: ConnectionState::Open,
            },
            outbox,
        ))
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Decode and handle one text frame.
    pub async fn handle_frame(&self, frame: &str) -> Result<(), RelayError> {
        self.ensure_open()?;
        let event = ClientEvent::decode(frame)?;
        self.handle_event(event).await
    }

    /// Handle one already-decoded event.
    pub async fn handle_event(&self, event: ClientEvent) -> Result<(), RelayError> {
        self.ensure_open()?;
        tracing::trace!(connection_id = %self.id, event = event.name(), "Inbound event");
        self.hub.dispatch(&self.id, event).await
    }

    /// Release every membership, then transition to `Closed`.
    ///
    /// Calling this on an already closed session does nothing. The state
    /// only changes once the hub has released the connection, so a close
    /// cancelled while waiting on the hub leaves cleanup to `Drop`.
    pub async fn close(&mut self) -> Result<(), RelayError> {
        if !self.state.is_open() {
            return Ok(());
        }

        let result = self.hub.disconnect(&self.id).await;
        if let Ok(closed) = self.state.transition_to(ConnectionState::Closed) {
            self.state = closed;
        }

        let released = result?;
        tracing::info!(
            connection_id = %self.id,
            rooms_released = released.len(),
            "Client disconnected"
        );
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), RelayError> {
        if self.state.is_open() {
            Ok(())
        } else {
            Err(RelayError::SessionClosed)
        }
    }
}

impl Drop for RelaySession {
    fn drop(&mut self) {
        if !self.state.is_open() {
            return;
        }
        let id = self.id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let hub = self.hub.clone();
                handle.spawn(async move {
                    if let Err(e) = hub.disconnect(&id).await {
                        tracing::debug!(connection_id = %id, "Cleanup after drop failed: {}", e);
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    connection_id = %id,
                    "Session dropped outside a runtime, memberships not released"
                );
            }
        }
    }
}
