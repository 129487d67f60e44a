//! RelayHub - the single serialization point for relay state.
//!
//! Connections are served on a multi-threaded runtime, but the room index is
//! one shared mutable structure. The hub keeps the relay behind one async
//! mutex and holds it for the whole of each event, so an event's membership
//! change, acknowledgement and room notification are never interleaved with
//! another event. Broadcasts therefore reach every member in the same global
//! order.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::adapters::websocket::InMemoryConnectionRegistry;
use crate::domain::foundation::ConnectionId;
use crate::domain::relay::{ClientEvent, RelayError, RoomName, ServerEvent};
use crate::ports::ConnectionRegistry;

use super::RoomRelay;

/// Shared handle to the relay. Cheap to clone.
#[derive(Clone)]
pub struct RelayHub {
    relay: Arc<Mutex<RoomRelay>>,
}

impl RelayHub {
    /// Create a hub over the given registry.
    pub fn new(registry: impl ConnectionRegistry + 'static) -> Self {
        Self {
            relay: Arc::new(Mutex::new(RoomRelay::new(registry))),
        }
    }

    /// Create a hub over a fresh in-memory registry.
    pub fn in_memory() -> Self {
        Self::new(InMemoryConnectionRegistry::new())
    }

    /// Register a new connection and hand back its id and outbound queue.
    pub async fn connect(
        &self,
    ) -> Result<(ConnectionId, mpsc::UnboundedReceiver<ServerEvent>), RelayError> {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.relay.lock().await.connect(id, tx)?;
        Ok((id, rx))
    }

    /// Handle one inbound event to completion.
    pub async fn dispatch(&self, id: &ConnectionId, event: ClientEvent) -> Result<(), RelayError> {
        self.relay.lock().await.handle(id, event)
    }

    /// Release all memberships of a connection and forget it.
    pub async fn disconnect(&self, id: &ConnectionId) -> Result<Vec<RoomName>, RelayError> {
        self.relay.lock().await.disconnect(id)
    }

    /// Current members of a room.
    pub async fn members(&self, room: &RoomName) -> Vec<ConnectionId> {
        self.relay.lock().await.registry().members(room)
    }

    /// Rooms a connection currently belongs to.
    pub async fn rooms_of(&self, id: &ConnectionId) -> Result<Vec<RoomName>, RelayError> {
        Ok(self.relay.lock().await.registry().rooms_of(id)?)
    }

    /// Number of open connections.
    pub async fn connection_count(&self) -> usize {
        self.relay.lock().await.registry().connection_count()
    }

    /// Rooms with at least one member.
    pub async fn active_rooms(&self) -> Vec<RoomName> {
        self.relay.lock().await.registry().active_rooms()
    }

    /// Hold the hub lock, stalling every other event until the guard drops.
    #[cfg(test)]
    pub(crate) async fn hold(&self) -> tokio::sync::MutexGuard<'_, RoomRelay> {
        self.relay.lock().await
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::relay::{MembershipChange, MessagePayload, RoomMessage};
    use serde_json::json;

    fn join(room: &str, user: &str) -> ClientEvent {
        ClientEvent::Join(MembershipChange {
            room: room.into(),
            user: user.to_string(),
        })
    }

    #[tokio::test]
    async fn clones_share_state() {
        let hub = RelayHub::in_memory();
        let other = hub.clone();

        let (id, _rx) = hub.connect().await.unwrap();
        other.dispatch(&id, join("lobby", "alice")).await.unwrap();

        assert_eq!(hub.members(&"lobby".into()).await, vec![id]);
        assert_eq!(other.connection_count().await, 1);
    }

    #[tokio::test]
    async fn disconnect_clears_rooms() {
        let hub = RelayHub::default();
        let (id, _rx) = hub.connect().await.unwrap();
        hub.dispatch(&id, join("one", "alice")).await.unwrap();
        hub.dispatch(&id, join("two", "alice")).await.unwrap();
        assert_eq!(hub.rooms_of(&id).await.unwrap().len(), 2);

        let released = hub.disconnect(&id).await.unwrap();

        assert_eq!(released.len(), 2);
        assert!(hub.active_rooms().await.is_empty());
        assert_eq!(hub.connection_count().await, 0);
        assert_eq!(hub.rooms_of(&id).await, Err(RelayError::NotConnected(id)));
    }

    #[tokio::test]
    async fn disconnect_drops_outbox() {
        let hub = RelayHub::in_memory();
        let (id, mut rx) = hub.connect().await.unwrap();

        hub.disconnect(&id).await.unwrap();

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_senders_are_seen_in_one_order_by_every_member() {
        let hub = RelayHub::in_memory();
        let mut receivers = Vec::new();
        let mut ids = Vec::new();
        for n in 0..4 {
            let (id, rx) = hub.connect().await.unwrap();
            hub.dispatch(&id, join("lobby", &format!("user-{}", n)))
                .await
                .unwrap();
            ids.push(id);
            receivers.push(rx);
        }
        for rx in receivers.iter_mut() {
            while rx.try_recv().is_ok() {}
        }

        let mut tasks = Vec::new();
        for (n, id) in ids.iter().copied().enumerate() {
            let hub = hub.clone();
            tasks.push(tokio::spawn(async move {
                for i in 0..25 {
                    hub.dispatch(
                        &id,
                        ClientEvent::To(RoomMessage {
                            room: "lobby".into(),
                            msg: json!({"from": n, "seq": i}),
                        }),
                    )
                    .await
                    .unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let mut sequences = Vec::new();
        for rx in receivers.iter_mut() {
            let mut seen = Vec::new();
            while let Ok(event) = rx.try_recv() {
                match event {
                    ServerEvent::Message(MessagePayload::Relayed(v)) => seen.push(v),
                    other => panic!("unexpected event {:?}", other),
                }
            }
            assert_eq!(seen.len(), 100);
            sequences.push(seen);
        }
        for seq in &sequences[1..] {
            assert_eq!(seq, &sequences[0]);
        }
    }
}
