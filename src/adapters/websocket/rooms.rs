//! In-memory room registry for connection-based message routing.
//!
//! Rooms are keyed by client-chosen name, allowing targeted broadcast of
//! events to all connections that joined the room.
//!
//! # Architecture
//!
//! ```text
//! Room: lobby          Room: games
//! ├── client-a         ├── client-b
//! ├── client-b         └── client-d
//! └── client-c
//! ```
//!
//! A broadcast to `lobby` reaches clients a, b, c only. Each client also
//! keeps the set of rooms it is in, so disconnect cleanup never scans the
//! whole room map.

use std::collections::{BTreeSet, HashMap};

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::{RoomName, ServerEvent};
use crate::ports::{ConnectionRegistry, ConnectionRegistryError, Outbox};

/// Per-connection bookkeeping.
struct ConnectionEntry {
    outbox: Outbox,
    rooms: BTreeSet<RoomName>,
}

/// Room membership index backed by plain maps.
///
/// Provides:
/// - Connection register/unregister with full membership release
/// - Room join/leave with lazy room creation
/// - Broadcast to every member of a room
/// - Automatic cleanup of empty rooms
///
/// # Thread Safety
///
/// Not synchronized on its own. The relay hub owns it behind a single
/// mutex so each event runs to completion before the next one starts.
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    /// Map of room → connections currently in it.
    rooms: HashMap<RoomName, BTreeSet<ConnectionId>>,

    /// Map of connection → outbox and joined rooms, for O(rooms) cleanup on disconnect.
    connections: HashMap<ConnectionId, ConnectionEntry>,
}

impl InMemoryConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_mut(
        &mut self,
        id: &ConnectionId,
    ) -> Result<&mut ConnectionEntry, ConnectionRegistryError> {
        self.connections
            .get_mut(id)
            .ok_or(ConnectionRegistryError::NotRegistered(*id))
    }

    /// Drop `id` from the member set of `room`, removing the room once empty.
    fn remove_member(&mut self, room: &RoomName, id: &ConnectionId) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.remove(id);
            if members.is_empty() {
                self.rooms.remove(room);
            }
        }
    }

    fn deliver(&self, id: &ConnectionId, event: ServerEvent) -> bool {
        let Some(entry) = self.connections.get(id) else {
            return false;
        };
        match entry.outbox.send(event) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(connection_id = %id, "Outbox closed, skipping delivery");
                false
            }
        }
    }
}

impl ConnectionRegistry for InMemoryConnectionRegistry {
    fn register(
        &mut self,
        id: ConnectionId,
        outbox: Outbox,
    ) -> Result<(), ConnectionRegistryError> {
        if self.connections.contains_key(&id) {
            return Err(ConnectionRegistryError::AlreadyRegistered(id));
        }
        self.connections.insert(
            id,
            ConnectionEntry {
                outbox,
                rooms: BTreeSet::new(),
            },
        );
        Ok(())
    }

    fn unregister(&mut self, id: &ConnectionId) -> Result<Vec<RoomName>, ConnectionRegistryError> {
        let entry = self
            .connections
            .remove(id)
            .ok_or(ConnectionRegistryError::NotRegistered(*id))?;

        for room in &entry.rooms {
            self.remove_member(room, id);
        }

        Ok(entry.rooms.into_iter().collect())
    }

    fn join(&mut self, id: &ConnectionId, room: &RoomName) -> Result<bool, ConnectionRegistryError> {
        let added = self.entry_mut(id)?.rooms.insert(room.clone());
        self.rooms.entry(room.clone()).or_default().insert(*id);
        Ok(added)
    }

    fn leave(&mut self, id: &ConnectionId, room: &RoomName) -> Result<bool, ConnectionRegistryError> {
        let removed = self.entry_mut(id)?.rooms.remove(room);
        if removed {
            self.remove_member(room, id);
        }
        Ok(removed)
    }

    fn emit(&self, id: &ConnectionId, event: ServerEvent) -> Result<bool, ConnectionRegistryError> {
        if !self.connections.contains_key(id) {
            return Err(ConnectionRegistryError::NotRegistered(*id));
        }
        Ok(self.deliver(id, event))
    }

    fn broadcast(&self, room: &RoomName, event: &ServerEvent) -> usize {
        let Some(members) = self.rooms.get(room) else {
            return 0;
        };
        members
            .iter()
            .filter(|id| self.deliver(id, event.clone()))
            .count()
    }

    fn is_registered(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    fn members(&self, room: &RoomName) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|m| m.iter().copied().collect())
            .unwrap_or_default()
    }

    fn rooms_of(&self, id: &ConnectionId) -> Result<Vec<RoomName>, ConnectionRegistryError> {
        self.connections
            .get(id)
            .map(|entry| entry.rooms.iter().cloned().collect())
            .ok_or(ConnectionRegistryError::NotRegistered(*id))
    }

    fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn active_rooms(&self) -> Vec<RoomName> {
        self.rooms.keys().cloned().collect()
    }
}
