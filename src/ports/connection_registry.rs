//! ConnectionRegistry port - Interface for room membership and delivery.
//!
//! The relay never talks to sockets directly. Each accepted connection is
//! registered together with an [`Outbox`], and every outbound event goes
//! either to one connection (`emit`) or to every member of a room
//! (`broadcast`). The registry owns both indexes:
//!
//! ```text
//! rooms:        lobby → {a, b}      games → {b}
//! connections:  a → {lobby}         b → {lobby, games}
//! ```
//!
//! All operations are synchronous and in-memory. Callers serialize access;
//! see `RelayHub`.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::foundation::ConnectionId;
use crate::domain::relay::{RelayError, RoomName, ServerEvent};

/// Sending half of a connection's outbound queue.
///
/// Unbounded: a push never blocks the relay, and a slow reader only grows
/// its own queue.
pub type Outbox = mpsc::UnboundedSender<ServerEvent>;

/// Errors that can occur in connection registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionRegistryError {
    /// Connection was never registered or has already been removed.
    #[error("Connection {0} is not registered")]
    NotRegistered(ConnectionId),

    /// Connection identifier is already in use.
    #[error("Connection {0} is already registered")]
    AlreadyRegistered(ConnectionId),
}

impl From<ConnectionRegistryError> for RelayError {
    fn from(err: ConnectionRegistryError) -> Self {
        match err {
            ConnectionRegistryError::NotRegistered(id) => RelayError::NotConnected(id),
            ConnectionRegistryError::AlreadyRegistered(id) => RelayError::AlreadyConnected(id),
        }
    }
}

/// Port for tracking connections, their room memberships, and delivering
/// events to them.
///
/// Implementations must keep the room → members and connection → rooms
/// indexes consistent: `c ∈ members(r)` iff `r ∈ rooms_of(c)`.
pub trait ConnectionRegistry: Send {
    /// Register a newly accepted connection with no memberships.
    fn register(&mut self, id: ConnectionId, outbox: Outbox)
        -> Result<(), ConnectionRegistryError>;

    /// Remove a connection and release every room it belonged to.
    ///
    /// Returns the rooms that were released.
    fn unregister(&mut self, id: &ConnectionId) -> Result<Vec<RoomName>, ConnectionRegistryError>;

    /// Add a connection to a room. Returns `false` if it was already a member.
    fn join(&mut self, id: &ConnectionId, room: &RoomName) -> Result<bool, ConnectionRegistryError>;

    /// Remove a connection from a room. Returns `false` if it was not a member.
    fn leave(&mut self, id: &ConnectionId, room: &RoomName)
        -> Result<bool, ConnectionRegistryError>;

    /// Deliver an event to one connection.
    ///
    /// Returns `false` if the connection's transport has already gone away.
    fn emit(&self, id: &ConnectionId, event: ServerEvent) -> Result<bool, ConnectionRegistryError>;

    /// Deliver an event to every current member of a room.
    ///
    /// Members whose transport has gone away are skipped. Returns the number
    /// of successful deliveries; an empty or unknown room yields zero.
    fn broadcast(&self, room: &RoomName, event: &ServerEvent) -> usize;

    /// Check whether a connection is registered.
    fn is_registered(&self, id: &ConnectionId) -> bool;

    /// Current members of a room (empty if the room has no members).
    fn members(&self, room: &RoomName) -> Vec<ConnectionId>;

    /// Rooms a connection currently belongs to.
    fn rooms_of(&self, id: &ConnectionId) -> Result<Vec<RoomName>, ConnectionRegistryError>;

    /// Number of registered connections.
    fn connection_count(&self) -> usize;

    /// Rooms with at least one member.
    fn active_rooms(&self) -> Vec<RoomName>;
}
