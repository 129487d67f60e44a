//! Wire events exchanged with connected clients.
//!
//! Every WebSocket text frame carries one JSON object of the form
//! `{"event": <name>, "data": <payload>}`. Events without a payload omit
//! `data` entirely.
//!
//! - Client → Server: `ping`, `join`, `leave`, `to`
//! - Server → Client: `pong`, `joined`, `left`, `message`

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

use super::{RelayError, RoomName};

/// Display name used as the author of synthesized notifications.
pub const SYSTEM_USER: &str = "system";

// ============================================
// Client → Server Events
// ============================================

/// All events a client may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Liveness probe, answered with `pong`.
    Ping,

    /// Enter a room.
    Join(MembershipChange),

    /// Exit a room.
    Leave(MembershipChange),

    /// Relay an opaque payload to everyone in a room.
    To(RoomMessage),
}

impl ClientEvent {
    /// Decode one text frame.
    ///
    /// Anything that does not match the event table is reported as
    /// [`RelayError::MalformedPayload`].
    pub fn decode(frame: &str) -> Result<Self, RelayError> {
        serde_json::from_str(frame).map_err(|e| RelayError::MalformedPayload(e.to_string()))
    }

    /// Event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Ping => "ping",
            ClientEvent::Join(_) => "join",
            ClientEvent::Leave(_) => "leave",
            ClientEvent::To(_) => "to",
        }
    }
}

/// Payload of `join` and `leave`.
///
/// `user` is whatever the client claims to be; it is never authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MembershipChange {
    pub room: RoomName,
    pub user: String,
}

/// Payload of `to`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoomMessage {
    pub room: RoomName,
    pub msg: serde_json::Value,
}

// ============================================
// Server → Client Events
// ============================================

/// All events the server may send.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Reply to `ping`.
    Pong,

    /// Acknowledges a join to the actor.
    Joined(RoomName),

    /// Acknowledges a leave to the actor.
    Left(RoomName),

    /// Room traffic, either a system notification or a relayed payload.
    Message(MessagePayload),
}

impl ServerEvent {
    /// Encode as one text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Body of a `message` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessagePayload {
    System(SystemMessage),
    Relayed(serde_json::Value),
}

/// Notification synthesized by the relay on membership changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemMessage {
    pub user: String,
    pub message: String,
    pub timestamp: Timestamp,
}

impl SystemMessage {
    pub fn joined(user: &str, at: Timestamp) -> Self {
        Self::new(format!("User '{}' joined the room", user), at)
    }

    pub fn left(user: &str, at: Timestamp) -> Self {
        Self::new(format!("User '{}' left the room", user), at)
    }

    fn new(message: String, timestamp: Timestamp) -> Self {
        Self {
            user: SYSTEM_USER.to_string(),
            message,
            timestamp,
        }
    }
}
