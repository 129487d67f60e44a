//! Relay domain - rooms, wire events and connection lifecycle.
//!
//! Rooms have no stored metadata; a room is just a name that some set of
//! connections currently claims membership in. Everything here is plain
//! data, the registry and relay in the application layer give it behavior.

mod connection_state;
mod errors;
mod events;
mod room;

pub use connection_state::ConnectionState;
pub use errors::RelayError;
pub use events::{
    ClientEvent, MembershipChange, MessagePayload, RoomMessage, ServerEvent, SystemMessage,
    SYSTEM_USER,
};
pub use room::RoomName;
