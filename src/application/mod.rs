//! Application layer - the room relay and the glue that serializes it.
//!
//! - [`RoomRelay`] maps inbound events to registry operations
//! - [`RelayHub`] shares one relay across connections behind a mutex
//! - [`RelaySession`] owns one connection's open/closed lifecycle

mod hub;
mod room_relay;
mod session;

pub use hub::RelayHub;
pub use room_relay::RoomRelay;
pub use session::RelaySession;
