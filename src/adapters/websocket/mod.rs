//! WebSocket adapters for the room relay.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       ws_handler (per socket)                        │
//! │   text frame → RelaySession::handle_frame                            │
//! │   outbox     → writer task → text frame                              │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ dispatch (one event at a time)
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 RelayHub → RoomRelay → registry                      │
//! │   Room: lobby          Room: games          Room: ""                 │
//! │   ├── client-a         ├── client-b         └── client-e             │
//! │   └── client-b         └── client-d                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`rooms`] - In-memory room registry
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod rooms;

pub use handler::ws_handler;
pub use rooms::InMemoryConnectionRegistry;
