//! Adapters - Implementations of port interfaces and transport glue.
//!
//! - `websocket` - In-memory room registry and WebSocket connection handler
//! - `http` - Router, liveness endpoint and fallback delegation

pub mod http;
pub mod websocket;

pub use websocket::InMemoryConnectionRegistry;
