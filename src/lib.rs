//! Room Relay - Real-time room-based message relay
//!
//! Clients connect over WebSocket, join and leave named rooms, and broadcast
//! messages to every member of a room. A liveness route answers `ok`, and
//! all other HTTP traffic is delegated to a fallback service.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
