//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the relay and the transport it runs on. Adapters implement these ports.
//!
//! - `ConnectionRegistry` - room membership index and per-connection delivery

mod connection_registry;

pub use connection_registry::{ConnectionRegistry, ConnectionRegistryError, Outbox};
