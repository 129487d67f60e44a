//! Domain layer - relay vocabulary free of transport and locking concerns.

pub mod foundation;
pub mod relay;
