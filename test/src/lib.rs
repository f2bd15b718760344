//! Shared fixtures for vrsync's integration tests: an in-memory room network
//! and recording instantiators.

pub mod helpers;

pub use helpers::*;
pub use local_network::{LocalNetwork, LocalTransport, NetworkEvent};
