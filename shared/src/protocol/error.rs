use thiserror::Error;

use crate::messages::error::PacketKindsError;

/// Errors that can occur during protocol operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// No packets can be added once a room has locked the protocol
    #[error("Protocol is locked: packets must be registered before lock() is called")]
    AlreadyLocked,

    /// A packet type could not be registered
    #[error("Packet registration failed: {0}")]
    PacketKinds(#[from] PacketKindsError),
}
