use thiserror::Error;

use crate::connection::error::DecodeError;
use crate::messages::packet_kinds::PacketKind;

/// Errors that can occur during packet kind operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketKindsError {
    /// Packet type was never registered
    #[error("Packet {name} is not registered. Packet types must be registered with Protocol via add_packet()")]
    NotRegistered { name: &'static str },

    /// Two packet types hash to the same kind
    #[error("Packet {incoming} hashes to kind {kind}, which is already taken by {existing}. Give one of them a seed")]
    Collision {
        kind: PacketKind,
        existing: &'static str,
        incoming: &'static str,
    },
}

/// Errors a handler can raise while processing one inbound frame.
/// The dispatcher logs these and drops the frame; they never reach the
/// receive loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The frame or its payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The handler decoded the packet but refused to act on it
    #[error("Handler for {packet} rejected the frame: {reason}")]
    Rejected { packet: &'static str, reason: String },
}
