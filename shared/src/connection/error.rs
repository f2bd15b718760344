use thiserror::Error;

use crate::messages::packet_kinds::PacketKind;

/// Errors raised while reading a frame off the wire.
///
/// SECURITY: every variant describes untrusted input. Callers drop the
/// frame and keep the receive loop running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Buffer ended before the frame did
    #[error("Frame truncated: needed {needed} bytes but only {actual} are available")]
    Truncated { needed: usize, actual: usize },

    /// Frame header or length prefix could not be read
    #[error("Malformed frame header: {reason}")]
    MalformedHeader { reason: &'static str },

    /// Payload bytes do not decode into the expected packet
    #[error("Malformed payload for packet {packet}")]
    MalformedPayload { packet: &'static str },

    /// Frame carries a different packet kind than the caller asked for
    #[error("Packet kind mismatch: expected {expected}, found {actual}")]
    KindMismatch {
        expected: PacketKind,
        actual: PacketKind,
    },

    /// Bytes left over after the frame or payload was fully read
    #[error("{count} unexpected trailing bytes after frame")]
    TrailingBytes { count: usize },

    /// The expected packet type is not part of the protocol
    #[error("Packet {name} is not registered with the protocol")]
    UnregisteredKind { name: &'static str },
}
