use thiserror::Error;
use vrsync_shared::PacketKindsError;

use crate::{entry::EntryCommandError, transport::TransportError};

/// Failures a room session reports to its caller. Frame-level problems are
/// absorbed and never show up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// The entry command could not be parsed; stay on the entry screen
    #[error("Invalid entry command: {0}")]
    Entry(#[from] EntryCommandError),

    /// A channel failed; the exit sequence has started
    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The protocol lacks a built-in packet
    #[error("Protocol error: {0}")]
    Protocol(#[from] PacketKindsError),
}
