use thiserror::Error;
use vrsync_shared::ChannelKind;

/// Errors surfaced by a transport implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The channel closed without the session asking for it
    #[error("{channel:?} channel closed unexpectedly")]
    ChannelClosed { channel: ChannelKind },

    /// The transport refused a frame
    #[error("Failed to send {size} bytes on {channel:?} channel: {reason}")]
    SendFailed {
        channel: ChannelKind,
        size: usize,
        reason: String,
    },
}
