/// Identifies a connected peer on the transport.
pub type PeerId = u32;
/// Identifies the user that may author updates for an entity. A peer acts for
/// exactly one user, so the two share a value space.
pub type UserId = u32;

/// Reserved recipient id meaning "every peer".
pub const BROADCAST: PeerId = u32::MAX;

/// Which of the two transport channels a frame travels on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Signaling/control channel: reliable and ordered per peer
    Reliable,
    /// Realtime data channel: may drop or reorder
    Unordered,
}

impl ChannelKind {
    pub fn is_reliable(self) -> bool {
        matches!(self, ChannelKind::Reliable)
    }
}
