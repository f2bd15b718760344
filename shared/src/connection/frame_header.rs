use vrsync_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

use crate::{messages::packet_kinds::PacketKind, types::{PeerId, BROADCAST}};

/// The fixed part of every frame: who sent it, who it is for, and what it
/// carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameHeader {
    pub sender_id: PeerId,
    pub recipient_id: PeerId,
    pub packet_kind: PacketKind,
}

impl FrameHeader {
    /// Encoded size in bytes
    pub const LEN: usize = 12;

    pub fn new(sender_id: PeerId, recipient_id: PeerId, packet_kind: PacketKind) -> Self {
        Self {
            sender_id,
            recipient_id,
            packet_kind,
        }
    }

    pub fn is_broadcast(&self) -> bool {
        self.recipient_id == BROADCAST
    }

    /// Whether a peer with id `peer` should act on this frame
    pub fn is_for(&self, peer: PeerId) -> bool {
        self.is_broadcast() || self.recipient_id == peer
    }
}

impl Serde for FrameHeader {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.sender_id.ser(writer);
        self.recipient_id.ser(writer);
        self.packet_kind.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let sender_id = PeerId::de(reader)?;
        let recipient_id = PeerId::de(reader)?;
        let packet_kind = PacketKind::de(reader)?;
        Ok(Self {
            sender_id,
            recipient_id,
            packet_kind,
        })
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for FrameHeader {
    fn const_bit_length() -> u32 {
        (Self::LEN * 8) as u32
    }
}
