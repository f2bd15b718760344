use std::collections::{vec_deque, VecDeque};

use crate::{
    connection::encoder::marshal,
    messages::{error::PacketKindsError, packet::Packet, packet_kinds::PacketKinds},
    types::{ChannelKind, PeerId, BROADCAST},
};

/// An encoded frame waiting to be handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingFrame {
    pub channel: ChannelKind,
    pub recipient: PeerId,
    pub bytes: Box<[u8]>,
}

/// Frames produced during one tick, flushed by the session afterwards.
pub struct Outbox {
    local_peer: PeerId,
    frames: VecDeque<OutgoingFrame>,
}

impl Outbox {
    pub fn new(local_peer: PeerId) -> Self {
        Self {
            local_peer,
            frames: VecDeque::new(),
        }
    }

    pub fn local_peer(&self) -> PeerId {
        self.local_peer
    }

    pub fn send<P: Packet>(
        &mut self,
        kinds: &PacketKinds,
        channel: ChannelKind,
        recipient: PeerId,
        packet: &P,
    ) -> Result<(), PacketKindsError> {
        let bytes = marshal(kinds, self.local_peer, recipient, packet)?;
        self.frames.push_back(OutgoingFrame {
            channel,
            recipient,
            bytes,
        });
        Ok(())
    }

    pub fn broadcast<P: Packet>(
        &mut self,
        kinds: &PacketKinds,
        channel: ChannelKind,
        packet: &P,
    ) -> Result<(), PacketKindsError> {
        self.send(kinds, channel, BROADCAST, packet)
    }

    pub fn drain(&mut self) -> vec_deque::Drain<'_, OutgoingFrame> {
        self.frames.drain(..)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
