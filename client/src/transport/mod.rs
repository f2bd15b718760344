mod error;

pub use error::TransportError;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::trace;
use vrsync_shared::{ChannelKind, PeerId};

/// The connected channels of one room, as handed over by the connection
/// layer.
pub trait Transport {
    /// Sends on the signaling channel. `peer` may be `BROADCAST`.
    fn send_reliable(&mut self, peer: PeerId, bytes: Box<[u8]>) -> Result<(), TransportError>;

    /// Sends to every peer on the realtime channel, which may drop or
    /// reorder
    fn send_unordered(&mut self, bytes: Box<[u8]>) -> Result<(), TransportError>;

    fn close_realtime(&mut self);

    fn close_signaling(&mut self);
}

/// What an I/O context reports to the update loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Bytes { peer: PeerId, bytes: Box<[u8]> },
    Closed { channel: ChannelKind },
}

/// Queue between transport callbacks and the update loop. Frames are only
/// dispatched when the loop drains it.
pub struct InboundQueue {
    sender: Sender<InboundEvent>,
    receiver: Receiver<InboundEvent>,
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InboundQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// A handle for an I/O context. Any number may exist, on any thread.
    pub fn handle(&self) -> InboundHandle {
        InboundHandle {
            sender: self.sender.clone(),
        }
    }

    /// Everything queued so far, in arrival order
    pub fn drain(&self) -> Vec<InboundEvent> {
        self.receiver.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[derive(Clone)]
pub struct InboundHandle {
    sender: Sender<InboundEvent>,
}

impl InboundHandle {
    /// Returns false once the session is gone
    pub fn on_bytes(&self, peer: PeerId, bytes: Box<[u8]>) -> bool {
        self.push(InboundEvent::Bytes { peer, bytes })
    }

    pub fn on_closed(&self, channel: ChannelKind) -> bool {
        self.push(InboundEvent::Closed { channel })
    }

    fn push(&self, event: InboundEvent) -> bool {
        if self.sender.send(event).is_err() {
            trace!("inbound event after session end dropped");
            return false;
        }
        true
    }
}
