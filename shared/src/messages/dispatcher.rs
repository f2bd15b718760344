use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::{
    connection::{decoder::{read_frame, read_payload}, frame_header::FrameHeader},
    messages::{
        error::{DispatchError, PacketKindsError},
        packet::Packet,
        packet_kinds::{PacketKind, PacketKinds},
    },
};

/// Handler invoked with the dispatch context, the frame header and the raw
/// payload.
pub type Handler<C> = Box<dyn FnMut(&mut C, &FrameHeader, &[u8]) -> Result<(), DispatchError>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Handled,
    /// No handler for this kind; the frame was dropped
    Unhandled(PacketKind),
    /// The frame or its handler failed; the frame was dropped
    Dropped(DispatchError),
}

/// Tally of one `dispatch_all` pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub handled: usize,
    pub unhandled: usize,
    pub dropped: usize,
}

impl DispatchStats {
    pub fn total(&self) -> usize {
        self.handled + self.unhandled + self.dropped
    }
}

/// Routes inbound frames to one handler per packet kind.
pub struct Dispatcher<C> {
    handlers: HashMap<PacketKind, Handler<C>>,
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Dispatcher<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Installs `handler` for `kind`, replacing any previous one. Returns
    /// whether a handler was replaced.
    pub fn register<F>(&mut self, kind: PacketKind, handler: F) -> bool
    where
        F: FnMut(&mut C, &FrameHeader, &[u8]) -> Result<(), DispatchError> + 'static,
    {
        let replaced = self.handlers.insert(kind, Box::new(handler)).is_some();
        if replaced {
            debug!("handler for packet kind {} replaced", kind);
        }
        replaced
    }

    /// Installs a handler that receives the decoded `P` instead of raw bytes.
    pub fn register_packet<P, F>(
        &mut self,
        kinds: &PacketKinds,
        mut handler: F,
    ) -> Result<bool, PacketKindsError>
    where
        P: Packet,
        F: FnMut(&mut C, &FrameHeader, P) -> Result<(), DispatchError> + 'static,
    {
        let kind = kinds.kind_of::<P>()?;
        Ok(self.register(kind, move |context, header, payload| {
            let packet = read_payload::<P>(payload)?;
            handler(context, header, packet)
        }))
    }

    pub fn unregister(&mut self, kind: &PacketKind) -> bool {
        self.handlers.remove(kind).is_some()
    }

    pub fn has_handler(&self, kind: &PacketKind) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Drops every handler. Called on session teardown.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Decodes the frame header and hands the payload to the matching
    /// handler. Never fails: errors are logged and reported in the outcome.
    pub fn dispatch(&mut self, context: &mut C, frame: &[u8]) -> DispatchOutcome {
        let (header, payload) = match read_frame(frame) {
            Ok(parts) => parts,
            Err(error) => {
                warn!("dropping undecodable frame: {}", error);
                return DispatchOutcome::Dropped(error.into());
            }
        };

        let Some(handler) = self.handlers.get_mut(&header.packet_kind) else {
            trace!(
                "no handler for packet kind {} from peer {}",
                header.packet_kind,
                header.sender_id
            );
            return DispatchOutcome::Unhandled(header.packet_kind);
        };

        match handler(context, &header, payload) {
            Ok(()) => DispatchOutcome::Handled,
            Err(error) => {
                warn!(
                    "dropping frame of kind {} from peer {}: {}",
                    header.packet_kind, header.sender_id, error
                );
                DispatchOutcome::Dropped(error)
            }
        }
    }

    /// Dispatches frames in order. A bad frame never stops the ones after it.
    pub fn dispatch_all<'a, I>(&mut self, context: &mut C, frames: I) -> DispatchStats
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut stats = DispatchStats::default();
        for frame in frames {
            match self.dispatch(context, frame) {
                DispatchOutcome::Handled => stats.handled += 1,
                DispatchOutcome::Unhandled(_) => stats.unhandled += 1,
                DispatchOutcome::Dropped(_) => stats.dropped += 1,
            }
        }
        stats
    }
}
