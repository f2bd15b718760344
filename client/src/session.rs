use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use log::{debug, info, warn};
use vrsync_shared::{
    pad, read_frame, unpad, Address32, Address64, ChannelKind, Dispatcher, Instantiator, OutgoingFrame,
    Protocol, RoomWorld, Store, UserId, WorldEvent,
};

use crate::{
    auth::{authenticate, RoomRole},
    config::RoomConfig,
    entry::EntryCommand,
    error::RoomError,
    interaction::{Capability, Interactable, InteractionEffect, InteractionEvent},
    tasks::{TaskProgress, TaskScheduler},
    transport::{InboundEvent, InboundQueue, Transport, TransportError},
};

/// Where the session stands in its teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    /// Realtime channel closed, signaling still open until the deadline
    RealtimeGrace { until: Instant },
    /// Both channels closed, waiting out the last grace interval
    SignalingGrace { until: Instant },
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    World(WorldEvent),
    Task(TaskProgress<Address64>),
    ExitStarted,
    RealtimeClosed,
    SignalingClosed,
    Closed,
}

/// Who is entering, and with what
pub struct RoomEntry<'a> {
    pub local_user: UserId,
    pub command: &'a str,
    pub stored_hash: Option<&'a str>,
}

/// One peer's membership in a room: owns the world, the handler table and
/// the transport for as long as the room lasts.
pub struct RoomSession<T: Transport, I: Instantiator + 'static> {
    config: RoomConfig,
    transport: T,
    inbound: InboundQueue,
    dispatcher: Dispatcher<RoomWorld<I>>,
    world: RoomWorld<I>,
    role: RoomRole,
    command: EntryCommand,
    scheduler: TaskScheduler<Address64>,
    interactables: HashMap<Address64, Interactable>,
    phase: SessionPhase,
    last_push: Option<Instant>,
    pending: Vec<RoomEvent>,
}

impl<T: Transport, I: Instantiator + 'static> RoomSession<T, I> {
    /// Parses and authenticates the entry command, then builds the room's
    /// registries and handler table. Nothing is registered if parsing fails.
    pub fn enter(
        config: RoomConfig,
        mut protocol: Protocol,
        transport: T,
        inbound: InboundQueue,
        instantiator: I,
        store: Store,
        entry: RoomEntry<'_>,
    ) -> Result<Self, RoomError> {
        let command = EntryCommand::parse(entry.command)?;
        let role = authenticate(&command, entry.stored_hash);

        if !protocol.is_locked() {
            protocol.lock();
        }

        let session = Address32::from_u32(fastrand::u32(..));
        let world = RoomWorld::new(
            protocol.packet_kinds.clone(),
            entry.local_user,
            session,
            store,
            instantiator,
        );
        let mut dispatcher = Dispatcher::new();
        RoomWorld::register_handlers(&mut dispatcher, &protocol.packet_kinds)?;

        info!(
            "user {} entered room {} as {:?} (session {})",
            entry.local_user,
            command.address(),
            role,
            session
        );

        Ok(Self {
            config,
            transport,
            inbound,
            dispatcher,
            world,
            role,
            command,
            scheduler: TaskScheduler::new(),
            interactables: HashMap::new(),
            phase: SessionPhase::Active,
            last_push: None,
            pending: Vec::new(),
        })
    }

    pub fn role(&self) -> RoomRole {
        self.role
    }

    pub fn command(&self) -> &EntryCommand {
        &self.command
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_closed(&self) -> bool {
        self.phase == SessionPhase::Closed
    }

    pub fn world(&self) -> &RoomWorld<I> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut RoomWorld<I> {
        &mut self.world
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn handler_count(&self) -> usize {
        self.dispatcher.len()
    }

    pub fn add_interactable(&mut self, address: Address64, capability: Capability) {
        self.interactables
            .insert(address, Interactable::new(address, capability));
    }

    /// Routes a pointer event to the entity's interactable
    pub fn interact(
        &mut self,
        address: &Address64,
        event: InteractionEvent,
        now: Instant,
    ) -> Vec<InteractionEffect> {
        let Some(interactable) = self.interactables.get_mut(address) else {
            debug!("interaction with {} ignored, not interactable", address);
            return Vec::new();
        };
        interactable.handle(event, &mut self.scheduler, self.config.fade_duration, now)
    }

    /// Runs one update: drain inbound frames, dispatch them, push
    /// replication, advance tasks, flush the outbox. During exit it advances
    /// the teardown instead.
    pub fn tick(&mut self, now: Instant) -> Result<Vec<RoomEvent>, RoomError> {
        if self.phase != SessionPhase::Active {
            // nothing is dispatched once teardown starts
            let _ = self.inbound.drain();
            self.advance_exit(now);
            return Ok(std::mem::take(&mut self.pending));
        }

        let mut events = std::mem::take(&mut self.pending);

        if let Err(error) = self.receive() {
            events.extend(self.world.take_events().into_iter().map(RoomEvent::World));
            return Err(self.fail(error, now, events));
        }

        if self.push_due(now) {
            self.last_push = Some(now);
            if let Err(error) = self.world.push() {
                warn!("replication push failed: {}", error);
            }
        }

        events.extend(self.world.take_events().into_iter().map(RoomEvent::World));
        events.extend(self.scheduler.advance(now).into_iter().map(RoomEvent::Task));

        if let Err(error) = self.flush() {
            return Err(self.fail(error, now, events));
        }

        Ok(events)
    }

    /// Starts the teardown sequence. Later ticks finish it.
    pub fn exit(&mut self, now: Instant) -> Vec<RoomEvent> {
        if self.phase == SessionPhase::Active {
            self.begin_exit(now);
            self.advance_exit(now);
        }
        std::mem::take(&mut self.pending)
    }

    fn receive(&mut self) -> Result<(), TransportError> {
        let local_user = self.world.local_user();
        for event in self.inbound.drain() {
            let (peer, bytes) = match event {
                InboundEvent::Bytes { peer, bytes } => (peer, bytes),
                InboundEvent::Closed { channel } => {
                    return Err(TransportError::ChannelClosed { channel });
                }
            };

            let frame = match unpad(self.config.header_padding, &bytes) {
                Ok(frame) => frame,
                Err(error) => {
                    warn!("dropping frame from peer {}: {}", peer, error);
                    continue;
                }
            };
            if let Ok((header, _)) = read_frame(frame) {
                if header.sender_id != peer {
                    warn!(
                        "dropping frame from peer {} claiming to be {}",
                        peer, header.sender_id
                    );
                    continue;
                }
                if !header.is_for(local_user) {
                    debug!("dropping frame for peer {}", header.recipient_id);
                    continue;
                }
            }

            self.dispatcher.dispatch(&mut self.world, frame);
        }
        Ok(())
    }

    fn push_due(&self, now: Instant) -> bool {
        match self.last_push {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.config.tick_interval,
        }
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        let frames: Vec<OutgoingFrame> = self.world.outbox_mut().drain().collect();
        for frame in frames {
            let bytes = if self.config.header_padding > 0 {
                pad(self.config.header_padding, &frame.bytes).into_boxed_slice()
            } else {
                frame.bytes
            };
            match frame.channel {
                ChannelKind::Reliable => self.transport.send_reliable(frame.recipient, bytes)?,
                ChannelKind::Unordered => self.transport.send_unordered(bytes)?,
            }
        }
        Ok(())
    }

    fn fail(&mut self, error: TransportError, now: Instant, events: Vec<RoomEvent>) -> RoomError {
        warn!("transport failure, leaving room: {}", error);
        self.pending = events;
        self.begin_exit(now);
        self.advance_exit(now);
        RoomError::Transport(error)
    }

    fn begin_exit(&mut self, now: Instant) {
        info!("leaving room {}", self.command.address());
        self.pending.push(RoomEvent::ExitStarted);

        match self.world.announce_exit() {
            Ok(count) => debug!("queued {} exit frames", count),
            Err(error) => warn!("could not queue exit frames: {}", error),
        }
        if let Err(error) = self.flush() {
            warn!("exit frames not delivered: {}", error);
        }

        let cleared = self.world.clear_all();
        self.world.outbox_mut().clear();
        self.dispatcher.clear();
        self.scheduler.clear();
        self.interactables.clear();
        info!("cleared {} entities", cleared);

        self.transport.close_realtime();
        self.pending.push(RoomEvent::RealtimeClosed);
        self.phase = SessionPhase::RealtimeGrace {
            until: now + self.config.realtime_close_grace,
        };
    }

    fn advance_exit(&mut self, now: Instant) {
        loop {
            match self.phase {
                SessionPhase::RealtimeGrace { until } if now >= until => {
                    self.transport.close_signaling();
                    self.pending.push(RoomEvent::SignalingClosed);
                    info!("signaling channel closed");
                    self.phase = SessionPhase::SignalingGrace {
                        until: until + self.config.signaling_close_grace,
                    };
                }
                SessionPhase::SignalingGrace { until } if now >= until => {
                    self.pending.push(RoomEvent::Closed);
                    info!("room closed");
                    self.phase = SessionPhase::Closed;
                }
                _ => return,
            }
        }
    }

    /// Time left until the teardown finishes, if it is running
    pub fn exit_remaining(&self, now: Instant) -> Option<Duration> {
        match self.phase {
            SessionPhase::RealtimeGrace { until } => Some(
                until.saturating_duration_since(now) + self.config.signaling_close_grace,
            ),
            SessionPhase::SignalingGrace { until } => Some(until.saturating_duration_since(now)),
            _ => None,
        }
    }
}
