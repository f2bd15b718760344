use std::collections::HashSet;

use log::{debug, info, warn};

use crate::{
    address::{Address32, Address64, AddressGenerator},
    messages::{
        dispatcher::Dispatcher,
        error::{DispatchError, PacketKindsError},
        outbox::Outbox,
        packet::Packet,
        packet_kinds::PacketKinds,
    },
    types::{ChannelKind, UserId},
    world::{
        component::{
            animator::{AnimatorReplica, AnimatorUpdate},
            transform::{Transform, TransformReplica, TransformUpdate},
        },
        registry::EntityRegistry,
        replication::{ApplyOutcome, OwnershipTransfer, Replicated, ReplicationManager},
        spawn::{
            coordinator::{Instantiator, SpawnCoordinator, SpawnOutcome, SpawnState},
            error::SpawnError,
            packets::{DestroyEntity, PeerLeft, SpawnEntity},
            store::{ElementRef, Store},
        },
    },
};

/// Something that happened to the room's entities during dispatch or a
/// local call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldEvent {
    Spawned {
        address: Address64,
        element: String,
        owner: UserId,
    },
    Destroyed {
        address: Address64,
    },
    OwnershipChanged {
        address: Address64,
        owner: UserId,
    },
    PeerLeft {
        user: UserId,
    },
}

/// Everything one room session replicates. Dropped or cleared on exit, so
/// nothing survives into the next session.
pub struct RoomWorld<I: Instantiator> {
    kinds: PacketKinds,
    local_user: UserId,
    generator: AddressGenerator,
    replication: ReplicationManager,
    transforms: EntityRegistry<Address64, TransformReplica>,
    animators: EntityRegistry<Address64, AnimatorReplica>,
    spawner: SpawnCoordinator<I::Instance>,
    store: Store,
    instantiator: I,
    outbox: Outbox,
    events: Vec<WorldEvent>,
}

impl<I: Instantiator> RoomWorld<I> {
    pub fn new(
        kinds: PacketKinds,
        local_user: UserId,
        session: Address32,
        store: Store,
        instantiator: I,
    ) -> Self {
        Self {
            kinds,
            local_user,
            generator: AddressGenerator::new(session),
            replication: ReplicationManager::new(local_user),
            transforms: EntityRegistry::new(),
            animators: EntityRegistry::new(),
            spawner: SpawnCoordinator::new(local_user),
            store,
            instantiator,
            outbox: Outbox::new(local_user),
            events: Vec::new(),
        }
    }

    pub fn local_user(&self) -> UserId {
        self.local_user
    }

    pub fn kinds(&self) -> &PacketKinds {
        &self.kinds
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn instantiator(&self) -> &I {
        &self.instantiator
    }

    pub fn instantiator_mut(&mut self) -> &mut I {
        &mut self.instantiator
    }

    pub fn generator_mut(&mut self) -> &mut AddressGenerator {
        &mut self.generator
    }

    /// A fresh address in this session's scope
    pub fn generate_address(&mut self) -> Address64 {
        self.generator.generate()
    }

    pub fn transforms(&self) -> &EntityRegistry<Address64, TransformReplica> {
        &self.transforms
    }

    pub fn transforms_mut(&mut self) -> &mut EntityRegistry<Address64, TransformReplica> {
        &mut self.transforms
    }

    pub fn animators(&self) -> &EntityRegistry<Address64, AnimatorReplica> {
        &self.animators
    }

    pub fn animators_mut(&mut self) -> &mut EntityRegistry<Address64, AnimatorReplica> {
        &mut self.animators
    }

    pub fn spawner(&self) -> &SpawnCoordinator<I::Instance> {
        &self.spawner
    }

    pub fn outbox_mut(&mut self) -> &mut Outbox {
        &mut self.outbox
    }

    /// Distinct addresses known to any registry
    pub fn entity_count(&self) -> usize {
        let mut addresses: HashSet<Address64> = self.transforms.addresses().into_iter().collect();
        addresses.extend(self.animators.addresses());
        addresses.extend(self.spawner.addresses());
        addresses.len()
    }

    pub fn take_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    /// Wires the built-in packets to this world's registries.
    pub fn register_handlers(
        dispatcher: &mut Dispatcher<Self>,
        kinds: &PacketKinds,
    ) -> Result<(), PacketKindsError>
    where
        I: 'static,
    {
        dispatcher.register_packet::<TransformUpdate, _>(kinds, |world, header, update| {
            world
                .replication
                .apply(&mut world.transforms, header.sender_id, &update);
            Ok(())
        })?;

        dispatcher.register_packet::<AnimatorUpdate, _>(kinds, |world, header, update| {
            world
                .replication
                .apply(&mut world.animators, header.sender_id, &update);
            Ok(())
        })?;

        dispatcher.register_packet::<OwnershipTransfer<TransformReplica>, _>(
            kinds,
            |world, header, transfer| {
                let outcome = world.replication.apply_ownership(
                    &mut world.transforms,
                    header.sender_id,
                    &transfer,
                );
                world.ownership_applied(outcome, transfer.address, transfer.new_owner);
                Ok(())
            },
        )?;

        dispatcher.register_packet::<OwnershipTransfer<AnimatorReplica>, _>(
            kinds,
            |world, header, transfer| {
                let outcome = world.replication.apply_ownership(
                    &mut world.animators,
                    header.sender_id,
                    &transfer,
                );
                world.ownership_applied(outcome, transfer.address, transfer.new_owner);
                Ok(())
            },
        )?;

        dispatcher.register_packet::<SpawnEntity, _>(kinds, |world, header, packet| {
            if packet.owner != header.sender_id {
                return Err(DispatchError::Rejected {
                    packet: SpawnEntity::NAME,
                    reason: format!(
                        "user {} cannot spawn on behalf of user {}",
                        header.sender_id, packet.owner
                    ),
                });
            }
            let outcome = world
                .spawner
                .apply_spawn(&world.store, &mut world.instantiator, &packet)
                .map_err(|error| DispatchError::Rejected {
                    packet: SpawnEntity::NAME,
                    reason: error.to_string(),
                })?;
            if outcome == SpawnOutcome::Spawned {
                world.track_spawned(packet.address, packet.owner, packet.transform);
                world.spawned_event(packet.address);
            }
            Ok(())
        })?;

        dispatcher.register_packet::<DestroyEntity, _>(kinds, |world, header, packet| {
            if !world.may_destroy(&packet.address, header.sender_id) {
                return Err(DispatchError::Rejected {
                    packet: DestroyEntity::NAME,
                    reason: format!(
                        "user {} does not own {}",
                        header.sender_id, packet.address
                    ),
                });
            }
            if world.spawner.apply_destroy(&mut world.instantiator, &packet) {
                world.forget(&packet.address);
                world.events.push(WorldEvent::Destroyed {
                    address: packet.address,
                });
            }
            Ok(())
        })?;

        dispatcher.register_packet::<PeerLeft, _>(kinds, |world, header, packet| {
            if packet.user != header.sender_id {
                return Err(DispatchError::Rejected {
                    packet: PeerLeft::NAME,
                    reason: format!(
                        "user {} cannot announce the exit of user {}",
                        header.sender_id, packet.user
                    ),
                });
            }
            world.peer_left(packet.user);
            Ok(())
        })?;

        Ok(())
    }

    fn ownership_applied(&mut self, outcome: ApplyOutcome, address: Address64, owner: UserId) {
        if outcome == ApplyOutcome::Applied {
            self.events
                .push(WorldEvent::OwnershipChanged { address, owner });
        }
    }

    fn spawned_event(&mut self, address: Address64) {
        if let Some(entity) = self.spawner.get(&address) {
            self.events.push(WorldEvent::Spawned {
                address,
                element: entity.element.clone(),
                owner: entity.owner,
            });
        }
    }

    /// Spawned entities carry a transform replica owned by their spawner.
    /// An earlier registration at the same address wins.
    fn track_spawned(&mut self, address: Address64, owner: UserId, transform: Transform) {
        self.transforms
            .register(address, TransformReplica::new(owner, transform));
    }

    /// Drops every replica at a destroyed address so nothing more is pushed
    /// or applied for it.
    fn forget(&mut self, address: &Address64) {
        self.transforms.unregister(address);
        self.animators.unregister(address);
    }

    /// The spawning user, or whoever holds the transform now. Destroys for
    /// addresses this peer never saw spawned are let through so they leave a
    /// tombstone.
    fn may_destroy(&self, address: &Address64, sender: UserId) -> bool {
        let Some(entity) = self.spawner.get(address) else {
            return true;
        };
        let allowed = entity.owner == sender
            || self
                .transforms
                .get(address)
                .is_some_and(|replica| replica.owner() == sender);
        if !allowed {
            warn!("user {} tried to destroy {} owned by {}", sender, address, entity.owner);
        }
        allowed
    }

    fn peer_left(&mut self, user: UserId) {
        info!("user {} left the room", user);
        // their destroys may have been lost with the connection
        for address in self.spawner.owned_by(user) {
            if self.spawner.destroy_local(&mut self.instantiator, &address) {
                self.forget(&address);
                self.events.push(WorldEvent::Destroyed { address });
            }
        }
        self.events.push(WorldEvent::PeerLeft { user });
    }

    /// Spawns `element` at a new address owned by `owner`, announcing it to
    /// every peer when `broadcast` is set.
    pub fn spawn(
        &mut self,
        element: ElementRef,
        owner: UserId,
        transform: Transform,
        broadcast: bool,
    ) -> Result<Address64, SpawnError> {
        let address = self.generator.generate();
        self.spawn_at(element, owner, address, transform, broadcast)?;
        Ok(address)
    }

    /// Like `spawn`, with a caller-chosen address
    pub fn spawn_at(
        &mut self,
        element: ElementRef,
        owner: UserId,
        address: Address64,
        transform: Transform,
        broadcast: bool,
    ) -> Result<(), SpawnError> {
        let packet = self.spawner.request_spawn(
            &self.store,
            &mut self.instantiator,
            element,
            owner,
            address,
            transform,
            broadcast,
        )?;
        if let Some(packet) = packet {
            self.outbox
                .broadcast(&self.kinds, ChannelKind::Reliable, &packet)?;
        }
        self.track_spawned(address, owner, transform);
        self.spawned_event(address);
        Ok(())
    }

    /// Destroys a spawned entity. Returns false if it was not spawned.
    pub fn destroy(&mut self, address: &Address64, broadcast: bool) -> Result<bool, SpawnError> {
        if self.spawner.state(address) != SpawnState::Spawned {
            return Ok(false);
        }
        let packet = self
            .spawner
            .request_destroy(&mut self.instantiator, address, broadcast);
        self.forget(address);
        if let Some(packet) = packet {
            self.outbox
                .broadcast(&self.kinds, ChannelKind::Reliable, &packet)?;
        }
        self.events.push(WorldEvent::Destroyed { address: *address });
        Ok(true)
    }

    /// Hands a locally owned transform to `new_owner` and tells every peer.
    pub fn transfer_transform(
        &mut self,
        address: &Address64,
        new_owner: UserId,
    ) -> Result<bool, PacketKindsError> {
        let Some(transfer) =
            self.replication
                .transfer_ownership(&mut self.transforms, address, new_owner)
        else {
            return Ok(false);
        };
        self.outbox
            .broadcast(&self.kinds, ChannelKind::Reliable, &transfer)?;
        self.events.push(WorldEvent::OwnershipChanged {
            address: *address,
            owner: new_owner,
        });
        Ok(true)
    }

    pub fn transfer_animator(
        &mut self,
        address: &Address64,
        new_owner: UserId,
    ) -> Result<bool, PacketKindsError> {
        let Some(transfer) =
            self.replication
                .transfer_ownership(&mut self.animators, address, new_owner)
        else {
            return Ok(false);
        };
        self.outbox
            .broadcast(&self.kinds, ChannelKind::Reliable, &transfer)?;
        self.events.push(WorldEvent::OwnershipChanged {
            address: *address,
            owner: new_owner,
        });
        Ok(true)
    }

    /// One replication pass over transforms and animators. Returns how many
    /// updates were queued.
    pub fn push(&mut self) -> Result<usize, PacketKindsError> {
        let transforms =
            self.replication
                .push_all(&mut self.transforms, &mut self.outbox, &self.kinds)?;
        let animators =
            self.replication
                .push_all(&mut self.animators, &mut self.outbox, &self.kinds)?;
        Ok(transforms + animators)
    }

    /// Queues destroys for every spawned entity this user owns, then a
    /// `PeerLeft`. Returns how many frames were queued.
    pub fn announce_exit(&mut self) -> Result<usize, PacketKindsError> {
        let owned = self.spawner.owned_by(self.local_user);
        let mut queued = 0;
        for address in owned {
            if let Some(packet) =
                self.spawner
                    .request_destroy(&mut self.instantiator, &address, true)
            {
                self.forget(&address);
                self.outbox
                    .broadcast(&self.kinds, ChannelKind::Reliable, &packet)?;
                queued += 1;
            }
        }
        self.outbox.broadcast(
            &self.kinds,
            ChannelKind::Reliable,
            &PeerLeft {
                user: self.local_user,
            },
        )?;
        Ok(queued + 1)
    }

    /// Empties every registry, disposing spawned instances. Queued frames
    /// stay in the outbox.
    pub fn clear_all(&mut self) -> usize {
        let cleared = self.transforms.clear_all()
            + self.animators.clear_all()
            + self.spawner.clear_all(&mut self.instantiator);
        self.events.clear();
        debug!("cleared {} entities", cleared);
        cleared
    }
}
