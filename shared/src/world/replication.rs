use std::{fmt, marker::PhantomData};

use log::{debug, trace};
use vrsync_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::{
    address::Address64,
    messages::{
        error::PacketKindsError, outbox::Outbox, packet::Packet, packet_kinds::PacketKinds,
    },
    types::{ChannelKind, UserId},
    world::registry::EntityRegistry,
};

/// A packet aimed at one entity.
pub trait AddressedPacket: Packet {
    fn address(&self) -> Address64;
}

/// State that one owner streams to every other peer.
pub trait Replicated: 'static {
    type Update: AddressedPacket;

    /// Seeds the packet kind of this replica's `OwnershipTransfer`
    const OWNERSHIP_SEED: &'static str;

    fn owner(&self) -> UserId;

    fn set_owner(&mut self, owner: UserId);

    /// Whether the next push pass should send this entity
    fn wants_push(&self) -> bool;

    fn snapshot(&self, address: Address64) -> Self::Update;

    /// Called after `snapshot` was queued for sending
    fn mark_pushed(&mut self);

    fn apply(&mut self, update: &Self::Update);

    fn address_of(update: &Self::Update) -> Address64 {
        update.address()
    }
}

/// Hands an entity of replica kind `R` to another user. Only the current
/// owner's transfer is honoured.
pub struct OwnershipTransfer<R> {
    pub address: Address64,
    pub new_owner: UserId,
    replica: PhantomData<fn() -> R>,
}

impl<R> OwnershipTransfer<R> {
    pub fn new(address: Address64, new_owner: UserId) -> Self {
        Self {
            address,
            new_owner,
            replica: PhantomData,
        }
    }
}

impl<R> Clone for OwnershipTransfer<R> {
    fn clone(&self) -> Self {
        Self::new(self.address, self.new_owner)
    }
}

impl<R> PartialEq for OwnershipTransfer<R> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.new_owner == other.new_owner
    }
}

impl<R> fmt::Debug for OwnershipTransfer<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnershipTransfer")
            .field("address", &self.address)
            .field("new_owner", &self.new_owner)
            .finish()
    }
}

impl<R> Serde for OwnershipTransfer<R> {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.address.ser(writer);
        self.new_owner.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let address = Address64::de(reader)?;
        let new_owner = UserId::de(reader)?;
        Ok(Self::new(address, new_owner))
    }

    fn bit_length(&self) -> u32 {
        self.address.bit_length() + self.new_owner.bit_length()
    }
}

impl<R: Replicated> Packet for OwnershipTransfer<R> {
    const NAME: &'static str = "vrsync::OwnershipTransfer";
    const SEED: Option<&'static str> = Some(R::OWNERSHIP_SEED);
}

impl<R: Replicated> AddressedPacket for OwnershipTransfer<R> {
    fn address(&self) -> Address64 {
        self.address
    }
}

/// Result of applying a received update or transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Target not registered here (not spawned yet, or already gone)
    UnknownAddress,
    /// Sender does not own the target
    NotOwner { owner: UserId, sender: UserId },
}

/// Decides which local entities push state, and whether received state is
/// accepted.
pub struct ReplicationManager {
    local_user: UserId,
}

impl ReplicationManager {
    pub fn new(local_user: UserId) -> Self {
        Self { local_user }
    }

    pub fn local_user(&self) -> UserId {
        self.local_user
    }

    pub fn is_owner<R: Replicated>(&self, replica: &R) -> bool {
        replica.owner() == self.local_user
    }

    /// Snapshot of one entity, if it is registered, owned here and flagged.
    pub fn push_entity<R: Replicated>(
        &self,
        registry: &mut EntityRegistry<Address64, R>,
        address: &Address64,
    ) -> Option<R::Update> {
        let replica = registry.get_mut(address)?;
        self.take_update(*address, replica)
    }

    /// Snapshots of every owned, flagged entity in `registry`
    pub fn collect_updates<R: Replicated>(
        &self,
        registry: &mut EntityRegistry<Address64, R>,
    ) -> Vec<R::Update> {
        registry
            .iter_mut()
            .filter_map(|(address, replica)| self.take_update(*address, replica))
            .collect()
    }

    /// Broadcasts this tick's updates on the unordered channel. Returns how
    /// many frames were queued.
    pub fn push_all<R: Replicated>(
        &self,
        registry: &mut EntityRegistry<Address64, R>,
        outbox: &mut Outbox,
        kinds: &PacketKinds,
    ) -> Result<usize, PacketKindsError> {
        let updates = self.collect_updates(registry);
        for update in &updates {
            outbox.broadcast(kinds, ChannelKind::Unordered, update)?;
        }
        Ok(updates.len())
    }

    fn take_update<R: Replicated>(&self, address: Address64, replica: &mut R) -> Option<R::Update> {
        if !self.is_owner(replica) || !replica.wants_push() {
            return None;
        }
        let update = replica.snapshot(address);
        replica.mark_pushed();
        Some(update)
    }

    /// Applies `update` from `sender` if the sender owns its target.
    pub fn apply<R: Replicated>(
        &self,
        registry: &mut EntityRegistry<Address64, R>,
        sender: UserId,
        update: &R::Update,
    ) -> ApplyOutcome {
        let address = R::address_of(update);
        let Some(replica) = registry.get_mut(&address) else {
            trace!("update for unknown address {} dropped", address);
            return ApplyOutcome::UnknownAddress;
        };

        let owner = replica.owner();
        if owner != sender {
            debug!(
                "ignoring update for {} from user {}, owned by {}",
                address, sender, owner
            );
            return ApplyOutcome::NotOwner { owner, sender };
        }

        replica.apply(update);
        ApplyOutcome::Applied
    }

    /// Gives a locally owned entity to `new_owner`, returning the packet to
    /// send. `None` if the entity is unknown or owned elsewhere.
    pub fn transfer_ownership<R: Replicated>(
        &self,
        registry: &mut EntityRegistry<Address64, R>,
        address: &Address64,
        new_owner: UserId,
    ) -> Option<OwnershipTransfer<R>> {
        let replica = registry.get_mut(address)?;
        if !self.is_owner(replica) {
            debug!("cannot hand off {}, owned by {}", address, replica.owner());
            return None;
        }
        replica.set_owner(new_owner);
        Some(OwnershipTransfer::new(*address, new_owner))
    }

    pub fn apply_ownership<R: Replicated>(
        &self,
        registry: &mut EntityRegistry<Address64, R>,
        sender: UserId,
        transfer: &OwnershipTransfer<R>,
    ) -> ApplyOutcome {
        let Some(replica) = registry.get_mut(&transfer.address) else {
            trace!("ownership transfer for unknown address {} dropped", transfer.address);
            return ApplyOutcome::UnknownAddress;
        };

        let owner = replica.owner();
        if owner != sender {
            debug!(
                "user {} tried to hand off {}, owned by {}",
                sender, transfer.address, owner
            );
            return ApplyOutcome::NotOwner { owner, sender };
        }

        replica.set_owner(transfer.new_owner);
        ApplyOutcome::Applied
    }
}
