use std::time::Duration;

use log::info;

use crate::{
    messages::{
        error::PacketKindsError,
        packet::Packet,
        packet_kinds::{PacketKind, PacketKinds},
    },
    world::{
        component::{
            animator::{AnimatorReplica, AnimatorUpdate},
            transform::{TransformReplica, TransformUpdate},
        },
        replication::{OwnershipTransfer, Replicated},
        spawn::packets::{DestroyEntity, PeerLeft, SpawnEntity},
    },
};

pub mod error;
pub use error::ProtocolError;

// Protocol Plugin
pub trait ProtocolPlugin {
    fn build(&self, protocol: &mut Protocol);
}

// Protocol
pub struct Protocol {
    pub packet_kinds: PacketKinds,
    /// The duration between each tick
    pub tick_interval: Duration,
    locked: bool,
}

fn add_builtin_packets(kinds: &mut PacketKinds) -> Result<(), PacketKindsError> {
    kinds.add_packet::<TransformUpdate>()?;
    kinds.add_packet::<AnimatorUpdate>()?;
    kinds.add_packet::<OwnershipTransfer<TransformReplica>>()?;
    kinds.add_packet::<OwnershipTransfer<AnimatorReplica>>()?;
    kinds.add_packet::<SpawnEntity>()?;
    kinds.add_packet::<DestroyEntity>()?;
    kinds.add_packet::<PeerLeft>()?;
    Ok(())
}

impl Default for Protocol {
    fn default() -> Self {
        let mut packet_kinds = PacketKinds::new();
        if let Err(error) = add_builtin_packets(&mut packet_kinds) {
            panic!("built-in packet kinds are inconsistent: {}", error);
        }

        Self {
            packet_kinds,
            tick_interval: Duration::from_millis(50),
            locked: false,
        }
    }
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: ProtocolPlugin>(&mut self, plugin: P) -> &mut Self {
        self.check_lock();
        plugin.build(self);
        self
    }

    pub fn tick_interval(&mut self, duration: Duration) -> &mut Self {
        self.check_lock();
        self.tick_interval = duration;
        self
    }

    /// # Panics
    /// Panics if the protocol is locked or `P` collides with a registered kind
    pub fn add_packet<P: Packet>(&mut self) -> &mut Self {
        self.check_lock();
        if let Err(error) = self.packet_kinds.add_packet::<P>() {
            panic!("{}", error);
        }
        self
    }

    /// Registers the update and ownership packets of an application replica.
    ///
    /// # Panics
    /// Panics if the protocol is locked or either packet collides
    pub fn add_replica<R: Replicated>(&mut self) -> &mut Self {
        self.check_lock();
        if let Err(error) = self.try_add_replica::<R>() {
            panic!("{}", error);
        }
        self
    }

    // Non-panicking builder methods

    pub fn try_add_plugin<P: ProtocolPlugin>(
        &mut self,
        plugin: P,
    ) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        plugin.build(self);
        Ok(self)
    }

    pub fn try_tick_interval(&mut self, duration: Duration) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.tick_interval = duration;
        Ok(self)
    }

    pub fn try_add_packet<P: Packet>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        self.packet_kinds.add_packet::<P>()?;
        Ok(self)
    }

    pub fn try_add_replica<R: Replicated>(&mut self) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        // both or neither
        self.packet_kinds.check_packet::<R::Update>()?;
        self.packet_kinds.check_packet::<OwnershipTransfer<R>>()?;
        let update = PacketKind::of::<R::Update>();
        let transfer = PacketKind::of::<OwnershipTransfer<R>>();
        if update == transfer {
            return Err(PacketKindsError::Collision {
                kind: update,
                existing: <R::Update as Packet>::NAME,
                incoming: <OwnershipTransfer<R> as Packet>::NAME,
            }
            .into());
        }
        self.packet_kinds.add_packet::<R::Update>()?;
        self.packet_kinds.add_packet::<OwnershipTransfer<R>>()?;
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        info!("protocol locked with {} packet kinds", self.packet_kinds.len());
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
        info!("protocol locked with {} packet kinds", self.packet_kinds.len());
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked without panicking
    /// Returns Err if protocol is locked
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
