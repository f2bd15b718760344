//! # vrsync Shared
//! Replication substrate shared by every peer in a room: addressing, packet
//! framing, dispatch, entity registries, ownership-gated replication and the
//! spawn/destroy protocol.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use vrsync_serde::{
    BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, UnsignedInteger,
    UnsignedVariableInteger,
};

mod address;
mod connection;
mod digest;
mod messages;
mod protocol;
mod types;
mod world;

pub use address::{Address32, Address64, AddressError, AddressGenerator, NetAddress};
pub use connection::{
    decoder::{read_frame, read_payload, unmarshal, unpad},
    encoder::{encode_payload, marshal, pad, write_frame, TRANSPORT_PREFIX_LEN},
    error::DecodeError,
    frame_header::FrameHeader,
};
pub use digest::{digest32, digest32_parts, digest_hex};
pub use messages::{
    dispatcher::{DispatchOutcome, DispatchStats, Dispatcher, Handler},
    error::{DispatchError, PacketKindsError},
    outbox::{OutgoingFrame, Outbox},
    packet::Packet,
    packet_kinds::{PacketKind, PacketKinds},
};
pub use protocol::{Protocol, ProtocolError, ProtocolPlugin};
pub use types::{ChannelKind, PeerId, UserId, BROADCAST};
pub use world::{
    component::{
        animator::{
            parameter_id, AnimatorParameter, AnimatorReplica, AnimatorUpdate, AnimatorValue,
            MAX_FIRED_TRIGGERS,
        },
        transform::{Transform, TransformReplica, TransformUpdate},
    },
    registry::EntityRegistry,
    replication::{AddressedPacket, ApplyOutcome, OwnershipTransfer, ReplicationManager, Replicated},
    room_world::{RoomWorld, WorldEvent},
    spawn::{
        coordinator::{Instantiator, SpawnCoordinator, SpawnOutcome, SpawnState, SpawnedEntity},
        error::SpawnError,
        packets::{DestroyEntity, PeerLeft, SpawnEntity},
        store::{ElementRef, PrefabRef, Store, StoreElement, StoreError},
    },
};

pub use glam::{Quat, Vec3};
