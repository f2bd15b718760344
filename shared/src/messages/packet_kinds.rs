use std::{any::TypeId, collections::HashMap, fmt};

use log::debug;
use vrsync_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

use crate::{
    digest::{digest32, digest32_parts},
    messages::{error::PacketKindsError, packet::Packet},
};

/// Stable id of a packet shape, identical on every peer that knows the type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketKind(u32);

impl PacketKind {
    /// Hashes `qualified_name`, followed by `seed` when one is given
    pub fn derive(qualified_name: &str, seed: Option<&str>) -> Self {
        let value = match seed {
            Some(seed) => digest32_parts(&[qualified_name.as_bytes(), seed.as_bytes()]),
            None => digest32(qualified_name.as_bytes()),
        };
        Self(value)
    }

    pub fn of<P: Packet>() -> Self {
        Self::derive(P::NAME, P::SEED)
    }

    pub fn from_u32(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl Serde for PacketKind {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(u32::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for PacketKind {
    fn const_bit_length() -> u32 {
        <u32 as ConstBitLength>::const_bit_length()
    }
}

/// Table of registered packet types, built once at startup.
#[derive(Clone, Default)]
pub struct PacketKinds {
    type_to_kind: HashMap<TypeId, PacketKind>,
    kind_to_name: HashMap<PacketKind, &'static str>,
}

impl PacketKinds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `P`, returning its kind. Adding the same type twice is
    /// harmless; two different types with the same kind are rejected.
    pub fn add_packet<P: Packet>(&mut self) -> Result<PacketKind, PacketKindsError> {
        let type_id = TypeId::of::<P>();
        if let Some(kind) = self.type_to_kind.get(&type_id) {
            return Ok(*kind);
        }

        self.check_packet::<P>()?;
        let kind = PacketKind::of::<P>();

        debug!("registered packet {} as kind {}", P::NAME, kind);
        self.type_to_kind.insert(type_id, kind);
        self.kind_to_name.insert(kind, P::NAME);
        Ok(kind)
    }

    /// Whether `add_packet::<P>()` would succeed, without registering it
    pub fn check_packet<P: Packet>(&self) -> Result<(), PacketKindsError> {
        if self.type_to_kind.contains_key(&TypeId::of::<P>()) {
            return Ok(());
        }
        let kind = PacketKind::of::<P>();
        match self.kind_to_name.get(&kind) {
            Some(existing) => Err(PacketKindsError::Collision {
                kind,
                existing,
                incoming: P::NAME,
            }),
            None => Ok(()),
        }
    }

    pub fn kind_of<P: Packet>(&self) -> Result<PacketKind, PacketKindsError> {
        self.type_to_kind
            .get(&TypeId::of::<P>())
            .copied()
            .ok_or(PacketKindsError::NotRegistered { name: P::NAME })
    }

    pub fn name_of(&self, kind: &PacketKind) -> Option<&'static str> {
        self.kind_to_name.get(kind).copied()
    }

    pub fn contains(&self, kind: &PacketKind) -> bool {
        self.kind_to_name.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.kind_to_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kind_to_name.is_empty()
    }
}
