use vrsync_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::{
    address::Address64,
    messages::packet::Packet,
    types::UserId,
    world::{component::transform::Transform, spawn::store::ElementRef},
};

/// Asks every receiver to instantiate `element` under `address`.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnEntity {
    pub address: Address64,
    pub element: ElementRef,
    pub owner: UserId,
    pub transform: Transform,
}

impl Serde for SpawnEntity {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.address.ser(writer);
        self.element.ser(writer);
        self.owner.ser(writer);
        self.transform.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let address = Address64::de(reader)?;
        let element = ElementRef::de(reader)?;
        let owner = UserId::de(reader)?;
        let transform = Transform::de(reader)?;
        Ok(Self {
            address,
            element,
            owner,
            transform,
        })
    }

    fn bit_length(&self) -> u32 {
        self.address.bit_length()
            + self.element.bit_length()
            + self.owner.bit_length()
            + self.transform.bit_length()
    }
}

impl Packet for SpawnEntity {
    const NAME: &'static str = "vrsync::SpawnEntity";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestroyEntity {
    pub address: Address64,
}

impl Serde for DestroyEntity {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.address.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            address: Address64::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.address.bit_length()
    }
}

impl Packet for DestroyEntity {
    const NAME: &'static str = "vrsync::DestroyEntity";
}

/// Last word of a user leaving the room
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerLeft {
    pub user: UserId,
}

impl Serde for PeerLeft {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.user.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            user: UserId::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.user.bit_length()
    }
}

impl Packet for PeerLeft {
    const NAME: &'static str = "vrsync::PeerLeft";
}
