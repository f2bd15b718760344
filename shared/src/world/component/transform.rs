use glam::{Quat, Vec3};
use vrsync_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::{
    address::Address64,
    messages::packet::Packet,
    types::UserId,
    world::replication::{AddressedPacket, Replicated},
};

/// Position, rotation and scale of a scene object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

fn ser_vec3(value: Vec3, writer: &mut dyn BitWrite) {
    value.x.ser(writer);
    value.y.ser(writer);
    value.z.ser(writer);
}

fn de_vec3(reader: &mut BitReader) -> Result<Vec3, SerdeErr> {
    Ok(Vec3::new(f32::de(reader)?, f32::de(reader)?, f32::de(reader)?))
}

impl Serde for Transform {
    fn ser(&self, writer: &mut dyn BitWrite) {
        ser_vec3(self.position, writer);
        for component in self.rotation.to_array() {
            component.ser(writer);
        }
        ser_vec3(self.scale, writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let position = de_vec3(reader)?;
        let mut rotation = [0.0f32; 4];
        for component in rotation.iter_mut() {
            *component = f32::de(reader)?;
        }
        let scale = de_vec3(reader)?;
        Ok(Self {
            position,
            rotation: Quat::from_array(rotation),
            scale,
        })
    }

    fn bit_length(&self) -> u32 {
        10 * 32
    }
}

/// Transform of a registered scene object, streamed by its owner every tick
/// while sync is enabled.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformReplica {
    owner: UserId,
    transform: Transform,
    sync_enabled: bool,
}

impl TransformReplica {
    pub fn new(owner: UserId, transform: Transform) -> Self {
        Self {
            owner,
            transform,
            sync_enabled: true,
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync_enabled
    }

    pub fn set_sync(&mut self, enabled: bool) {
        self.sync_enabled = enabled;
    }
}

impl Replicated for TransformReplica {
    type Update = TransformUpdate;

    const OWNERSHIP_SEED: &'static str = "Transform";

    fn owner(&self) -> UserId {
        self.owner
    }

    fn set_owner(&mut self, owner: UserId) {
        self.owner = owner;
    }

    fn wants_push(&self) -> bool {
        self.sync_enabled
    }

    fn snapshot(&self, address: Address64) -> TransformUpdate {
        TransformUpdate {
            address,
            transform: self.transform,
        }
    }

    // continuous stream, nothing to reset
    fn mark_pushed(&mut self) {}

    fn apply(&mut self, update: &TransformUpdate) {
        self.transform = update.transform;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransformUpdate {
    pub address: Address64,
    pub transform: Transform,
}

impl Serde for TransformUpdate {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.address.ser(writer);
        self.transform.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let address = Address64::de(reader)?;
        let transform = Transform::de(reader)?;
        Ok(Self { address, transform })
    }

    fn bit_length(&self) -> u32 {
        self.address.bit_length() + self.transform.bit_length()
    }
}

impl Packet for TransformUpdate {
    const NAME: &'static str = "vrsync::TransformUpdate";
}

impl AddressedPacket for TransformUpdate {
    fn address(&self) -> Address64 {
        self.address
    }
}
