use std::collections::BTreeMap;

use vrsync_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedInteger};

use crate::{
    address::Address64,
    digest::digest32,
    messages::packet::Packet,
    types::UserId,
    world::replication::{AddressedPacket, Replicated},
};

/// Hashed animator parameter name, shared by every peer.
pub fn parameter_id(name: &str) -> u32 {
    digest32(name.as_bytes())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimatorValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    /// One-shot; fires once on every receiver
    Trigger,
}

impl Serde for AnimatorValue {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let tag: u8 = match self {
            AnimatorValue::Float(_) => 0,
            AnimatorValue::Int(_) => 1,
            AnimatorValue::Bool(_) => 2,
            AnimatorValue::Trigger => 3,
        };
        UnsignedInteger::<2>::new(tag).ser(writer);
        match self {
            AnimatorValue::Float(value) => value.ser(writer),
            AnimatorValue::Int(value) => value.ser(writer),
            AnimatorValue::Bool(value) => value.ser(writer),
            AnimatorValue::Trigger => {}
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match UnsignedInteger::<2>::de(reader)?.get() {
            0 => Ok(AnimatorValue::Float(f32::de(reader)?)),
            1 => Ok(AnimatorValue::Int(i32::de(reader)?)),
            2 => Ok(AnimatorValue::Bool(bool::de(reader)?)),
            _ => Ok(AnimatorValue::Trigger),
        }
    }

    fn bit_length(&self) -> u32 {
        2 + match self {
            AnimatorValue::Float(_) | AnimatorValue::Int(_) => 32,
            AnimatorValue::Bool(_) => 1,
            AnimatorValue::Trigger => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatorParameter {
    pub id: u32,
    pub value: AnimatorValue,
}

impl Serde for AnimatorParameter {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.id.ser(writer);
        self.value.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let id = u32::de(reader)?;
        let value = AnimatorValue::de(reader)?;
        Ok(Self { id, value })
    }

    fn bit_length(&self) -> u32 {
        32 + self.value.bit_length()
    }
}

/// Received triggers kept for `take_triggers`; older ones are dropped first
pub const MAX_FIRED_TRIGGERS: usize = 64;

/// Animator parameters of one entity. The owner pushes only after a
/// parameter changed; every push carries the full parameter set so a missed
/// frame heals on the next change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimatorReplica {
    owner: UserId,
    parameters: BTreeMap<u32, AnimatorValue>,
    pending_triggers: Vec<u32>,
    fired_triggers: Vec<u32>,
    dirty: bool,
}

impl AnimatorReplica {
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            ..Self::default()
        }
    }

    fn set(&mut self, id: u32, value: AnimatorValue) {
        if self.parameters.get(&id) != Some(&value) {
            self.parameters.insert(id, value);
            self.dirty = true;
        }
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.set(parameter_id(name), AnimatorValue::Float(value));
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.set(parameter_id(name), AnimatorValue::Int(value));
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.set(parameter_id(name), AnimatorValue::Bool(value));
    }

    pub fn set_trigger(&mut self, name: &str) {
        self.pending_triggers.push(parameter_id(name));
        self.dirty = true;
    }

    pub fn get(&self, name: &str) -> Option<AnimatorValue> {
        self.get_by_id(parameter_id(name))
    }

    pub fn get_by_id(&self, id: u32) -> Option<AnimatorValue> {
        self.parameters.get(&id).copied()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Triggers received since the last call, in arrival order. At most
    /// `MAX_FIRED_TRIGGERS` of the newest are kept.
    pub fn take_triggers(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.fired_triggers)
    }
}

impl Replicated for AnimatorReplica {
    type Update = AnimatorUpdate;

    const OWNERSHIP_SEED: &'static str = "Animator";

    fn owner(&self) -> UserId {
        self.owner
    }

    fn set_owner(&mut self, owner: UserId) {
        self.owner = owner;
    }

    fn wants_push(&self) -> bool {
        self.dirty
    }

    fn snapshot(&self, address: Address64) -> AnimatorUpdate {
        let mut parameters: Vec<AnimatorParameter> = self
            .parameters
            .iter()
            .map(|(id, value)| AnimatorParameter {
                id: *id,
                value: *value,
            })
            .collect();
        parameters.extend(self.pending_triggers.iter().map(|id| AnimatorParameter {
            id: *id,
            value: AnimatorValue::Trigger,
        }));
        AnimatorUpdate {
            address,
            parameters,
        }
    }

    fn mark_pushed(&mut self) {
        self.pending_triggers.clear();
        self.dirty = false;
    }

    fn apply(&mut self, update: &AnimatorUpdate) {
        for parameter in &update.parameters {
            match parameter.value {
                AnimatorValue::Trigger => self.fired_triggers.push(parameter.id),
                value => {
                    self.parameters.insert(parameter.id, value);
                }
            }
        }
        let overflow = self.fired_triggers.len().saturating_sub(MAX_FIRED_TRIGGERS);
        if overflow > 0 {
            self.fired_triggers.drain(..overflow);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimatorUpdate {
    pub address: Address64,
    pub parameters: Vec<AnimatorParameter>,
}

impl Serde for AnimatorUpdate {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.address.ser(writer);
        self.parameters.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let address = Address64::de(reader)?;
        let parameters = Vec::<AnimatorParameter>::de(reader)?;
        Ok(Self {
            address,
            parameters,
        })
    }

    fn bit_length(&self) -> u32 {
        self.address.bit_length() + self.parameters.bit_length()
    }
}

impl Packet for AnimatorUpdate {
    const NAME: &'static str = "vrsync::AnimatorUpdate";
}

impl AddressedPacket for AnimatorUpdate {
    fn address(&self) -> Address64 {
        self.address
    }
}
