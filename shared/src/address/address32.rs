use std::{
    fmt,
    hash::{Hash, Hasher},
};

use vrsync_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

use super::{error::AddressError, NetAddress};
use crate::digest::digest32;

/// A 4-byte address. The hash is private and recomputed on every write, so it
/// can never disagree with the bytes.
#[derive(Clone, Copy)]
pub struct Address32 {
    bytes: [u8; 4],
    hash: u32,
}

impl Address32 {
    pub fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self::from_bytes([a, b, c, d])
    }

    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            bytes,
            hash: digest32(&bytes),
        }
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; 4] = bytes.try_into().map_err(|_| AddressError::InvalidLength {
            expected: 4,
            actual: bytes.len(),
        })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Big endian, so `Address32::new(0, 0, 0, 1) == Address32::from_u32(1)`
    pub fn from_u32(value: u32) -> Self {
        Self::from_bytes(value.to_be_bytes())
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(self.bytes)
    }

    pub fn bytes(&self) -> [u8; 4] {
        self.bytes
    }

    pub fn byte(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    pub fn set_byte(&mut self, index: usize, value: u8) -> Result<(), AddressError> {
        let Some(byte) = self.bytes.get_mut(index) else {
            return Err(AddressError::IndexOutOfRange { index, width: 4 });
        };
        *byte = value;
        self.rehash();
        Ok(())
    }

    pub fn update(&mut self, bytes: [u8; 4]) {
        self.bytes = bytes;
        self.rehash();
    }

    pub fn digest(&self) -> u32 {
        self.hash
    }

    fn rehash(&mut self) {
        self.hash = digest32(&self.bytes);
    }
}

impl PartialEq for Address32 {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Address32 {}

impl Hash for Address32 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash);
    }
}

impl fmt::Debug for Address32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address32({})", self)
    }
}

impl fmt::Display for Address32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.bytes))
    }
}

impl NetAddress for Address32 {
    const WIDTH: usize = 4;

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn digest(&self) -> u32 {
        self.hash
    }
}

impl Serde for Address32 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bytes(&self.bytes);
    }

    // the hash is rebuilt locally, never read from the wire
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self::from_bytes(<[u8; 4]>::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for Address32 {
    fn const_bit_length() -> u32 {
        32
    }
}
