use std::{
    fmt,
    hash::{Hash, Hasher},
};

use vrsync_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

use super::{address32::Address32, error::AddressError, NetAddress};
use crate::digest::digest32;

/// An 8-byte address made of two independently updatable halves: the upper
/// half scopes the session, the lower half the object within it.
#[derive(Clone, Copy)]
pub struct Address64 {
    bytes: [u8; 8],
    hash: u32,
}

impl Address64 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(a: u8, b: u8, c: u8, d: u8, e: u8, f: u8, g: u8, h: u8) -> Self {
        Self::from_bytes([a, b, c, d, e, f, g, h])
    }

    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self {
            bytes,
            hash: digest32(&bytes),
        }
    }

    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; 8] = bytes.try_into().map_err(|_| AddressError::InvalidLength {
            expected: 8,
            actual: bytes.len(),
        })?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn from_halves(upper: Address32, lower: Address32) -> Self {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&upper.bytes());
        bytes[4..].copy_from_slice(&lower.bytes());
        Self::from_bytes(bytes)
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_bytes(value.to_be_bytes())
    }

    pub fn to_u64(&self) -> u64 {
        u64::from_be_bytes(self.bytes)
    }

    pub fn bytes(&self) -> [u8; 8] {
        self.bytes
    }

    pub fn byte(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// The session-scope half
    pub fn upper(&self) -> Address32 {
        Address32::from_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    /// The object-scope half
    pub fn lower(&self) -> Address32 {
        Address32::from_bytes([self.bytes[4], self.bytes[5], self.bytes[6], self.bytes[7]])
    }

    pub fn update_upper32(&mut self, upper: Address32) {
        self.bytes[..4].copy_from_slice(&upper.bytes());
        self.rehash();
    }

    pub fn update_lower32(&mut self, lower: Address32) {
        self.bytes[4..].copy_from_slice(&lower.bytes());
        self.rehash();
    }

    pub fn set_byte(&mut self, index: usize, value: u8) -> Result<(), AddressError> {
        let Some(byte) = self.bytes.get_mut(index) else {
            return Err(AddressError::IndexOutOfRange { index, width: 8 });
        };
        *byte = value;
        self.rehash();
        Ok(())
    }

    pub fn update(&mut self, bytes: [u8; 8]) {
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

impl PartialEq for Address64 {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for Address64 {}

impl Hash for Address64 {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash);
    }
}

impl fmt::Debug for Address64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address64({})", self)
    }
}

impl fmt::Display for Address64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.upper(), self.lower())
    }
}

impl NetAddress for Address64 {
    const WIDTH: usize = 8;

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn digest(&self) -> u32 {
        self.hash
    }
}

impl Serde for Address64 {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_bytes(&self.bytes);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self::from_bytes(<[u8; 8]>::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for Address64 {
    fn const_bit_length() -> u32 {
        64
    }
}
