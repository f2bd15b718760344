use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr};

/// A type that can be written to and read back from a bit stream.
///
/// Implementations must be deterministic: two equal values always produce the
/// same bits.
pub trait Serde: Sized + Clone + PartialEq {
    /// Writes the value into the bit stream
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Reads a value out of the bit stream
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` will write for this value
    fn bit_length(&self) -> u32;
}

/// Types whose encoded size does not depend on their value.
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}
